//! Error types and error code constants for tuglint.
//!
//! This module provides a unified error type (`TuglintError`) that bridges
//! domain-specific errors from the front end (tokenizer, parser, tree
//! builder) and the semantic layer (symbol table) into a common format
//! suitable for embedders and JSON output.
//!
//! ## Error Code Mapping
//!
//! - `3`: Syntax errors (the input is not valid Python, or violates a
//!   language-level post-condition)
//! - `4`: File errors (file not found, unreadable)
//! - `10`: Internal errors (structural build defects, symbol table protocol
//!   violations)
//!
//! Domain crates implement `From<TheirError> for TuglintError`.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable numeric codes for errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// The source is not valid Python.
    SyntaxError = 3,
    /// The file could not be read.
    FileError = 4,
    /// A defect in tuglint itself.
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the analysis pipeline.
#[derive(Debug, Error)]
pub enum TuglintError {
    /// The source could not be tokenized or parsed, or violates a
    /// language-level rule the grammar does not capture.
    #[error("syntax error at line {line}: {message}")]
    SyntaxError { line: u32, message: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// File exists but could not be read.
    #[error("cannot read {path}: {message}")]
    FileUnreadable { path: String, message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

/// Result type for pipeline operations.
pub type TuglintResult<T> = Result<T, TuglintError>;

impl From<&TuglintError> for OutputErrorCode {
    fn from(err: &TuglintError) -> Self {
        match err {
            TuglintError::SyntaxError { .. } => OutputErrorCode::SyntaxError,
            TuglintError::FileNotFound { .. } => OutputErrorCode::FileError,
            TuglintError::FileUnreadable { .. } => OutputErrorCode::FileError,
            TuglintError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<TuglintError> for OutputErrorCode {
    fn from(err: TuglintError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl TuglintError {
    /// Create a syntax error.
    pub fn syntax(line: u32, message: impl Into<String>) -> Self {
        TuglintError::SyntaxError {
            line,
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        TuglintError::InternalError {
            message: message.into(),
        }
    }

    /// Map an I/O error on `path` to the matching variant.
    pub fn from_io(path: impl Into<String>, err: &std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => TuglintError::FileNotFound { path },
            _ => TuglintError::FileUnreadable {
                path,
                message: err.to_string(),
            },
        }
    }

    /// The stable code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }

    /// A JSON rendering of the error, for machine consumers.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.error_code().code(),
            "message": self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(TuglintError::syntax(1, "x").error_code().code(), 3);
        assert_eq!(TuglintError::internal("x").error_code().code(), 10);
        let not_found = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(
            TuglintError::from_io("a.py", &not_found).error_code(),
            OutputErrorCode::FileError
        );
    }

    #[test]
    fn test_error_display_and_json() {
        let err = TuglintError::syntax(4, "unexpected token ')'");
        assert_eq!(
            err.to_string(),
            "syntax error at line 4: unexpected token ')'"
        );
        let json = err.to_json();
        assert_eq!(json["code"], 3);
        assert_eq!(json["message"], "syntax error at line 4: unexpected token ')'");
    }
}
