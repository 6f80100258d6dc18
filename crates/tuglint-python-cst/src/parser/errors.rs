// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::ops::Range;

use thiserror::Error;
use tuglint_core::{Position, TuglintError};

use crate::tokenizer::TokError;

/// A defect found while converting the raw parse tree into typed nodes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The raw tree did not have the shape the builder expects for a rule.
    /// This is a bug in the grammar or the builder, never bad input.
    #[error("unexpected {rule} shape at line {line}: {message}")]
    Structural {
        rule: String,
        line: u32,
        message: String,
    },

    /// The input parsed, but breaks a rule the grammar does not encode.
    #[error("Parse error at line {line}: {message}")]
    PostCondition { line: u32, message: String },
}

impl BuildError {
    pub fn structural(rule: impl ToString, line: u32, message: impl Into<String>) -> Self {
        BuildError::Structural {
            rule: rule.to_string(),
            line,
            message: message.into(),
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            BuildError::Structural { line, .. } | BuildError::PostCondition { line, .. } => *line,
        }
    }
}

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParserError {
    #[error("tokenizer error: {0}")]
    TokenizerError(#[from] TokError),

    #[error("parser error at {position}: unexpected {found}, expected {expected}")]
    SyntaxError {
        /// Description of the offending token.
        found: String,
        /// Sorted, comma-separated set of acceptable tokens.
        expected: String,
        position: Position,
        /// Byte range of the offending token.
        range: Range<usize>,
    },

    #[error(transparent)]
    BuildError(#[from] BuildError),
}

pub type Result<T> = std::result::Result<T, ParserError>;

impl ParserError {
    /// The 1-based line the error is attributed to.
    pub fn line(&self) -> u32 {
        match self {
            ParserError::TokenizerError(err) => err.position.line,
            ParserError::SyntaxError { position, .. } => position.line,
            ParserError::BuildError(err) => err.line(),
        }
    }

    /// Byte range to highlight in the source, if the error has one.
    pub fn byte_range(&self) -> Option<Range<usize>> {
        match self {
            ParserError::TokenizerError(err) => Some(err.offset..err.offset),
            ParserError::SyntaxError { range, .. } => Some(range.clone()),
            ParserError::BuildError(_) => None,
        }
    }
}

impl From<ParserError> for TuglintError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::BuildError(BuildError::Structural { .. }) => TuglintError::internal(err.to_string()),
            ParserError::BuildError(BuildError::PostCondition { line, message }) => {
                TuglintError::syntax(line, message)
            }
            other => TuglintError::syntax(other.line(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuglint_core::OutputErrorCode;

    #[test]
    fn test_post_condition_message() {
        let err = BuildError::PostCondition {
            line: 3,
            message: "Generator expression must be parenthesized if not sole argument.".into(),
        };
        assert_eq!(
            err.to_string(),
            "Parse error at line 3: Generator expression must be parenthesized if not sole argument."
        );
    }

    #[test]
    fn test_error_codes() {
        let structural: TuglintError =
            ParserError::from(BuildError::structural("Atom", 1, "no children")).into();
        assert_eq!(OutputErrorCode::from(&structural), OutputErrorCode::InternalError);

        let syntax: TuglintError = ParserError::SyntaxError {
            found: "NEWLINE".into(),
            expected: "':'".into(),
            position: Position::new(2, 4),
            range: 10..11,
        }
        .into();
        assert_eq!(OutputErrorCode::from(&syntax), OutputErrorCode::SyntaxError);
        match syntax {
            TuglintError::SyntaxError { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected {:?}", other),
        }
    }
}
