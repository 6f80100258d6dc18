//! Errors raised by the symbol table.
//!
//! Unresolved names and unresolved class hierarchies are not errors: they
//! are recorded as state on the symbols. The only failures here are usage
//! defects, such as mutating a collection after it has been read.

use std::fmt;

use thiserror::Error;
use tuglint_core::TuglintError;

/// A mutation of a class symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassMutation {
    AddSuperClass,
    AddMembers,
    SetHasSuperClassWithoutSymbol,
}

impl fmt::Display for ClassMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ClassMutation::AddSuperClass => "add a superclass",
            ClassMutation::AddMembers => "add members",
            ClassMutation::SetHasSuperClassWithoutSymbol => "flag an unresolved superclass",
        };
        f.write_str(text)
    }
}

/// Errors from [`crate::SymbolTable`] operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SymbolTableError {
    /// A collection was mutated after its first read.
    #[error("cannot {operation} on class '{symbol}': the collection is frozen")]
    Protocol {
        symbol: String,
        operation: ClassMutation,
    },

    /// A class operation was applied to a symbol that is not a class.
    #[error("'{symbol}' is not a class symbol")]
    NotAClass { symbol: String },
}

pub type Result<T> = std::result::Result<T, SymbolTableError>;

impl From<SymbolTableError> for TuglintError {
    fn from(err: SymbolTableError) -> Self {
        TuglintError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuglint_core::OutputErrorCode;

    #[test]
    fn test_protocol_error_is_internal() {
        let err = SymbolTableError::Protocol {
            symbol: "A".to_string(),
            operation: ClassMutation::AddSuperClass,
        };
        assert_eq!(
            err.to_string(),
            "cannot add a superclass on class 'A': the collection is frozen"
        );
        let err: TuglintError = err.into();
        assert_eq!(err.error_code(), OutputErrorCode::InternalError);
    }
}
