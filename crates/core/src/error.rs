//! Error types for rill.

use alloc::string::String;
use core::fmt;

/// Result type alias for rill operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while assembling a pipeline.
///
/// Propagation itself never returns errors; a broken invariant while pushing
/// is a bug and panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A filter condition that cannot be compiled into a predicate.
    InvalidCondition {
        message: String,
    },
    /// Operators that must share a schema do not.
    SchemaMismatch {
        message: String,
    },
    /// A construct this layer does not execute on its own.
    Unsupported {
        message: String,
    },
    /// Invalid operation.
    InvalidOperation {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCondition { message } => {
                write!(f, "Invalid condition: {}", message)
            }
            Error::SchemaMismatch { message } => {
                write!(f, "Schema mismatch: {}", message)
            }
            Error::Unsupported { message } => {
                write!(f, "Unsupported: {}", message)
            }
            Error::InvalidOperation { message } => {
                write!(f, "Invalid operation: {}", message)
            }
        }
    }
}

impl Error {
    /// Creates an invalid condition error.
    pub fn invalid_condition(message: impl Into<String>) -> Self {
        Error::InvalidCondition {
            message: message.into(),
        }
    }

    /// Creates a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Creates an unsupported error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::Unsupported {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_condition("IN requires an array");
        assert!(err.to_string().contains("IN requires an array"));

        let err = Error::schema_mismatch("branch 1");
        assert!(err.to_string().starts_with("Schema mismatch"));

        let err = Error::unsupported("correlated subquery");
        assert!(err.to_string().contains("subquery"));
    }

    #[test]
    fn test_error_constructors() {
        match Error::invalid_operation("nope") {
            Error::InvalidOperation { message } => assert_eq!(message, "nope"),
            _ => panic!("Wrong error type"),
        }
    }
}
