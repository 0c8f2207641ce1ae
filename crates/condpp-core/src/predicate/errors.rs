use thiserror::Error;

/// Errors raised while parsing or evaluating a predicate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredicateError {
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    #[error("Unknown identifier '{name}'")]
    UnknownIdentifier { name: String },

    #[error("Type error: cannot compare {left_type} {operation} {right_type}")]
    TypeMismatch {
        operation: String,
        left_type: String,
        right_type: String,
    },
}

impl PredicateError {
    /// Create a syntax error from any displayable parser error
    pub fn syntax(message: impl ToString) -> Self {
        Self::Syntax {
            message: message.to_string(),
        }
    }

    /// Create an unknown identifier error
    pub fn unknown_identifier(name: &str) -> Self {
        Self::UnknownIdentifier {
            name: name.to_string(),
        }
    }

    /// Create a type error for relational operators
    pub fn type_mismatch(operation: &str, left_type: &str, right_type: &str) -> Self {
        Self::TypeMismatch {
            operation: operation.to_string(),
            left_type: left_type.to_string(),
            right_type: right_type.to_string(),
        }
    }
}
