//! Error types for condition parsing and evaluation.

/// Errors produced while parsing or evaluating a control condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    #[error("cannot parse condition `{expression}`: {message}")]
    Parse { expression: String, message: String },

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("condition too complex: {0}")]
    TooComplex(String),
}

/// Result type for condition operations.
pub type ConditionResult<T> = std::result::Result<T, ConditionError>;
