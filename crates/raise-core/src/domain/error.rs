//! Domain-level error taxonomy for the RAISE engine.

use crate::condition::ConditionError;

/// RAISE engine errors.
///
/// None of these are produced by the pure evaluation paths (level
/// calculation, fast-track, checkpoint resolution); they surface when
/// configuration is loaded, validated or parsed.
#[derive(Debug, thiserror::Error)]
pub enum RaiseError {
    #[error("invalid authorization matrix: {0}")]
    InvalidMatrix(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("condition error: {0}")]
    Condition(#[from] ConditionError),

    #[error("unknown workflow phase: {0}")]
    UnknownPhase(String),

    #[error("unknown RAISE level: {0}")]
    UnknownLevel(String),

    #[error("unsupported settings format: {0}")]
    UnsupportedFormat(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for RAISE domain operations.
pub type Result<T> = std::result::Result<T, RaiseError>;
