use thiserror::Error;

/// Main error type for the decision engine.
///
/// The four public variants form the error taxonomy callers are expected to
/// branch on: validation failures reject the request with nothing mutated,
/// not-found is a lookup miss distinct from bad input, conflict guards
/// double settlement, and internal covers downstream collaborator failures
/// that must never be auto-retried.
#[derive(Error, Debug)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    // Request validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Lookup errors
    #[error("Not found: {0}")]
    NotFound(String),

    // State conflicts (e.g. resolving an already-resolved dispute)
    #[error("Conflict: {0}")]
    Conflict(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Specific error types for dispute resolution
#[derive(Error, Debug, Clone)]
pub enum DisputeError {
    #[error("Dispute not found: {dispute_id}")]
    NotFound { dispute_id: String },

    #[error("Dispute already resolved: {dispute_id}")]
    AlreadyResolved { dispute_id: String },

    #[error("Unknown decision: {value}")]
    UnknownDecision { value: String },

    #[error("Slash percentage {value} not in {{0, 20, 50, 100}}")]
    InvalidSlashPercent { value: u8 },
}

impl From<DisputeError> for EngineError {
    fn from(err: DisputeError) -> Self {
        match err {
            DisputeError::NotFound { .. } => EngineError::NotFound(err.to_string()),
            DisputeError::AlreadyResolved { .. } => EngineError::Conflict(err.to_string()),
            DisputeError::UnknownDecision { .. } | DisputeError::InvalidSlashPercent { .. } => {
                EngineError::Validation(err.to_string())
            }
        }
    }
}

impl EngineError {
    /// True for inputs the caller can correct and resubmit.
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }

    /// True when a retry must first check whether the original attempt
    /// committed (resolution conflicts).
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Conflict(_))
    }
}
