//! Error taxonomy for task persistence and webhook delivery

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskError>;

#[derive(Debug, Error)]
pub enum TaskError {
    /// Update target is missing from the local store.
    #[error("task {0} not found")]
    NotFound(String),

    /// Rejected before any write.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The transport failed before a response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP {status} - {body}")]
    Server { status: u16, body: String },

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TaskError {
    /// Whether the error came from remote delivery rather than local state.
    pub fn is_delivery(&self) -> bool {
        matches!(self, TaskError::Network(_) | TaskError::Server { .. })
    }
}
