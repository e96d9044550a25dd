//! Error handling module
//!
//! Top-level error type for the service runtime.

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database schema incomplete: missing table {0}")]
    SchemaIncomplete(String),

    #[error(transparent)]
    Store(#[from] crate::store::StoreError),

    #[error("Invalid event payload: {0}")]
    InvalidEvent(#[from] serde_json::Error),
}

impl AppError {
    /// Whether the service can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::InvalidEvent(_))
    }
}
