//! Record Store Errors
//!
//! Error types for record-store operations.

use uuid::Uuid;

use crate::domain::DomainError;

/// Errors that can occur in the record store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Post not found
    #[error("Post not found: {0}")]
    PostNotFound(Uuid),

    /// Operation requires an internal context
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Stored row could not be interpreted
    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] DomainError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
