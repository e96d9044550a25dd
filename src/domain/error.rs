//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Errors raised while interpreting domain values coming from the outside
/// (event payloads, stored rows).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Unknown post status
    #[error("Unknown post status: {0}")]
    UnknownPostStatus(String),

    /// Unknown user status
    #[error("Unknown user status: {0}")]
    UnknownUserStatus(String),

    /// Unknown credential kind
    #[error("Unknown credential kind: {0}")]
    UnknownCredentialKind(String),

    /// Unknown event name
    #[error("Unknown event name: {0}")]
    UnknownEventName(String),
}

impl DomainError {
    /// The raw value that failed to parse
    pub fn value(&self) -> &str {
        match self {
            Self::UnknownPostStatus(value)
            | Self::UnknownUserStatus(value)
            | Self::UnknownCredentialKind(value)
            | Self::UnknownEventName(value) => value,
        }
    }
}
