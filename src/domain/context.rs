//! Operation Context
//!
//! Carries the access mode and tracing metadata for a record-store call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for a record-store operation.
///
/// An `internal` context bypasses the visibility restrictions that apply to
/// ordinary callers (e.g. reading unpublished posts or editing them). Listeners
/// acting on behalf of the system pass it explicitly; nothing flips it globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationContext {
    /// Privileged access, bypasses visibility filters
    pub internal: bool,

    /// Correlation ID for tracing a listener run across store calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a new default (non-privileged) context
    pub fn new() -> Self {
        Self {
            internal: false,
            correlation_id: None,
        }
    }

    /// Create a privileged context
    pub fn internal() -> Self {
        Self {
            internal: true,
            ..Self::new()
        }
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}
