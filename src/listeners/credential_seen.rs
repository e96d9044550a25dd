//! Credential Seen Tracker
//!
//! Marks a user as recently active whenever a credential is issued to them.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::ListenerError;
use crate::bus::EventListener;
use crate::clock::Clock;
use crate::domain::{DomainEvent, OperationContext, User, UserChanges};
use crate::reporting::{ErrorReporter, ReportedError};
use crate::store::RecordStore;

/// Listener for `credential.added`
pub struct CredentialSeenTracker {
    store: Arc<dyn RecordStore>,
    reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
}

impl CredentialSeenTracker {
    pub const NAME: &'static str = "credential_seen";

    pub fn new(
        store: Arc<dyn RecordStore>,
        reporter: Arc<dyn ErrorReporter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            reporter,
            clock,
        }
    }

    /// Set the user's `last_seen` to now
    pub async fn execute(&self, user_id: Uuid) -> Result<User, ListenerError> {
        let changes = UserChanges::last_seen(self.clock.now());
        let context = OperationContext::new().with_correlation_id(Uuid::new_v4());

        let user = self.store.edit_user(user_id, &changes, &context).await?;

        tracing::debug!(user_id = %user_id, "Updated last_seen");
        Ok(user)
    }
}

#[async_trait]
impl EventListener for CredentialSeenTracker {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn handle(&self, event: &DomainEvent) {
        let DomainEvent::CredentialAdded { credential } = event else {
            return;
        };

        if let Err(e) = self.execute(credential.user_id).await {
            self.reporter
                .report(ReportedError::critical(Self::NAME, &e).with_subject(credential.user_id));
        }
    }
}
