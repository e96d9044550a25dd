//! Account Revocation Handler
//!
//! Deletes every credential of a user once the account is deactivated, so the
//! user can no longer sign in.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::ListenerError;
use crate::bus::EventListener;
use crate::domain::{CredentialKind, DomainEvent, OperationContext};
use crate::reporting::{ErrorReporter, ReportedError};
use crate::store::RecordStore;

/// Credentials removed for a deactivated user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationResult {
    pub user_id: Uuid,
    pub access_revoked: u64,
    pub refresh_revoked: u64,
}

/// Listener for `user.deactivated`
pub struct AccountRevocationHandler {
    store: Arc<dyn RecordStore>,
    reporter: Arc<dyn ErrorReporter>,
}

impl AccountRevocationHandler {
    pub const NAME: &'static str = "account_revocation";

    pub fn new(store: Arc<dyn RecordStore>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { store, reporter }
    }

    /// Destroy access credentials, then refresh credentials.
    /// Stops at the first failure.
    pub async fn execute(&self, user_id: Uuid) -> Result<RevocationResult, ListenerError> {
        let context = OperationContext::new().with_correlation_id(Uuid::new_v4());

        let access_revoked = self
            .store
            .destroy_credentials_by_user(CredentialKind::Access, user_id, &context)
            .await?;

        let refresh_revoked = self
            .store
            .destroy_credentials_by_user(CredentialKind::Refresh, user_id, &context)
            .await?;

        tracing::info!(
            user_id = %user_id,
            access_revoked = access_revoked,
            refresh_revoked = refresh_revoked,
            "Revoked credentials of deactivated user"
        );

        Ok(RevocationResult {
            user_id,
            access_revoked,
            refresh_revoked,
        })
    }
}

#[async_trait]
impl EventListener for AccountRevocationHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn handle(&self, event: &DomainEvent) {
        let DomainEvent::UserDeactivated { user_id } = event else {
            return;
        };

        if let Err(e) = self.execute(*user_id).await {
            self.reporter
                .report(ReportedError::critical(Self::NAME, &e).with_subject(*user_id));
        }
    }
}
