//! Listener Errors

use uuid::Uuid;

use crate::store::StoreError;

/// Failures raised inside a listener before it reports them
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Record store rejected or failed a command
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Timezone identifier is not a known IANA name
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Scheduled post carries no publish time to shift
    #[error("Scheduled post {0} has no published_at")]
    MissingPublishTime(Uuid),

    /// Shifted publish time falls outside the representable range
    #[error("Publish time of post {0} cannot be shifted by {1} minutes")]
    PublishTimeOutOfRange(Uuid, i64),

    /// Imminence window pushes the cutoff outside the representable range
    #[error("Imminence window of {0} minutes is out of range")]
    ImminenceOutOfRange(i64),
}
