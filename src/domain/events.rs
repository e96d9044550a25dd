//! Domain Events
//!
//! Events published on the bus that the listeners react to.
//! Events are immutable facts that have happened in the system.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Credential, DomainError};

/// Name under which an event is published on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    CredentialAdded,
    UserDeactivated,
    ActiveTimezoneEdited,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::CredentialAdded => "credential.added",
            EventName::UserDeactivated => "user.deactivated",
            EventName::ActiveTimezoneEdited => "settings.activeTimezone.edited",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credential.added" => Ok(EventName::CredentialAdded),
            "user.deactivated" => Ok(EventName::UserDeactivated),
            "settings.activeTimezone.edited" => Ok(EventName::ActiveTimezoneEdited),
            other => Err(DomainError::UnknownEventName(other.to_string())),
        }
    }
}

/// Events consumed by the listeners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum DomainEvent {
    /// A new access credential was issued
    #[serde(rename = "credential.added")]
    CredentialAdded { credential: Credential },

    /// A user account was deactivated
    #[serde(rename = "user.deactivated")]
    UserDeactivated { user_id: Uuid },

    /// The `active_timezone` setting was edited
    #[serde(rename = "settings.activeTimezone.edited")]
    ActiveTimezoneEdited {
        new_value: String,
        previous_value: String,
    },
}

impl DomainEvent {
    pub fn credential_added(credential: Credential) -> Self {
        Self::CredentialAdded { credential }
    }

    pub fn user_deactivated(user_id: Uuid) -> Self {
        Self::UserDeactivated { user_id }
    }

    pub fn active_timezone_edited(
        new_value: impl Into<String>,
        previous_value: impl Into<String>,
    ) -> Self {
        Self::ActiveTimezoneEdited {
            new_value: new_value.into(),
            previous_value: previous_value.into(),
        }
    }

    /// Bus name of this event
    pub fn name(&self) -> EventName {
        match self {
            DomainEvent::CredentialAdded { .. } => EventName::CredentialAdded,
            DomainEvent::UserDeactivated { .. } => EventName::UserDeactivated,
            DomainEvent::ActiveTimezoneEdited { .. } => EventName::ActiveTimezoneEdited,
        }
    }
}
