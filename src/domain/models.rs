//! Domain Records
//!
//! Users, credentials and posts as seen by the listeners. The records are owned
//! and persisted by the record store; these are plain snapshots of them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

// =========================================================================
// User
// =========================================================================

/// User account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            other => Err(DomainError::UnknownUserStatus(other.to_string())),
        }
    }
}

/// User record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub status: UserStatus,
    pub last_seen: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: UserStatus::Active,
            last_seen: None,
            updated_at: Utc::now(),
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, changes: &UserChanges) {
        if let Some(last_seen) = changes.last_seen {
            self.last_seen = Some(last_seen);
        }
    }
}

/// Partial update of a user record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl UserChanges {
    pub fn last_seen(at: DateTime<Utc>) -> Self {
        Self {
            last_seen: Some(at),
        }
    }
}

// =========================================================================
// Credential
// =========================================================================

/// Kind of credential issued to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// Short-lived access token
    Access,
    /// Long-lived refresh token
    Refresh,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Access => "access",
            CredentialKind::Refresh => "refresh",
        }
    }

    /// Table holding credentials of this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            CredentialKind::Access => "access_tokens",
            CredentialKind::Refresh => "refresh_tokens",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CredentialKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(CredentialKind::Access),
            "refresh" => Ok(CredentialKind::Refresh),
            other => Err(DomainError::UnknownCredentialKind(other.to_string())),
        }
    }
}

/// Credential record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: Uuid,
    pub kind: CredentialKind,
    pub token: String,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// =========================================================================
// Post
// =========================================================================

/// Publication status of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Sent,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Sent => "sent",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "scheduled" => Ok(PostStatus::Scheduled),
            "published" => Ok(PostStatus::Published),
            "sent" => Ok(PostStatus::Sent),
            other => Err(DomainError::UnknownPostStatus(other.to_string())),
        }
    }
}

/// Post record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// A post scheduled for the given instant
    pub fn scheduled(id: Uuid, title: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            status: PostStatus::Scheduled,
            published_at: Some(published_at),
            updated_at: Utc::now(),
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, changes: &PostChanges) {
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(published_at) = changes.published_at {
            self.published_at = Some(published_at);
        }
    }
}

/// Partial update of a post record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl PostChanges {
    pub fn status(status: PostStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn published_at(at: DateTime<Utc>) -> Self {
        Self {
            published_at: Some(at),
            ..Self::default()
        }
    }
}

/// Filter for post queries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
}

impl PostFilter {
    /// Match every post
    pub fn all() -> Self {
        Self::default()
    }

    /// Match posts with the given status
    pub fn with_status(status: PostStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.status.map_or(true, |status| post.status == status)
    }
}
