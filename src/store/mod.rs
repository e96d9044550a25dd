//! Record Store module
//!
//! Command interface over users, credentials and posts.
//! Listeners only talk to the [`RecordStore`] trait; the Postgres adapter backs
//! the service binary and the in-memory adapter backs tests.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    CredentialKind, OperationContext, Post, PostChanges, PostFilter, User, UserChanges,
};

pub use error::StoreError;
pub use memory::{InMemoryRecordStore, StoreCall, StoreFault};
pub use postgres::PgRecordStore;

/// Abstract CRUD over the domain records.
///
/// Every call takes an [`OperationContext`]. A non-internal context only sees
/// published posts and may not edit posts.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Update a user by id
    async fn edit_user(
        &self,
        user_id: Uuid,
        changes: &UserChanges,
        context: &OperationContext,
    ) -> Result<User, StoreError>;

    /// Delete every credential of `kind` owned by the user.
    /// Returns the number of credentials removed.
    async fn destroy_credentials_by_user(
        &self,
        kind: CredentialKind,
        user_id: Uuid,
        context: &OperationContext,
    ) -> Result<u64, StoreError>;

    /// Read all posts matching the filter
    async fn find_posts(
        &self,
        filter: &PostFilter,
        context: &OperationContext,
    ) -> Result<Vec<Post>, StoreError>;

    /// Update a post by id
    async fn edit_post(
        &self,
        post_id: Uuid,
        changes: &PostChanges,
        context: &OperationContext,
    ) -> Result<Post, StoreError>;
}
