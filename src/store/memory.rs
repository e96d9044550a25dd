//! In-memory record store
//!
//! Keeps users, credentials and posts in process memory. Used by tests and
//! local runs. Every call is journaled, and faults can be injected per
//! operation to exercise the listeners' failure paths.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::domain::{
    Credential, CredentialKind, OperationContext, Post, PostChanges, PostFilter, PostStatus,
    User, UserChanges,
};

/// A call received by the in-memory store, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    EditUser(Uuid),
    DestroyCredentials(CredentialKind, Uuid),
    FindPosts(PostFilter),
    EditPost(Uuid),
}

/// Operation that should fail when called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreFault {
    EditUser,
    DestroyCredentials(CredentialKind),
    FindPosts,
    EditPost(Uuid),
}

#[derive(Debug, Default)]
struct Records {
    users: HashMap<Uuid, User>,
    credentials: Vec<Credential>,
    posts: HashMap<Uuid, Post>,
}

/// Record store backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Records>,
    faults: Mutex<HashSet<StoreFault>>,
    calls: Mutex<Vec<(StoreCall, Option<Uuid>)>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Seeding and inspection
    // =========================================================================

    pub async fn insert_user(&self, user: User) {
        self.records.write().await.users.insert(user.id, user);
    }

    pub async fn insert_credential(&self, credential: Credential) {
        self.records.write().await.credentials.push(credential);
    }

    pub async fn insert_post(&self, post: Post) {
        self.records.write().await.posts.insert(post.id, post);
    }

    pub async fn user(&self, user_id: Uuid) -> Option<User> {
        self.records.read().await.users.get(&user_id).cloned()
    }

    pub async fn post(&self, post_id: Uuid) -> Option<Post> {
        self.records.read().await.posts.get(&post_id).cloned()
    }

    /// Credentials of `kind` currently held by the user
    pub async fn credentials_of(&self, user_id: Uuid, kind: CredentialKind) -> Vec<Credential> {
        self.records
            .read()
            .await
            .credentials
            .iter()
            .filter(|c| c.user_id == user_id && c.kind == kind)
            .cloned()
            .collect()
    }

    /// Make every subsequent call of the operation fail
    pub async fn inject_fault(&self, fault: StoreFault) {
        self.faults.lock().await.insert(fault);
    }

    pub async fn clear_faults(&self) {
        self.faults.lock().await.clear();
    }

    /// Calls received so far, including failed ones
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().await.iter().map(|(call, _)| call.clone()).collect()
    }

    /// Correlation ID of each call's context, in the same order as `calls`
    pub async fn correlation_ids(&self) -> Vec<Option<Uuid>> {
        self.calls.lock().await.iter().map(|(_, id)| *id).collect()
    }

    async fn enter(
        &self,
        call: StoreCall,
        fault: StoreFault,
        context: &OperationContext,
    ) -> Result<(), StoreError> {
        tracing::trace!(call = ?call, correlation_id = ?context.correlation_id, "Store call");
        self.calls.lock().await.push((call, context.correlation_id));

        if self.faults.lock().await.contains(&fault) {
            return Err(StoreError::Unavailable(format!("injected fault: {:?}", fault)));
        }

        Ok(())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn edit_user(
        &self,
        user_id: Uuid,
        changes: &UserChanges,
        context: &OperationContext,
    ) -> Result<User, StoreError> {
        self.enter(StoreCall::EditUser(user_id), StoreFault::EditUser, context)
            .await?;

        let mut records = self.records.write().await;
        let user = records
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::UserNotFound(user_id))?;

        user.apply(changes);
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn destroy_credentials_by_user(
        &self,
        kind: CredentialKind,
        user_id: Uuid,
        context: &OperationContext,
    ) -> Result<u64, StoreError> {
        self.enter(
            StoreCall::DestroyCredentials(kind, user_id),
            StoreFault::DestroyCredentials(kind),
            context,
        )
        .await?;

        let mut records = self.records.write().await;
        let before = records.credentials.len();
        records
            .credentials
            .retain(|c| !(c.user_id == user_id && c.kind == kind));

        Ok((before - records.credentials.len()) as u64)
    }

    async fn find_posts(
        &self,
        filter: &PostFilter,
        context: &OperationContext,
    ) -> Result<Vec<Post>, StoreError> {
        self.enter(StoreCall::FindPosts(filter.clone()), StoreFault::FindPosts, context)
            .await?;

        let records = self.records.read().await;
        let mut posts: Vec<Post> = records
            .posts
            .values()
            .filter(|post| filter.matches(post))
            .filter(|post| context.is_internal() || post.status == PostStatus::Published)
            .cloned()
            .collect();

        posts.sort_by_key(|post| (post.published_at, post.id));
        Ok(posts)
    }

    async fn edit_post(
        &self,
        post_id: Uuid,
        changes: &PostChanges,
        context: &OperationContext,
    ) -> Result<Post, StoreError> {
        self.enter(StoreCall::EditPost(post_id), StoreFault::EditPost(post_id), context)
            .await?;

        if !context.is_internal() {
            return Err(StoreError::PermissionDenied(format!(
                "editing post {} requires an internal context",
                post_id
            )));
        }

        let mut records = self.records.write().await;
        let post = records
            .posts
            .get_mut(&post_id)
            .ok_or(StoreError::PostNotFound(post_id))?;

        post.apply(changes);
        post.updated_at = Utc::now();

        Ok(post.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn credential(user_id: Uuid, kind: CredentialKind) -> Credential {
        let issued_at = Utc::now();
        Credential {
            id: Uuid::new_v4(),
            kind,
            token: Uuid::new_v4().to_string(),
            user_id,
            issued_at,
            expires_at: issued_at + Duration::days(1),
        }
    }

    #[tokio::test]
    async fn test_edit_unknown_user_fails() {
        let store = InMemoryRecordStore::new();
        let user_id = Uuid::new_v4();

        let result = store
            .edit_user(user_id, &UserChanges::last_seen(Utc::now()), &OperationContext::new())
            .await;

        assert!(matches!(result, Err(StoreError::UserNotFound(id)) if id == user_id));
        assert_eq!(store.calls().await, vec![StoreCall::EditUser(user_id)]);
    }

    #[tokio::test]
    async fn test_destroy_only_touches_owner_and_kind() {
        let store = InMemoryRecordStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        store.insert_credential(credential(owner, CredentialKind::Access)).await;
        store.insert_credential(credential(owner, CredentialKind::Access)).await;
        store.insert_credential(credential(owner, CredentialKind::Refresh)).await;
        store.insert_credential(credential(other, CredentialKind::Access)).await;

        let removed = store
            .destroy_credentials_by_user(CredentialKind::Access, owner, &OperationContext::new())
            .await
            .unwrap();

        assert_eq!(removed, 2);
        assert!(store.credentials_of(owner, CredentialKind::Access).await.is_empty());
        assert_eq!(store.credentials_of(owner, CredentialKind::Refresh).await.len(), 1);
        assert_eq!(store.credentials_of(other, CredentialKind::Access).await.len(), 1);
    }

    #[tokio::test]
    async fn test_default_context_only_sees_published_posts() {
        let store = InMemoryRecordStore::new();
        let scheduled = Post::scheduled(Uuid::new_v4(), "Soon", Utc::now() + Duration::days(1));
        let mut published = Post::scheduled(Uuid::new_v4(), "Out", Utc::now());
        published.status = PostStatus::Published;

        store.insert_post(scheduled.clone()).await;
        store.insert_post(published.clone()).await;

        let public = store
            .find_posts(&PostFilter::all(), &OperationContext::new())
            .await
            .unwrap();
        assert_eq!(public, vec![published]);

        let internal = store
            .find_posts(
                &PostFilter::with_status(PostStatus::Scheduled),
                &OperationContext::internal(),
            )
            .await
            .unwrap();
        assert_eq!(internal.len(), 1);
        assert_eq!(internal[0].id, scheduled.id);
    }

    #[tokio::test]
    async fn test_edit_post_requires_internal_context() {
        let store = InMemoryRecordStore::new();
        let post = Post::scheduled(Uuid::new_v4(), "Soon", Utc::now() + Duration::days(1));
        store.insert_post(post.clone()).await;

        let denied = store
            .edit_post(post.id, &PostChanges::status(PostStatus::Draft), &OperationContext::new())
            .await;
        assert!(matches!(denied, Err(StoreError::PermissionDenied(_))));

        let edited = store
            .edit_post(
                post.id,
                &PostChanges::status(PostStatus::Draft),
                &OperationContext::internal(),
            )
            .await
            .unwrap();
        assert_eq!(edited.status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn test_injected_fault_is_persistent_until_cleared() {
        let store = InMemoryRecordStore::new();
        store.inject_fault(StoreFault::FindPosts).await;

        for _ in 0..2 {
            let result = store
                .find_posts(&PostFilter::all(), &OperationContext::internal())
                .await;
            assert!(matches!(result, Err(StoreError::Unavailable(_))));
        }

        store.clear_faults().await;
        let result = store
            .find_posts(&PostFilter::all(), &OperationContext::internal())
            .await;
        assert!(result.is_ok());
        assert_eq!(store.calls().await.len(), 3);
    }
}
