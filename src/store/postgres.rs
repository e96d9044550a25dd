//! Postgres record store
//!
//! Command interface over the `users`, `access_tokens`, `refresh_tokens` and
//! `posts` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::domain::{
    CredentialKind, OperationContext, Post, PostChanges, PostFilter, PostStatus, User,
    UserChanges,
};

type UserRow = (Uuid, String, String, Option<DateTime<Utc>>, DateTime<Utc>);
type PostRow = (Uuid, String, String, Option<DateTime<Utc>>, DateTime<Utc>);

/// Record store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Create a new PgRecordStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn user_from_row(
    (id, name, status, last_seen, updated_at): UserRow,
) -> Result<User, StoreError> {
    Ok(User {
        id,
        name,
        status: status.parse()?,
        last_seen,
        updated_at,
    })
}

fn post_from_row(
    (id, title, status, published_at, updated_at): PostRow,
) -> Result<Post, StoreError> {
    Ok(Post {
        id,
        title,
        status: status.parse()?,
        published_at,
        updated_at,
    })
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn edit_user(
        &self,
        user_id: Uuid,
        changes: &UserChanges,
        context: &OperationContext,
    ) -> Result<User, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            UPDATE users
            SET
                last_seen = COALESCE($2, last_seen),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, status, last_seen, updated_at
            "#,
        )
        .bind(user_id)
        .bind(changes.last_seen)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(StoreError::UserNotFound(user_id))?;

        tracing::debug!(
            user_id = %user_id,
            correlation_id = ?context.correlation_id,
            "Edited user"
        );

        user_from_row(row)
    }

    async fn destroy_credentials_by_user(
        &self,
        kind: CredentialKind,
        user_id: Uuid,
        context: &OperationContext,
    ) -> Result<u64, StoreError> {
        // Table name comes from a closed enum, never from input
        let sql = format!("DELETE FROM {} WHERE user_id = $1", kind.table_name());

        let rows_deleted = sqlx::query(&sql)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!(
            user_id = %user_id,
            kind = %kind,
            rows_deleted = rows_deleted,
            correlation_id = ?context.correlation_id,
            "Destroyed credentials"
        );

        Ok(rows_deleted)
    }

    async fn find_posts(
        &self,
        filter: &PostFilter,
        context: &OperationContext,
    ) -> Result<Vec<Post>, StoreError> {
        let rows: Vec<PostRow> = sqlx::query_as(
            r#"
            SELECT id, title, status, published_at, updated_at
            FROM posts
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::boolean OR status = $3)
            ORDER BY published_at ASC, id ASC
            "#,
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(context.is_internal())
        .bind(PostStatus::Published.as_str())
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(
            rows = rows.len(),
            internal = context.is_internal(),
            correlation_id = ?context.correlation_id,
            "Found posts"
        );

        rows.into_iter().map(post_from_row).collect()
    }

    async fn edit_post(
        &self,
        post_id: Uuid,
        changes: &PostChanges,
        context: &OperationContext,
    ) -> Result<Post, StoreError> {
        if !context.is_internal() {
            return Err(StoreError::PermissionDenied(format!(
                "editing post {} requires an internal context",
                post_id
            )));
        }

        let row: Option<PostRow> = sqlx::query_as(
            r#"
            UPDATE posts
            SET
                status = COALESCE($2, status),
                published_at = COALESCE($3, published_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, status, published_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.published_at)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(StoreError::PostNotFound(post_id))?;

        tracing::debug!(
            post_id = %post_id,
            correlation_id = ?context.correlation_id,
            "Edited post"
        );

        post_from_row(row)
    }
}
