//! Common test utilities
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use publish_listeners::bus::InProcessEventBus;
use publish_listeners::clock::FixedClock;
use publish_listeners::domain::{Credential, CredentialKind};
use publish_listeners::listeners::{self, ListenerDeps, ReconcilerSettings};
use publish_listeners::reporting::CollectingErrorReporter;
use publish_listeners::store::InMemoryRecordStore;

const SCHEMA: &str = include_str!("../../migrations/20260101000000_listeners_schema.sql");

/// 09:00 UTC on a winter day
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap()
}

pub fn credential(user_id: Uuid, kind: CredentialKind) -> Credential {
    Credential {
        id: Uuid::new_v4(),
        kind,
        token: Uuid::new_v4().to_string(),
        user_id,
        issued_at: now(),
        expires_at: now() + Duration::days(30),
    }
}

/// A bus with every listener registered against an in-memory store
pub struct TestApp {
    pub bus: InProcessEventBus,
    pub store: Arc<InMemoryRecordStore>,
    pub reporter: Arc<CollectingErrorReporter>,
}

pub fn in_memory_app() -> TestApp {
    let store = Arc::new(InMemoryRecordStore::new());
    let reporter = Arc::new(CollectingErrorReporter::new());
    let deps = ListenerDeps::new(
        store.clone(),
        reporter.clone(),
        Arc::new(FixedClock::new(now())),
    );

    let mut bus = InProcessEventBus::new();
    listeners::register_all(&mut bus, &deps, ReconcilerSettings::default());

    TestApp {
        bus,
        store,
        reporter,
    }
}

/// Setup test database - create tables and truncate them
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("Failed to apply schema");
    }

    sqlx::query("TRUNCATE TABLE access_tokens, refresh_tokens, posts, users CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

pub async fn seed_user(pool: &PgPool, user_id: Uuid) {
    sqlx::query("INSERT INTO users (id, name) VALUES ($1, 'test user')")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to seed user");
}

pub async fn seed_token(pool: &PgPool, kind: CredentialKind, user_id: Uuid) {
    let sql = format!(
        "INSERT INTO {} (id, token, user_id, expires_at) VALUES ($1, $2, $3, NOW() + INTERVAL '1 day')",
        kind.table_name()
    );
    sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to seed token");
}

pub async fn seed_post(pool: &PgPool, status: &str, published_at: DateTime<Utc>) -> Uuid {
    let post_id = Uuid::new_v4();
    sqlx::query("INSERT INTO posts (id, title, status, published_at) VALUES ($1, 'post', $2, $3)")
        .bind(post_id)
        .bind(status)
        .bind(published_at)
        .execute(pool)
        .await
        .expect("Failed to seed post");
    post_id
}
