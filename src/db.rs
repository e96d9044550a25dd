//! Database module
//!
//! Connection and schema checks for the Postgres record store.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Tables the record store reads and writes
pub const REQUIRED_TABLES: [&str; 4] = ["users", "access_tokens", "refresh_tokens", "posts"];

/// Create the connection pool
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
}

/// Verify database connectivity
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Check that every required table exists
pub async fn check_schema(pool: &PgPool) -> AppResult<()> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Err(AppError::SchemaIncomplete(table.to_string()));
        }
    }

    tracing::info!("Database schema verified");
    Ok(())
}
