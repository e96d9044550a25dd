//! publish_listeners - model listener service
//!
//! Subscribes the content-publishing model listeners to the domain events
//! published on a Postgres NOTIFY channel.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use publish_listeners::config::LogFormat;
use publish_listeners::store::PgRecordStore;
use publish_listeners::{db, runtime, Config};

/// Initialize tracing/logging
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "publish_listeners=debug,sqlx=warn".into());

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    tracing::info!("Starting publish_listeners");
    tracing::info!("Connecting to database...");

    let pool = db::connect(&config).await?;
    db::verify_connection(&pool).await?;
    db::check_schema(&pool).await?;

    tracing::info!("Database connected successfully");

    let store = Arc::new(PgRecordStore::new(pool.clone()));
    let bus = runtime::build_bus(store, &config);

    let shutdown = runtime::shutdown_signal()?;
    let mut listener = runtime::listen(&pool, &config).await?;
    runtime::relay_notifications(&mut listener, &bus, shutdown).await?;

    // Cleanup
    tracing::info!("Service shutting down...");
    pool.close().await;
    tracing::info!("Database connections closed. Goodbye!");

    Ok(())
}
