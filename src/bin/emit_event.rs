//! Event emitter tool
//!
//! Publishes a domain event on the listener channel, for manual testing.
//!
//! Run with:
//!   cargo run --bin emit_event -- timezone-edited <new> <previous>
//!   cargo run --bin emit_event -- user-deactivated <user_id>
//!   cargo run --bin emit_event -- --payload '<json>'

use publish_listeners::{Config, DomainEvent};
use uuid::Uuid;

fn usage() -> anyhow::Error {
    anyhow::anyhow!(
        "usage: emit_event (timezone-edited <new> <previous> | user-deactivated <user_id> | --payload <json>)"
    )
}

fn parse_event(args: &[String]) -> anyhow::Result<DomainEvent> {
    match args {
        [cmd, new, previous] if cmd == "timezone-edited" => {
            Ok(DomainEvent::active_timezone_edited(new.as_str(), previous.as_str()))
        }
        [cmd, user_id] if cmd == "user-deactivated" => {
            Ok(DomainEvent::user_deactivated(user_id.parse::<Uuid>()?))
        }
        [flag, payload] if flag == "--payload" => Ok(serde_json::from_str(payload)?),
        _ => Err(usage()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let event = parse_event(&args)?;

    let config = Config::from_env()?;
    let pool = publish_listeners::db::connect(&config).await?;

    let payload = serde_json::to_string(&event)?;
    sqlx::query("SELECT pg_notify($1, $2)")
        .bind(&config.event_channel)
        .bind(&payload)
        .execute(&pool)
        .await?;

    println!("Emitted {} on '{}'", event.name(), config.event_channel);
    println!("{}", payload);

    pool.close().await;
    Ok(())
}
