//! Service runtime
//!
//! Wires the listeners onto an in-process bus and feeds it with events
//! received on a Postgres NOTIFY channel.

use std::future::Future;
use std::sync::Arc;

use sqlx::postgres::PgListener;

use crate::bus::InProcessEventBus;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::AppResult;
use crate::listeners::{self, ListenerDeps};
use crate::reporting::TracingErrorReporter;
use crate::store::RecordStore;

/// Counters for one relay session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub delivered: u64,
    pub rejected: u64,
}

/// Build a bus with every listener registered against `store`
pub fn build_bus(store: Arc<dyn RecordStore>, config: &Config) -> InProcessEventBus {
    let deps = ListenerDeps::new(store, Arc::new(TracingErrorReporter), Arc::new(SystemClock));

    let mut bus = InProcessEventBus::new();
    listeners::register_all(&mut bus, &deps, config.reconciler_settings());
    bus
}

/// Deliver one raw payload to the bus
pub async fn relay_payload(bus: &InProcessEventBus, payload: &str) -> AppResult<usize> {
    Ok(bus.emit_json(payload).await?)
}

/// Relay notifications from `listener` into the bus until `shutdown` resolves.
///
/// Malformed payloads are logged and skipped; losing the channel ends the relay.
pub async fn relay_notifications<S>(
    listener: &mut PgListener,
    bus: &InProcessEventBus,
    shutdown: S,
) -> AppResult<RelayStats>
where
    S: Future<Output = ()>,
{
    let mut stats = RelayStats::default();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!(
                    delivered = stats.delivered,
                    rejected = stats.rejected,
                    "Event relay stopped"
                );
                return Ok(stats);
            }
            notification = listener.recv() => {
                let notification = notification?;
                match relay_payload(bus, notification.payload()).await {
                    Ok(_) => stats.delivered += 1,
                    Err(e) if e.is_recoverable() => {
                        stats.rejected += 1;
                        tracing::warn!(
                            channel = notification.channel(),
                            error = %e,
                            "Skipping malformed event"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }
}

/// Open a listener on the configured channel
pub async fn listen(pool: &sqlx::PgPool, config: &Config) -> AppResult<PgListener> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(&config.event_channel).await?;

    tracing::info!(channel = %config.event_channel, "Listening for domain events");
    Ok(listener)
}

/// Install the signal handlers; the returned future resolves on Ctrl+C or SIGTERM
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(async move {
        #[cfg(unix)]
        let terminate = sigterm.recv();

        #[cfg(not(unix))]
        let terminate = std::future::pending::<Option<()>>();

        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => tracing::info!("Received Ctrl+C, initiating graceful shutdown..."),
                Err(e) => tracing::error!(error = %e, "Ctrl+C handler failed, shutting down"),
            },
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown...");
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventName;
    use crate::error::AppError;
    use crate::store::InMemoryRecordStore;

    fn config() -> Config {
        Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/blog".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_build_bus_registers_every_listener() {
        let bus = build_bus(Arc::new(InMemoryRecordStore::new()), &config());

        assert_eq!(bus.listener_count(EventName::CredentialAdded), 1);
        assert_eq!(bus.listener_count(EventName::UserDeactivated), 1);
        assert_eq!(bus.listener_count(EventName::ActiveTimezoneEdited), 1);
    }

    #[tokio::test]
    async fn test_relay_payload_rejects_malformed_json() {
        let bus = build_bus(Arc::new(InMemoryRecordStore::new()), &config());

        let err = relay_payload(&bus, r#"{"event":"user.deactivated"}"#)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidEvent(_)));
    }

    #[tokio::test]
    async fn test_relay_payload_delivers_event() {
        let bus = build_bus(Arc::new(InMemoryRecordStore::new()), &config());

        let handled = relay_payload(
            &bus,
            r#"{"event":"settings.activeTimezone.edited","new_value":"Etc/UTC","previous_value":"Etc/UTC"}"#,
        )
        .await
        .unwrap();

        assert_eq!(handled, 1);
    }

    #[tokio::test]
    async fn test_shutdown_signal_waits_for_a_signal() {
        let shutdown = shutdown_signal().unwrap();

        let fired = tokio::time::timeout(std::time::Duration::from_millis(20), shutdown).await;

        assert!(fired.is_err());
    }
}
