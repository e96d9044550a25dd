//! Event Bus
//!
//! Explicit event-dispatch interface. Listeners register against an
//! [`EventDispatcher`] instead of a process-global emitter, so they can be
//! exercised without a live bus.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{DomainEvent, EventName};

/// A subscriber reacting to domain events.
///
/// `handle` is infallible: a listener recovers from its own failures (by
/// reporting them) and never hands them back to the bus.
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Stable name used in logs and reports
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &DomainEvent);
}

/// Registration side of a bus
pub trait EventDispatcher {
    fn subscribe(&mut self, event: EventName, listener: Arc<dyn EventListener>);
}

/// Bus that delivers events to listeners in the current task
#[derive(Clone, Default)]
pub struct InProcessEventBus {
    subscribers: HashMap<EventName, Vec<Arc<dyn EventListener>>>,
}

impl InProcessEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listeners subscribed to `event`
    pub fn listener_count(&self, event: EventName) -> usize {
        self.subscribers.get(&event).map_or(0, Vec::len)
    }

    /// Deliver an event to every subscriber, in subscription order.
    /// Returns the number of listeners that handled it.
    pub async fn emit(&self, event: &DomainEvent) -> usize {
        let name = event.name();
        let Some(listeners) = self.subscribers.get(&name) else {
            tracing::debug!(event = %name, "No listeners subscribed");
            return 0;
        };

        for listener in listeners {
            tracing::debug!(event = %name, listener = listener.name(), "Dispatching event");
            listener.handle(event).await;
        }

        listeners.len()
    }

    /// Decode a JSON payload and deliver it
    pub async fn emit_json(&self, payload: &str) -> Result<usize, serde_json::Error> {
        let event: DomainEvent = serde_json::from_str(payload)?;
        Ok(self.emit(&event).await)
    }
}

impl EventDispatcher for InProcessEventBus {
    fn subscribe(&mut self, event: EventName, listener: Arc<dyn EventListener>) {
        tracing::info!(event = %event, listener = listener.name(), "Listener subscribed");
        self.subscribers.entry(event).or_default().push(listener);
    }
}
