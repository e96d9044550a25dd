//! Model Listeners
//!
//! Reactive side-effects on domain events. Each listener owns one event,
//! talks to the record store, and reports its own failures; none of them
//! depends on another.

mod account_revocation;
mod credential_seen;
mod error;
mod schedule_reconciler;


use std::sync::Arc;

use crate::bus::EventDispatcher;
use crate::clock::Clock;
use crate::domain::EventName;
use crate::reporting::ErrorReporter;
use crate::store::RecordStore;

pub use account_revocation::{AccountRevocationHandler, RevocationResult};
pub use credential_seen::CredentialSeenTracker;
pub use error::ListenerError;
pub use schedule_reconciler::{
    plan_reschedule, ReconcilerSettings, ReconciliationOutcome, Reschedule, ScheduleReconciler,
    DEFAULT_IMMINENCE_MINUTES, MAX_IMMINENCE_MINUTES,
};

/// Collaborators shared by all listeners
#[derive(Clone)]
pub struct ListenerDeps {
    pub store: Arc<dyn RecordStore>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub clock: Arc<dyn Clock>,
}

impl ListenerDeps {
    pub fn new(
        store: Arc<dyn RecordStore>,
        reporter: Arc<dyn ErrorReporter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            reporter,
            clock,
        }
    }
}

/// Subscribe every listener to its event. Call once at startup.
pub fn register_all(
    dispatcher: &mut impl EventDispatcher,
    deps: &ListenerDeps,
    settings: ReconcilerSettings,
) {
    dispatcher.subscribe(
        EventName::CredentialAdded,
        Arc::new(CredentialSeenTracker::new(
            deps.store.clone(),
            deps.reporter.clone(),
            deps.clock.clone(),
        )),
    );

    dispatcher.subscribe(
        EventName::UserDeactivated,
        Arc::new(AccountRevocationHandler::new(
            deps.store.clone(),
            deps.reporter.clone(),
        )),
    );

    dispatcher.subscribe(
        EventName::ActiveTimezoneEdited,
        Arc::new(
            ScheduleReconciler::new(deps.store.clone(), deps.reporter.clone(), deps.clock.clone())
                .with_settings(settings),
        ),
    );
}
