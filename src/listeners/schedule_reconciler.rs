//! Schedule Reconciler
//!
//! When the site timezone changes, scheduled posts are moved by the offset
//! difference between the new and previous zone so they still go out at the
//! intended wall-clock time. A post whose shifted time is already past, or
//! falls inside the imminence window, is demoted to draft instead.
//!
//! Example:
//! - configured zone is UTC+01:00, now is 10:00 local (09:00 UTC)
//! - a post is due at 19:00 local (18:00 UTC)
//! - the zone is changed to UTC+08:00, a shift of +420 minutes
//! - the post moves to 01:00 UTC on the next day
//!
//! The offset difference is taken once, at the current instant. Daylight-saving
//! transitions between now and a post's publish time are not accounted for.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use uuid::Uuid;

use super::ListenerError;
use crate::bus::EventListener;
use crate::clock::Clock;
use crate::domain::{DomainEvent, OperationContext, Post, PostChanges, PostFilter, PostStatus};
use crate::reporting::{ErrorReporter, ReportedError};
use crate::store::RecordStore;
use crate::timezone;

/// Default imminence window in minutes
pub const DEFAULT_IMMINENCE_MINUTES: i64 = 5;

/// Largest accepted imminence window in minutes (one day)
pub const MAX_IMMINENCE_MINUTES: i64 = 24 * 60;

/// Tuning for the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerSettings {
    /// Shifted publish times earlier than `now + imminence` are drafted
    pub imminence: Duration,
}

impl ReconcilerSettings {
    /// Window clamped to `0..=MAX_IMMINENCE_MINUTES`
    pub fn with_imminence_minutes(minutes: i64) -> Self {
        Self {
            imminence: Duration::minutes(minutes.clamp(0, MAX_IMMINENCE_MINUTES)),
        }
    }
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self::with_imminence_minutes(DEFAULT_IMMINENCE_MINUTES)
    }
}

// =========================================================================
// Rescheduling decision
// =========================================================================

/// What happens to one scheduled post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reschedule {
    /// Stays scheduled, at the shifted instant
    Shift(DateTime<Utc>),
    /// Shifted instant is past or imminent
    Draft,
}

impl Reschedule {
    /// Update to send to the store
    pub fn changes(&self) -> PostChanges {
        match self {
            Reschedule::Shift(at) => PostChanges::published_at(*at),
            Reschedule::Draft => PostChanges::status(PostStatus::Draft),
        }
    }
}

/// Decide how a scheduled post follows a timezone offset change
pub fn plan_reschedule(
    post: &Post,
    offset_diff_minutes: i64,
    now: DateTime<Utc>,
    imminence: Duration,
) -> Result<Reschedule, ListenerError> {
    let published_at = post
        .published_at
        .ok_or(ListenerError::MissingPublishTime(post.id))?;

    let corrected = Duration::try_minutes(offset_diff_minutes)
        .and_then(|shift| published_at.checked_add_signed(shift))
        .ok_or(ListenerError::PublishTimeOutOfRange(post.id, offset_diff_minutes))?;

    let cutoff = now
        .checked_add_signed(imminence)
        .ok_or(ListenerError::ImminenceOutOfRange(imminence.num_minutes()))?;

    if corrected < cutoff {
        Ok(Reschedule::Draft)
    } else {
        Ok(Reschedule::Shift(corrected))
    }
}

// =========================================================================
// Outcome
// =========================================================================

/// Result of one reconciliation run
#[derive(Debug, Default)]
pub struct ReconciliationOutcome {
    /// Nothing was read or written: the timezone did not change
    pub skipped: bool,
    pub offset_diff_minutes: i64,
    pub rescheduled: Vec<Uuid>,
    pub drafted: Vec<Uuid>,
    /// Posts whose update failed, with the failure
    pub failures: Vec<(Uuid, ListenerError)>,
}

impl ReconciliationOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    fn with_offset(offset_diff_minutes: i64) -> Self {
        Self {
            offset_diff_minutes,
            ..Self::default()
        }
    }

    /// Number of posts an update was attempted for
    pub fn attempted(&self) -> usize {
        self.rescheduled.len() + self.drafted.len() + self.failures.len()
    }
}

// =========================================================================
// ScheduleReconciler
// =========================================================================

/// Listener for `settings.activeTimezone.edited`
pub struct ScheduleReconciler {
    store: Arc<dyn RecordStore>,
    reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
    settings: ReconcilerSettings,
}

impl ScheduleReconciler {
    pub const NAME: &'static str = "schedule_reconciler";

    pub fn new(
        store: Arc<dyn RecordStore>,
        reporter: Arc<dyn ErrorReporter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            reporter,
            clock,
            settings: ReconcilerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ReconcilerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Shift every scheduled post by the offset change from `previous` to `new`.
    ///
    /// Per-post failures are collected in the outcome; only a failure that
    /// stops the whole run is returned as `Err`.
    pub async fn execute(
        &self,
        new_timezone: &str,
        previous_timezone: &str,
    ) -> Result<ReconciliationOutcome, ListenerError> {
        if new_timezone == previous_timezone {
            tracing::debug!(timezone = new_timezone, "Timezone edited without change");
            return Ok(ReconciliationOutcome::skipped());
        }

        let now = self.clock.now();
        let offset_diff = timezone::offset_diff_minutes(new_timezone, previous_timezone, now)?;

        let context = OperationContext::internal().with_correlation_id(Uuid::new_v4());
        let posts = self
            .store
            .find_posts(&PostFilter::with_status(PostStatus::Scheduled), &context)
            .await?;

        let mut outcome = ReconciliationOutcome::with_offset(offset_diff);
        if posts.is_empty() {
            tracing::debug!("No scheduled posts to reconcile");
            return Ok(outcome);
        }

        let context = &context;
        let updates = posts.iter().map(|post| async move {
            let result = self.reschedule(post, offset_diff, now, context).await;
            (post.id, result)
        });

        for (post_id, result) in join_all(updates).await {
            match result {
                Ok(Reschedule::Shift(_)) => outcome.rescheduled.push(post_id),
                Ok(Reschedule::Draft) => outcome.drafted.push(post_id),
                Err(e) => outcome.failures.push((post_id, e)),
            }
        }

        tracing::info!(
            new_timezone = new_timezone,
            previous_timezone = previous_timezone,
            offset_diff_minutes = offset_diff,
            rescheduled = outcome.rescheduled.len(),
            drafted = outcome.drafted.len(),
            failed = outcome.failures.len(),
            "Reconciled scheduled posts"
        );

        Ok(outcome)
    }

    async fn reschedule(
        &self,
        post: &Post,
        offset_diff_minutes: i64,
        now: DateTime<Utc>,
        context: &OperationContext,
    ) -> Result<Reschedule, ListenerError> {
        let plan = plan_reschedule(post, offset_diff_minutes, now, self.settings.imminence)?;

        self.store.edit_post(post.id, &plan.changes(), context).await?;

        if plan == Reschedule::Draft {
            tracing::info!(post_id = %post.id, "Scheduled post moved to draft");
        }

        Ok(plan)
    }
}

#[async_trait]
impl EventListener for ScheduleReconciler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn handle(&self, event: &DomainEvent) {
        let DomainEvent::ActiveTimezoneEdited {
            new_value,
            previous_value,
        } = event
        else {
            return;
        };

        match self.execute(new_value, previous_value).await {
            Ok(outcome) => {
                for (post_id, e) in &outcome.failures {
                    self.reporter
                        .report(ReportedError::new(Self::NAME, e).with_subject(*post_id));
                }
            }
            Err(e) => self.reporter.report(ReportedError::critical(Self::NAME, &e)),
        }
    }
}
