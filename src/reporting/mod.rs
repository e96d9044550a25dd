//! Error Reporting
//!
//! Sink for failures the listeners swallow. Reports are fire-and-forget: the
//! listener never waits on, or branches on, the outcome of a report.

use std::fmt;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// Severity attached to a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    /// The listener could not fulfil its purpose at all
    Critical,
}

impl ErrorLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failure handed to the error sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    /// `Some(Critical)` or unset
    pub level: Option<ErrorLevel>,
    /// Listener that produced the failure
    pub listener: &'static str,
    /// Record the failure is about, if any
    pub subject_id: Option<Uuid>,
    pub message: String,
}

impl ReportedError {
    /// Report with default severity
    pub fn new(listener: &'static str, error: &impl fmt::Display) -> Self {
        Self {
            level: None,
            listener,
            subject_id: None,
            message: error.to_string(),
        }
    }

    /// Report at critical severity
    pub fn critical(listener: &'static str, error: &impl fmt::Display) -> Self {
        Self {
            level: Some(ErrorLevel::Critical),
            ..Self::new(listener, error)
        }
    }

    pub fn with_subject(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    pub fn is_critical(&self) -> bool {
        self.level == Some(ErrorLevel::Critical)
    }
}

/// Trait for receiving swallowed listener failures.
///
/// `report()` must not block and must not fail; the listener has already
/// decided how to proceed by the time it reports.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: ReportedError);
}

/// Writes reports to the tracing subscriber
#[derive(Debug, Clone, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, error: ReportedError) {
        let subject_id = error.subject_id.map(|id| id.to_string()).unwrap_or_default();

        match error.level {
            Some(level) => tracing::error!(
                severity = %level,
                listener = error.listener,
                subject_id = %subject_id,
                "{}",
                error.message
            ),
            None => tracing::warn!(
                listener = error.listener,
                subject_id = %subject_id,
                "{}",
                error.message
            ),
        }
    }
}

/// Collects reports in memory for assertions
#[derive(Debug, Clone, Default)]
pub struct CollectingErrorReporter {
    reports: Arc<Mutex<Vec<ReportedError>>>,
}

impl CollectingErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected reports.
    pub fn reports(&self) -> Vec<ReportedError> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns only the critical reports.
    pub fn critical(&self) -> Vec<ReportedError> {
        self.reports().into_iter().filter(|r| r.is_critical()).collect()
    }

    pub fn len(&self) -> usize {
        self.reports().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorReporter for CollectingErrorReporter {
    fn report(&self, error: ReportedError) {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(error);
    }
}
