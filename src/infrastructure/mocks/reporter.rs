//! Recording error reporter for testing.

use crate::application::ports::ErrorReporter;
use crate::domain::report::FailureReport;
use std::sync::{Arc, Mutex};

/// Reporter that keeps every report it receives.
///
/// Clones share the same report list.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    reports: Arc<Mutex<Vec<FailureReport>>>,
    panic_on_report: bool,
}

impl RecordingReporter {
    /// Create a recorder that stores reports.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder that panics on every report, after storing it.
    pub fn panicking() -> Self {
        Self {
            panic_on_report: true,
            ..Self::default()
        }
    }

    /// Every report received so far.
    pub fn reports(&self) -> Vec<FailureReport> {
        self.reports
            .lock()
            .expect("RecordingReporter mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, report: &FailureReport) {
        self.reports
            .lock()
            .expect("RecordingReporter mutex poisoned - a test thread panicked while holding the lock")
            .push(report.clone());

        if self.panic_on_report {
            panic!("RecordingReporter configured to panic");
        }
    }
}
