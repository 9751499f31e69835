//! Error reporter adapters.

use crate::application::ports::ErrorReporter;
use crate::domain::report::FailureReport;
use tracing::error;

/// Reports failures as `tracing` events at ERROR level.
///
/// Events use the target `dispatch_throttle::report` so subscribers can route
/// them to a crash-reporting layer separately from ordinary logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    /// Create a new tracing reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ErrorReporter for TracingReporter {
    fn report(&self, report: &FailureReport) {
        error!(
            target: "dispatch_throttle::report",
            recipient = %report.recipient,
            error = %report.error,
            payload = %report.payload,
            "message delivery failed"
        );
    }
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report(&self, _report: &FailureReport) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::MockCaptureLayer;
    use std::io;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    fn sample() -> FailureReport {
        let err = io::Error::new(io::ErrorKind::Other, "provider returned 503");
        FailureReport::new("*****0100", &err, "bill_reminder (140 chars)")
    }

    #[test]
    fn test_tracing_reporter_emits_error_event() {
        let capture = MockCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        tracing::subscriber::with_default(subscriber, || {
            TracingReporter::new().report(&sample());
        });

        let events = capture.get_captured();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::ERROR);
        assert_eq!(events[0].target, "dispatch_throttle::report");
        assert_eq!(
            events[0].fields.get("recipient").map(String::as_str),
            Some("*****0100")
        );
        assert_eq!(
            events[0].fields.get("error").map(String::as_str),
            Some("provider returned 503")
        );
    }

    #[test]
    fn test_noop_reporter_is_silent() {
        let capture = MockCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        tracing::subscriber::with_default(subscriber, || {
            NoopReporter.report(&sample());
        });

        assert_eq!(capture.count(), 0);
    }
}
