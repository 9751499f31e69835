//! Structured log output of the dispatcher and default reporter.

use dispatch_throttle::infrastructure::mocks::{MockCaptureLayer, MockChannel};
use dispatch_throttle::{DispatcherBuilder, RecipientKey, Redaction};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

fn key() -> RecipientKey {
    RecipientKey::new("+15550100").unwrap()
}

#[tokio::test]
async fn test_rejection_logged_as_warning_with_redacted_recipient() {
    let capture = MockCaptureLayer::new();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));

    let dispatcher = DispatcherBuilder::new()
        .with_limit(1, Duration::from_secs(60))
        .build(MockChannel::succeeding())
        .unwrap();

    dispatcher.dispatch(&key(), &"a".to_string()).await.unwrap();
    capture.clear();
    dispatcher.dispatch(&key(), &"a".to_string()).await.unwrap_err();

    let warnings: Vec<_> = capture
        .get_captured()
        .into_iter()
        .filter(|e| e.level == Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "dispatch rejected by rate limit");
    assert_eq!(warnings[0].fields["recipient"], "*****0100");
    assert_eq!(warnings[0].fields["outcome"], "rate_limited");
    assert_eq!(warnings[0].fields["retry_after_ms"], "60000");
}

#[tokio::test]
async fn test_failure_reported_through_tracing_by_default() {
    let capture = MockCaptureLayer::new();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));

    let dispatcher = DispatcherBuilder::new()
        .with_redaction(Redaction::Hash)
        .build(MockChannel::failing("carrier unreachable"))
        .unwrap();

    dispatcher
        .dispatch(&key(), &"your code is 483920".to_string())
        .await
        .unwrap_err();

    let reports: Vec<_> = capture
        .get_captured()
        .into_iter()
        .filter(|e| e.target == "dispatch_throttle::report")
        .collect();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].level, Level::ERROR);
    assert_eq!(reports[0].fields["error"], "carrier unreachable");
    assert_eq!(reports[0].fields["payload"], "text (19 chars)");
    assert!(reports[0].fields["recipient"].starts_with('#'));

    // Neither the raw recipient nor the body leaks into any event
    for event in capture.get_captured() {
        for value in event.fields.values() {
            assert!(!value.contains("+15550100"));
            assert!(!value.contains("483920"));
        }
    }
}

#[tokio::test]
async fn test_success_logged_at_debug() {
    let capture = MockCaptureLayer::new();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));

    let dispatcher = DispatcherBuilder::new()
        .build(MockChannel::succeeding())
        .unwrap();
    dispatcher.dispatch(&key(), &"hello".to_string()).await.unwrap();

    let events = capture.get_captured();
    assert_eq!(capture.count_at(Level::WARN) + capture.count_at(Level::ERROR), 0);
    assert!(events.iter().any(|e| {
        e.level == Level::DEBUG && e.fields.get("outcome").map(String::as_str) == Some("succeeded")
    }));
}
