//! Account alerts over SMS with failure reporting.
//!
//! Renders notification templates, sends them through a gateway that drops
//! every third message, and prints each failure report as JSON.
//!
//! With the `http` feature and `SMS_ACCOUNT_SID`, `SMS_AUTH_TOKEN` and
//! `SMS_FROM_NUMBER` set, messages go to the real gateway instead.

use async_trait::async_trait;
use chrono::NaiveDate;
use dispatch_throttle::{
    AlertTemplate, DispatchChannel, DispatcherBuilder, ErrorReporter, FailureReport,
    RecipientKey, SmsMessage, SmsTemplate,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
#[error("gateway dropped message {0}")]
struct Dropped(u64);

/// Simulated gateway that fails every third send.
#[derive(Debug, Default)]
struct FlakyGateway {
    calls: AtomicU64,
}

#[async_trait]
impl DispatchChannel for FlakyGateway {
    type Payload = SmsMessage;
    type Response = u64;
    type Error = Dropped;

    async fn send(
        &self,
        _recipient: &RecipientKey,
        message: &SmsMessage,
    ) -> Result<u64, Dropped> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        tokio::time::sleep(Duration::from_millis(20)).await;
        if n % 3 == 0 {
            return Err(Dropped(n));
        }
        println!("  [gateway] {}", message.body());
        Ok(n)
    }
}

/// Prints reports as JSON lines, as a log shipper would receive them.
#[derive(Debug)]
struct JsonReporter;

impl ErrorReporter for JsonReporter {
    fn report(&self, report: &FailureReport) {
        match serde_json::to_string(report) {
            Ok(line) => println!("  [report] {}", line),
            Err(e) => eprintln!("  [report] unserializable report: {}", e),
        }
    }
}

fn notifications() -> Vec<SmsMessage> {
    vec![
        SmsTemplate::VerificationCode {
            code: "483920".to_string(),
        }
        .into(),
        SmsTemplate::PaymentConfirmation {
            amount_cents: 4_599,
            recipient: "City Power".to_string(),
        }
        .into(),
        SmsTemplate::BillReminder {
            bill_id: "B-1042".to_string(),
            amount_cents: 12_000,
            due_date: NaiveDate::from_ymd_opt(2024, 7, 1).expect("valid date"),
        }
        .into(),
        AlertTemplate::BudgetExceeded {
            category: "groceries".to_string(),
            spent_cents: 52_000,
            budget_cents: 45_000,
        }
        .into(),
        AlertTemplate::LowBalance {
            account_id: "checking-01".to_string(),
            balance_cents: 2_350,
            threshold_cents: 5_000,
        }
        .into(),
        AlertTemplate::UnusualActivity {
            transaction_id: "T-88812".to_string(),
            amount_cents: 189_900,
            reason: "new merchant".to_string(),
        }
        .into(),
    ]
}

/// Send every notification through the real gateway, if one is configured.
#[cfg(feature = "http")]
async fn send_via_gateway() -> bool {
    use dispatch_throttle::{HttpSmsChannel, HttpSmsConfig};

    let Ok(config) = HttpSmsConfig::from_env() else {
        return false;
    };
    let channel = HttpSmsChannel::new(config).expect("http client");
    let dispatcher = DispatcherBuilder::new()
        .build(channel)
        .expect("default limits are valid");
    let to = std::env::var("SMS_TO_NUMBER").unwrap_or_else(|_| "+15550100".to_string());
    let key = RecipientKey::new(to).expect("non-empty recipient");

    for message in notifications() {
        match dispatcher.dispatch(&key, &message).await {
            Ok(receipt) => {
                println!("{} -> {} ({})", message.kind(), receipt.sid, receipt.status)
            }
            Err(err) => println!("{} -> {}", message.kind(), err),
        }
    }
    true
}

#[cfg(not(feature = "http"))]
async fn send_via_gateway() -> bool {
    false
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if send_via_gateway().await {
        return;
    }

    let dispatcher = DispatcherBuilder::new()
        .with_limit(5, Duration::from_secs(60))
        .with_reporter(Arc::new(JsonReporter))
        .build(FlakyGateway::default())
        .expect("5 per minute is a valid limit");
    let key = RecipientKey::new("+15550100").expect("non-empty recipient");

    println!("=== SMS Alerts Example ===\n");
    println!("Limit: 5 per minute; the gateway drops every third message\n");

    for message in notifications() {
        println!("{}:", message.kind());
        match dispatcher.dispatch(&key, &message).await {
            Ok(n) => println!("  delivered (gateway call {})", n),
            Err(err) => println!("  {} [{}]", err, err.kind()),
        }
    }

    let snapshot = dispatcher.metrics().snapshot();
    println!("\n=== Metrics ===");
    println!("Succeeded:    {}", snapshot.sends_succeeded);
    println!("Failed:       {}", snapshot.sends_failed);
    println!("Rate limited: {}", snapshot.sends_rate_limited);
}
