//! Basic example demonstrating per-recipient rate limiting.
//!
//! Sends eight messages to one recipient through a dry-run channel with a
//! limit of 3 per 2 seconds, waits for the window to slide, and sends again.
//!
//! Run with `RUST_LOG=debug cargo run --example basic` to see every decision.

use dispatch_throttle::{DispatcherBuilder, LogChannel, RecipientKey, SmsMessage};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let dispatcher = DispatcherBuilder::new()
        .with_limit(3, Duration::from_secs(2))
        .build(LogChannel::new("dry-run"))
        .expect("3 per 2 seconds is a valid limit");

    let alice = RecipientKey::new("+15550100").expect("non-empty key");
    let bob = RecipientKey::new("+15550199").expect("non-empty key");

    println!("=== Basic Rate Limiting Example ===\n");
    println!("Limit: 3 messages per recipient per 2 seconds\n");

    println!("Sending 8 messages to alice:");
    for i in 1..=8 {
        let message = SmsMessage::text(format!("update {}", i));
        match dispatcher.dispatch(&alice, &message).await {
            Ok(receipt) => println!("  #{} sent (channel sequence {})", i, receipt.sequence),
            Err(err) => println!("  #{} {}", i, err),
        }
    }

    println!("\nBob's window is independent:");
    let result = dispatcher.dispatch(&bob, &SmsMessage::text("hello bob")).await;
    println!("  sent: {}", result.is_ok());

    println!("\nWaiting for alice's window to slide...");
    tokio::time::sleep(Duration::from_secs(2)).await;
    let result = dispatcher.dispatch(&alice, &SmsMessage::text("after the wait")).await;
    println!("  sent: {}", result.is_ok());

    let snapshot = dispatcher.metrics().snapshot();
    println!("\n=== Metrics ===");
    println!("Succeeded:    {}", snapshot.sends_succeeded);
    println!("Rate limited: {}", snapshot.sends_rate_limited);
    println!("Rejection rate: {:.1}%", snapshot.rejection_rate() * 100.0);
}
