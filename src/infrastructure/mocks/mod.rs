//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of dispatch logic.

pub mod channel;
pub mod clock;
pub mod layer;
pub mod reporter;

pub use channel::{MockChannel, MockChannelError, MockReceipt};
pub use clock::MockClock;
pub use layer::{CapturedEvent, MockCaptureLayer};
pub use reporter::RecordingReporter;
