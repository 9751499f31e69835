//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Rate limiter (per-recipient admission decisions)
//! - Dispatcher (limit, send, classify, report)
//! - Sweeper (periodic removal of idle windows)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod dispatcher;
pub mod limiter;
pub mod metrics;
pub mod ports;

#[cfg(feature = "async")]
pub mod sweeper;
