//! Domain layer - pure business logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of dispatch throttling:
//! - Recipient keys and their redaction in reports
//! - The sliding-window configuration and per-recipient window
//! - The outcome and error taxonomy of a dispatch attempt
//! - Message payloads and templates
//!
//! All types in this layer are pure and easily testable.

pub mod config;
pub mod message;
pub mod outcome;
pub mod recipient;
pub mod report;
pub mod window;
