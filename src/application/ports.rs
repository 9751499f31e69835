//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::{message::Summarize, recipient::RecipientKey, report::FailureReport};
use async_trait::async_trait;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// Port for obtaining current time.
///
/// This abstraction allows the application layer to work with time
/// without depending on system clock implementation details.
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Port for concurrent key-value storage.
///
/// Implementations must serialize `with_entry_mut` calls for the same key
/// without serializing calls for unrelated keys behind a single lock.
/// Infrastructure provides the DashMap-backed `ShardedStorage`.
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Access an entry with mutable access, creating it if necessary.
    ///
    /// The accessor runs while the entry is locked.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    /// * `factory` - Function to create a new value if the key doesn't exist
    /// * `accessor` - Function that gets mutable access to the value
    ///
    /// # Returns
    /// The result from the accessor function
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R;

    /// Read an existing entry without creating it.
    fn with_entry<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&V) -> R;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Clear all entries from the storage.
    fn clear(&self);

    /// Remove entries for which the predicate returns false.
    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool;
}

/// Port for the outbound messaging provider (SMS gateway, mailer, push service).
///
/// The dispatcher treats a channel as an opaque capability: it never looks
/// inside responses or errors, it only forwards them.
#[async_trait]
pub trait DispatchChannel: Send + Sync + Debug {
    /// The message type this channel delivers.
    type Payload: Summarize + Send + Sync + ?Sized;
    /// Provider response on success.
    type Response: Send;
    /// Transport or provider-side failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver `payload` to `recipient`.
    ///
    /// Timeouts are the channel's responsibility.
    async fn send(
        &self,
        recipient: &RecipientKey,
        payload: &Self::Payload,
    ) -> Result<Self::Response, Self::Error>;
}

/// Port for failure telemetry (crash reporting, log shipping).
///
/// Reporting is fire-and-forget: implementations must not block for long and
/// whatever happens inside `report` never changes a dispatch result.
pub trait ErrorReporter: Send + Sync + Debug {
    /// Record a delivery failure.
    fn report(&self, report: &FailureReport);
}
