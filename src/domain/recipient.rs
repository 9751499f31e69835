//! Recipient keys and how they are rendered in failure reports.
//!
//! A [`RecipientKey`] is the unit of rate-limit accounting: every key owns
//! exactly one sliding window in the limiter. Keys are opaque strings (phone
//! numbers, e-mail addresses, device tokens) and are cheap to clone.

use ahash::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;

/// Error returned when a recipient key is empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("recipient key must not be empty")]
pub struct InvalidRecipient;

/// Validated, non-empty recipient identifier.
///
/// # Example
/// ```
/// use dispatch_throttle::RecipientKey;
///
/// let key = RecipientKey::new("+15550100").unwrap();
/// assert_eq!(key.as_str(), "+15550100");
///
/// assert!(RecipientKey::new("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipientKey(Arc<str>);

impl RecipientKey {
    /// Create a recipient key, rejecting empty or whitespace-only input.
    ///
    /// Surrounding whitespace is trimmed so `" +1555 "` and `"+1555"` share
    /// one rate-limit window.
    pub fn new(key: impl AsRef<str>) -> Result<Self, InvalidRecipient> {
        let trimmed = key.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidRecipient);
        }
        Ok(Self(Arc::from(trimmed)))
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecipientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecipientKey").field(&&*self.0).finish()
    }
}

impl fmt::Display for RecipientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecipientKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for RecipientKey {
    type Error = InvalidRecipient;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for RecipientKey {
    type Error = InvalidRecipient;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// Fixed seeds: hashed recipients stay comparable across restarts of the same build.
const REDACTION_SEEDS: (u64, u64, u64, u64) = (
    0x5ad1_7e9f_03c4_b821,
    0x9e37_79b9_7f4a_7c15,
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
);

/// How a recipient key appears in failure reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redaction {
    /// Render the key verbatim.
    Plain,
    /// Keep only the last `visible` characters, masking the rest with `*`.
    Mask {
        /// Number of trailing characters left readable
        visible: usize,
    },
    /// Replace the key with a stable 64-bit hash.
    Hash,
}

impl Default for Redaction {
    fn default() -> Self {
        Redaction::Mask { visible: 4 }
    }
}

impl Redaction {
    /// Render `key` according to this policy.
    ///
    /// ```
    /// use dispatch_throttle::{RecipientKey, Redaction};
    ///
    /// let key = RecipientKey::new("+15550100").unwrap();
    /// assert_eq!(Redaction::Plain.apply(&key), "+15550100");
    /// assert_eq!(Redaction::Mask { visible: 4 }.apply(&key), "*****0100");
    /// assert!(Redaction::Hash.apply(&key).starts_with('#'));
    /// ```
    pub fn apply(&self, key: &RecipientKey) -> String {
        match *self {
            Redaction::Plain => key.as_str().to_owned(),
            Redaction::Mask { visible } => {
                let total = key.as_str().chars().count();
                let hidden = total.saturating_sub(visible);
                key.as_str()
                    .chars()
                    .enumerate()
                    .map(|(i, c)| if i < hidden { '*' } else { c })
                    .collect()
            }
            Redaction::Hash => {
                let (k0, k1, k2, k3) = REDACTION_SEEDS;
                let mut hasher = RandomState::with_seeds(k0, k1, k2, k3).build_hasher();
                key.as_str().hash(&mut hasher);
                format!("#{:016x}", hasher.finish())
            }
        }
    }
}
