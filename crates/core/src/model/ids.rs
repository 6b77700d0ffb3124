use serde::{Deserialize, Serialize};
use std::fmt;

/// Content hash identifying a flip.
///
/// Stable across reloads; used as list key and to correlate submission results.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlipHash(String);

impl FlipHash {
    /// Creates a new `FlipHash`
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the underlying hash string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validation epoch identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epoch(u64);

impl Epoch {
    /// Creates a new `Epoch`
    #[must_use]
    pub fn new(epoch: u64) -> Self {
        Self(epoch)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for FlipHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlipHash({})", self.0)
    }
}

impl fmt::Debug for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Epoch({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for FlipHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FlipHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FlipHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
