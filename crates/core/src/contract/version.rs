//! Version stamp type
//!
//! Every accepted write carries a `Version`. Versions drive both the
//! optimistic concurrency check in `conditional_update` and the
//! last-write-wins tiebreak in conflict resolution.
//!
//! ## Invariants
//!
//! - Versions for a given key only ever increase through conditional updates
//! - `Version::ZERO` is lower than any version a clock hands out

use serde::{Deserialize, Serialize};

/// Monotonic version stamp
///
/// Ordered numerically. The default clock produces wall-clock milliseconds,
/// logical clocks produce counters; both fit in the same `u64` space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// The lowest version
    pub const ZERO: Version = Version(0);

    /// Create a version from a raw value
    #[inline]
    pub const fn new(v: u64) -> Self {
        Version(v)
    }

    /// Get the numeric value
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Next version up (saturates at `u64::MAX`)
    pub const fn increment(&self) -> Self {
        Version(self.0.saturating_add(1))
    }

    /// Check if this version is zero
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(v: u64) -> Self {
        Version(v)
    }
}

impl From<Version> for u64 {
    fn from(v: Version) -> Self {
        v.0
    }
}
