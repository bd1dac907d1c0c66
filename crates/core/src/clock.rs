//! Injectable time and version sources
//!
//! Versions used to be raw wall-clock milliseconds. Two writes in the same
//! millisecond then carry the same version, and tests cannot control which
//! write wins. Every component that needs a version or a timestamp now takes
//! a `Clock`.
//!
//! | Clock | `next_version()` |
//! |-------|------------------|
//! | `SystemClock` | wall-clock milliseconds (may repeat) |
//! | `MonotonicClock` | `max(wall_ms, last + 1)`, strictly increasing |
//! | `LogicalClock` | Lamport counter, advanced by `observe()` |
//! | `ManualClock` | milliseconds of a test-controlled time |

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::contract::{Timestamp, Version};

/// Source of timestamps and candidate versions
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> Timestamp;

    /// Candidate version for the next write
    ///
    /// Defaults to the current time in milliseconds.
    fn next_version(&self) -> Version {
        Version::new(self.now().as_millis())
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn next_version(&self) -> Version {
        (**self).next_version()
    }
}

/// Wall clock with millisecond versions
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Hybrid clock: wall-clock milliseconds, bumped to stay strictly increasing
///
/// If the physical clock stalls or steps backwards, versions keep climbing
/// one at a time until physical time catches up.
pub struct MonotonicClock {
    source: Arc<dyn Clock>,
    last: AtomicU64,
}

impl MonotonicClock {
    /// Monotonic clock over the system clock
    pub fn new() -> Self {
        Self::with_source(Arc::new(SystemClock))
    }

    /// Monotonic clock over an arbitrary physical source
    pub fn with_source(source: Arc<dyn Clock>) -> Self {
        Self {
            source,
            last: AtomicU64::new(0),
        }
    }

    /// Last version handed out (zero before the first call)
    pub fn last_version(&self) -> Version {
        Version::new(self.last.load(Ordering::Acquire))
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MonotonicClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonotonicClock")
            .field("last", &self.last.load(Ordering::Relaxed))
            .finish()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.source.now()
    }

    fn next_version(&self) -> Version {
        let physical = self.source.now().as_millis();
        let mut prev = self.last.load(Ordering::Acquire);
        loop {
            let next = physical.max(prev.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return Version::new(next),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Lamport-style logical clock
///
/// Versions are a counter independent of wall time. Calling `observe` with a
/// version seen elsewhere (e.g. a replicated record) guarantees the next
/// local version is larger.
#[derive(Debug, Default)]
pub struct LogicalClock {
    counter: AtomicU64,
}

impl LogicalClock {
    /// Counter starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter starting at `start`; the first version handed out is `start + 1`
    pub fn starting_at(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }

    /// Advance past a version observed from another writer
    pub fn observe(&self, seen: Version) {
        self.counter.fetch_max(seen.as_u64(), Ordering::AcqRel);
    }

    /// Current counter value
    pub fn current(&self) -> Version {
        Version::new(self.counter.load(Ordering::Acquire))
    }
}

impl Clock for LogicalClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn next_version(&self) -> Version {
        let prev = self.counter.fetch_add(1, Ordering::AcqRel);
        Version::new(prev.saturating_add(1))
    }
}

/// Test clock whose time only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    /// Clock frozen at the given time
    pub fn new(start: Timestamp) -> Self {
        Self {
            micros: AtomicU64::new(start.as_micros()),
        }
    }

    /// Clock frozen at the given millisecond
    pub fn at_millis(millis: u64) -> Self {
        Self::new(Timestamp::from_millis(millis))
    }

    /// Jump to a time
    pub fn set(&self, ts: Timestamp) {
        self.micros.store(ts.as_micros(), Ordering::Release);
    }

    /// Jump to a millisecond
    pub fn set_millis(&self, millis: u64) {
        self.set(Timestamp::from_millis(millis));
    }

    /// Move forward
    pub fn advance(&self, by: Duration) {
        self.micros
            .fetch_add(by.as_micros() as u64, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.micros.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_system_clock_versions_are_millis() {
        let clock = SystemClock;
        let before = Timestamp::now().as_millis();
        let v = clock.next_version().as_u64();
        let after = Timestamp::now().as_millis();
        assert!(v >= before && v <= after);
    }

    #[test]
    fn test_manual_clock_is_frozen() {
        let clock = ManualClock::at_millis(1_000);
        assert_eq!(clock.next_version(), Version::new(1_000));
        assert_eq!(clock.next_version(), Version::new(1_000));

        clock.advance(Duration::from_millis(5));
        assert_eq!(clock.next_version(), Version::new(1_005));

        clock.set_millis(10);
        assert_eq!(clock.now(), Timestamp::from_millis(10));
    }

    #[test]
    fn test_monotonic_clock_breaks_ties_within_a_millisecond() {
        let physical = Arc::new(ManualClock::at_millis(500));
        let clock = MonotonicClock::with_source(physical.clone());

        assert_eq!(clock.next_version(), Version::new(500));
        assert_eq!(clock.next_version(), Version::new(501));
        assert_eq!(clock.next_version(), Version::new(502));

        // Physical time jumps ahead: follow it
        physical.set_millis(1_000);
        assert_eq!(clock.next_version(), Version::new(1_000));
    }

    #[test]
    fn test_monotonic_clock_survives_backwards_step() {
        let physical = Arc::new(ManualClock::at_millis(2_000));
        let clock = MonotonicClock::with_source(physical.clone());
        assert_eq!(clock.next_version(), Version::new(2_000));

        physical.set_millis(1_000);
        assert_eq!(clock.next_version(), Version::new(2_001));
        assert_eq!(clock.last_version(), Version::new(2_001));
    }

    #[test]
    fn test_logical_clock_observe() {
        let clock = LogicalClock::new();
        assert_eq!(clock.next_version(), Version::new(1));
        assert_eq!(clock.next_version(), Version::new(2));

        clock.observe(Version::new(100));
        assert_eq!(clock.next_version(), Version::new(101));

        // Observing an older version is a no-op
        clock.observe(Version::new(5));
        assert_eq!(clock.next_version(), Version::new(102));
    }

    #[test]
    fn test_monotonic_clock_concurrent_versions_unique() {
        use std::collections::HashSet;
        use std::thread;

        let clock = Arc::new(MonotonicClock::with_source(Arc::new(ManualClock::at_millis(1))));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let clock = Arc::clone(&clock);
                thread::spawn(move || (0..250).map(|_| clock.next_version()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for v in handle.join().unwrap() {
                assert!(seen.insert(v), "duplicate version {}", v);
            }
        }
        assert_eq!(seen.len(), 1_000);
    }

    proptest! {
        #[test]
        fn prop_monotonic_clock_strictly_increases(steps in proptest::collection::vec(0u64..10_000, 1..50)) {
            let physical = Arc::new(ManualClock::at_millis(0));
            let clock = MonotonicClock::with_source(physical.clone());
            let mut prev = Version::ZERO;
            for millis in steps {
                physical.set_millis(millis);
                let v = clock.next_version();
                prop_assert!(v > prev);
                prev = v;
            }
        }
    }
}
