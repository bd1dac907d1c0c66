//! Idempotency retention background task
//!
//! `TokenCleaner` runs in a background thread and periodically drops
//! idempotency entries that fell outside the store's retention window.
//! Expired entries already read as absent, so the cleaner only reclaims
//! memory; correctness does not depend on it running.
//!
//! - Graceful shutdown via atomic flag
//! - Configurable check interval

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::InMemoryStore;

/// Background idempotency purge task
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use std::time::Duration;
/// use regionkv_storage::{InMemoryStore, TokenCleaner};
///
/// let store = Arc::new(InMemoryStore::with_token_retention(Duration::from_secs(3600)));
/// let cleaner = TokenCleaner::new(Arc::clone(&store), Duration::from_secs(60));
/// let handle = cleaner.start();
///
/// // ... use the store ...
///
/// cleaner.shutdown();
/// handle.join().unwrap();
/// ```
pub struct TokenCleaner {
    store: Arc<InMemoryStore>,
    check_interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl TokenCleaner {
    /// Create a cleaner for `store` that runs every `check_interval`
    pub fn new(store: Arc<InMemoryStore>, check_interval: Duration) -> Self {
        Self {
            store,
            check_interval,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the background task
    ///
    /// The thread runs until `shutdown()` is called.
    pub fn start(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let shutdown = Arc::clone(&self.shutdown);
        let check_interval = self.check_interval;

        thread::spawn(move || {
            while !shutdown.load(Ordering::Relaxed) {
                // Sleep in short slices so shutdown is noticed promptly
                let sleep_interval = Duration::from_millis(100).min(check_interval);
                let mut elapsed = Duration::ZERO;

                while elapsed < check_interval {
                    if shutdown.load(Ordering::Relaxed) {
                        return;
                    }
                    thread::sleep(sleep_interval);
                    elapsed += sleep_interval;
                }

                let purged = store.purge_expired_tokens();
                if purged > 0 {
                    debug!(target: "regionkv::cleaner", purged, "Purged expired idempotency entries");
                }
            }
        })
    }

    /// Signal shutdown
    ///
    /// The background thread exits on its next check.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Check if shutdown has been signaled
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regionkv_core::{IdempotencyEntry, ManualClock, Timestamp, VersionedStore};

    #[test]
    fn test_cleaner_shutdown_flag() {
        let store = Arc::new(InMemoryStore::new());
        let cleaner = TokenCleaner::new(Arc::clone(&store), Duration::from_secs(60));
        assert!(!cleaner.is_shutdown());
        cleaner.shutdown();
        assert!(cleaner.is_shutdown());
    }

    #[test]
    fn test_cleaner_purges_expired_tokens() {
        let clock = Arc::new(ManualClock::at_millis(0));
        let store = Arc::new(
            InMemoryStore::with_token_retention(Duration::from_millis(50))
                .with_clock(clock.clone()),
        );
        store
            .put_idempotent(IdempotencyEntry::new("old", "k1", Timestamp::EPOCH))
            .unwrap();
        store
            .put_idempotent(IdempotencyEntry::new("new", "k2", Timestamp::from_secs(10)))
            .unwrap();

        clock.set(Timestamp::from_secs(5));

        let cleaner = TokenCleaner::new(Arc::clone(&store), Duration::from_millis(20));
        let handle = cleaner.start();
        thread::sleep(Duration::from_millis(300));
        cleaner.shutdown();
        handle.join().unwrap();

        assert!(store.idempotency_entry("old").is_none());
        assert!(store.idempotency_entry("new").is_some());
    }

    #[test]
    fn test_cleaner_graceful_shutdown() {
        let store = Arc::new(InMemoryStore::new());
        let cleaner = TokenCleaner::new(Arc::clone(&store), Duration::from_secs(10));
        let handle = cleaner.start();

        cleaner.shutdown();

        let start = std::time::Instant::now();
        handle.join().unwrap();
        assert!(start.elapsed() < Duration::from_secs(1), "Should shutdown quickly");
    }
}
