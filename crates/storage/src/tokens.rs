//! Idempotency token index
//!
//! Maps token → `IdempotencyEntry`. Entries are written once and never
//! mutated. With a retention window configured, entries older than the
//! window read as absent and are dropped by `purge_expired`; without one
//! they live forever.
//!
//! The index also provides `register_with`, which holds the token's slot
//! locked while the caller performs the record write. That is what makes
//! "write + record token" a single step in `InMemoryStore`.

use std::hash::BuildHasherDefault;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use regionkv_core::{Error, IdempotencyEntry, Result, Timestamp};
use rustc_hash::FxHasher;

type FxDashMap<K, V> = DashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Token → entry index with optional retention
#[derive(Debug)]
pub struct TokenIndex {
    entries: FxDashMap<String, IdempotencyEntry>,
    retention: Option<Duration>,
}

impl TokenIndex {
    /// Index whose entries never expire
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(Default::default()),
            retention: None,
        }
    }

    /// Index whose entries expire `retention` after being recorded
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            entries: DashMap::with_hasher(Default::default()),
            retention: Some(retention),
        }
    }

    /// Configured retention window
    pub fn retention(&self) -> Option<Duration> {
        self.retention
    }

    fn is_live(&self, entry: &IdempotencyEntry, now: Timestamp) -> bool {
        match self.retention {
            None => true,
            // An entry stamped in the future (clock skew) counts as fresh
            Some(retention) => now
                .duration_since(entry.recorded_at)
                .map_or(true, |age| age < retention),
        }
    }

    /// Whether `token` is recorded and still within retention
    pub fn contains(&self, token: &str, now: Timestamp) -> bool {
        if token.is_empty() {
            return false;
        }
        self.entries
            .get(token)
            .map_or(false, |entry| self.is_live(&entry, now))
    }

    /// Entry recorded for `token`, expired or not
    pub fn get(&self, token: &str) -> Option<IdempotencyEntry> {
        self.entries.get(token).map(|entry| entry.value().clone())
    }

    /// Record an entry unconditionally; empty tokens are ignored
    pub fn record(&self, entry: IdempotencyEntry) {
        if entry.token.is_empty() {
            return;
        }
        self.entries.insert(entry.token.clone(), entry);
    }

    /// Register `token` together with the write performed by `write`
    ///
    /// The token's slot stays locked while `write` runs, so two concurrent
    /// registrations of the same token cannot both reach `write`. `write`
    /// returns its output plus the entry to record; if it fails nothing is
    /// recorded.
    ///
    /// `write` must not touch this index.
    ///
    /// # Errors
    ///
    /// - `Error::DuplicateToken` if a live entry exists for `token`.
    /// - Whatever `write` returns.
    pub fn register_with<T, F>(&self, token: &str, now: Timestamp, write: F) -> Result<T>
    where
        F: FnOnce() -> Result<(T, IdempotencyEntry)>,
    {
        if token.is_empty() {
            return Err(Error::invalid_input("idempotency token must not be empty"));
        }
        match self.entries.entry(token.to_string()) {
            Entry::Occupied(mut occupied) => {
                if self.is_live(occupied.get(), now) {
                    return Err(Error::DuplicateToken(token.to_string()));
                }
                let (output, entry) = write()?;
                occupied.insert(entry);
                Ok(output)
            }
            Entry::Vacant(vacant) => {
                let (output, entry) = write()?;
                vacant.insert(entry);
                Ok(output)
            }
        }
    }

    /// Drop every entry outside the retention window
    ///
    /// Returns the number of entries removed. A no-op without retention.
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        if self.retention.is_none() {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|_, entry| self.is_live(entry, now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TokenIndex {
    fn default() -> Self {
        Self::new()
    }
}
