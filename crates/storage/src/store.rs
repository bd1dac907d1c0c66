//! In-memory reference implementation of `VersionedStore`
//!
//! # Design
//!
//! - Records live in a DashMap keyed by record key. `conditional_update`
//!   goes through the entry API, so the version check and the write happen
//!   under the key's shard lock.
//! - Idempotency entries live in a separate `TokenIndex`.
//! - `conditional_update_with_token` locks the token slot first and the
//!   record slot second. Nothing locks them in the opposite order.
//!
//! There is no distribution here, but the atomicity and version
//! monotonicity match what a replicated backend must provide.

use std::hash::BuildHasherDefault;
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use regionkv_core::{
    Clock, ConditionalUpdate, Error, IdempotencyEntry, Record, Result, SystemClock,
    VersionedStore,
};
use rustc_hash::FxHasher;
use tracing::debug;

use crate::tokens::TokenIndex;

/// In-memory versioned store
///
/// # Example
///
/// ```ignore
/// use regionkv_storage::InMemoryStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(InMemoryStore::new());
/// assert!(store.get("missing")?.is_none());
/// ```
pub struct InMemoryStore {
    records: DashMap<String, Record, BuildHasherDefault<FxHasher>>,
    tokens: TokenIndex,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// Empty store; idempotency entries never expire
    pub fn new() -> Self {
        Self::with_tokens(TokenIndex::new())
    }

    /// Empty store whose idempotency entries expire after `retention`
    pub fn with_token_retention(retention: Duration) -> Self {
        Self::with_tokens(TokenIndex::with_retention(retention))
    }

    /// Empty store with the given idempotency retention, if any
    ///
    /// Takes the value of `ProcessorConfig::token_retention` directly.
    pub fn from_token_retention(retention: Option<Duration>) -> Self {
        match retention {
            Some(retention) => Self::with_token_retention(retention),
            None => Self::new(),
        }
    }

    fn with_tokens(tokens: TokenIndex) -> Self {
        Self {
            records: DashMap::with_hasher(Default::default()),
            tokens,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` to judge token expiry
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Overwrite the record for its key, bypassing the version check
    ///
    /// Administrative hook: it can move a version backwards, which no
    /// conditional update ever does.
    pub fn put(&self, record: Record) {
        debug!(target: "regionkv::store", key = %record.key, version = %record.version, "Unconditional put");
        self.records.insert(record.key.clone(), record);
    }

    /// Idempotency entry for `token`, if one was recorded
    pub fn idempotency_entry(&self, token: &str) -> Option<IdempotencyEntry> {
        self.tokens.get(token)
    }

    /// Drop idempotency entries outside the retention window
    ///
    /// Returns the number removed.
    pub fn purge_expired_tokens(&self) -> usize {
        self.tokens.purge_expired(self.clock.now())
    }

    /// Configured idempotency retention
    pub fn token_retention(&self) -> Option<Duration> {
        self.tokens.retention()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of idempotency entries, expired ones included
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn apply(&self, update: ConditionalUpdate) -> Result<Record> {
        match self.records.entry(update.key.clone()) {
            Entry::Occupied(mut occupied) => {
                let current = occupied.get().version;
                if current >= update.version {
                    debug!(
                        target: "regionkv::store",
                        key = %update.key,
                        current = %current,
                        proposed = %update.version,
                        "Conditional update rejected"
                    );
                    return Err(Error::VersionConflict {
                        key: update.key,
                        current,
                        proposed: update.version,
                    });
                }
                let record = update.into_record();
                occupied.insert(record.clone());
                Ok(record)
            }
            Entry::Vacant(vacant) => {
                let record = update.into_record();
                vacant.insert(record.clone());
                Ok(record)
            }
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("records", &self.records.len())
            .field("tokens", &self.tokens.len())
            .field("retention", &self.tokens.retention())
            .finish()
    }
}

impl VersionedStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<Record>> {
        Ok(self.records.get(key).map(|record| record.value().clone()))
    }

    fn put_idempotent(&self, entry: IdempotencyEntry) -> Result<()> {
        self.tokens.record(entry);
        Ok(())
    }

    fn has_token(&self, token: &str) -> Result<bool> {
        Ok(self.tokens.contains(token, self.clock.now()))
    }

    fn conditional_update(&self, update: ConditionalUpdate) -> Result<Record> {
        self.apply(update)
    }

    fn conditional_update_with_token(
        &self,
        update: ConditionalUpdate,
        token: &str,
    ) -> Result<Record> {
        if token.is_empty() {
            return self.apply(update);
        }
        self.tokens.register_with(token, self.clock.now(), || {
            let record = self.apply(update)?;
            let entry = IdempotencyEntry::new(token, &record.key, record.updated_at);
            Ok((record, entry))
        })
    }
}
