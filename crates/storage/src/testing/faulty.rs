//! Fault-injecting store wrapper

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use regionkv_core::{ConditionalUpdate, Error, IdempotencyEntry, Record, Result, VersionedStore};

/// Store operation that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// `get`
    Get,
    /// `put_idempotent`
    PutIdempotent,
    /// `has_token`
    HasToken,
    /// `conditional_update`
    ConditionalUpdate,
}

impl std::fmt::Display for StoreOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoreOp::Get => "get",
            StoreOp::PutIdempotent => "put_idempotent",
            StoreOp::HasToken => "has_token",
            StoreOp::ConditionalUpdate => "conditional_update",
        };
        f.write_str(name)
    }
}

/// Wraps a store and fails chosen operations on demand
///
/// Failing operations return `Error::StoreUnavailable` without reaching the
/// inner store. The atomic `conditional_update_with_token` fails as a whole
/// if either of its halves is set to fail.
pub struct FaultyStore<S> {
    inner: S,
    failing: Mutex<HashSet<StoreOp>>,
    injected: AtomicU64,
}

impl<S: VersionedStore> FaultyStore<S> {
    /// Wrap `inner` with no faults armed
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            injected: AtomicU64::new(0),
        }
    }

    /// Make `op` fail until healed
    pub fn fail(&self, op: StoreOp) {
        self.failing.lock().insert(op);
    }

    /// Stop failing `op`
    pub fn heal(&self, op: StoreOp) {
        self.failing.lock().remove(&op);
    }

    /// Stop failing everything
    pub fn heal_all(&self) {
        self.failing.lock().clear();
    }

    /// Number of failures injected so far
    pub fn injected_failures(&self) -> u64 {
        self.injected.load(Ordering::Relaxed)
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check(&self, op: StoreOp) -> Result<()> {
        if self.failing.lock().contains(&op) {
            self.injected.fetch_add(1, Ordering::Relaxed);
            return Err(Error::StoreUnavailable(format!("injected failure: {op}")));
        }
        Ok(())
    }
}

impl<S: VersionedStore> VersionedStore for FaultyStore<S> {
    fn get(&self, key: &str) -> Result<Option<Record>> {
        self.check(StoreOp::Get)?;
        self.inner.get(key)
    }

    fn put_idempotent(&self, entry: IdempotencyEntry) -> Result<()> {
        self.check(StoreOp::PutIdempotent)?;
        self.inner.put_idempotent(entry)
    }

    fn has_token(&self, token: &str) -> Result<bool> {
        self.check(StoreOp::HasToken)?;
        self.inner.has_token(token)
    }

    fn conditional_update(&self, update: ConditionalUpdate) -> Result<Record> {
        self.check(StoreOp::ConditionalUpdate)?;
        self.inner.conditional_update(update)
    }

    fn conditional_update_with_token(
        &self,
        update: ConditionalUpdate,
        token: &str,
    ) -> Result<Record> {
        self.check(StoreOp::ConditionalUpdate)?;
        self.check(StoreOp::PutIdempotent)?;
        self.inner.conditional_update_with_token(update, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use regionkv_core::{RegionId, Timestamp, Version};
    use serde_json::json;

    fn update(version: u64) -> ConditionalUpdate {
        ConditionalUpdate {
            key: "k1".to_string(),
            payload: json!(version),
            version: Version::new(version),
            region: RegionId::new("r1").unwrap(),
            timestamp: Timestamp::from_millis(version),
        }
    }

    #[test]
    fn test_armed_fault_fails_without_touching_inner() {
        let store = FaultyStore::new(InMemoryStore::new());
        store.fail(StoreOp::ConditionalUpdate);

        let err = store.conditional_update(update(1)).unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
        assert!(store.inner().is_empty());
        assert_eq!(store.injected_failures(), 1);

        store.heal(StoreOp::ConditionalUpdate);
        assert!(store.conditional_update(update(1)).is_ok());
    }

    #[test]
    fn test_atomic_path_fails_when_token_half_is_armed() {
        let store = FaultyStore::new(InMemoryStore::new());
        store.fail(StoreOp::PutIdempotent);

        assert!(store.conditional_update_with_token(update(1), "t1").is_err());
        assert!(store.inner().is_empty());
        assert!(!store.inner().has_token("t1").unwrap());

        store.heal_all();
        assert!(store.conditional_update_with_token(update(1), "t1").is_ok());
    }
}
