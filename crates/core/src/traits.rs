//! The versioned store contract
//!
//! Any backend (single-node, replicated, in-memory) plugs into the event
//! processor by implementing `VersionedStore`. Cross-region replication is
//! the backend's concern; the processor only relies on the atomicity of
//! `conditional_update`.

use tracing::warn;

use crate::error::{Error, Result};
use crate::types::{ConditionalUpdate, IdempotencyEntry, Record};

/// Key-value store with version-gated writes and an idempotency token index
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads and from processors bound to different regions.
pub trait VersionedStore: Send + Sync {
    /// Current record for `key`
    ///
    /// A missing key is `Ok(None)`, never an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<Record>>;

    /// Unconditionally record that a token was used
    ///
    /// Overwrites any previous entry for the same token. Entries with an
    /// empty token are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be persisted.
    fn put_idempotent(&self, entry: IdempotencyEntry) -> Result<()>;

    /// Whether a token has been recorded
    ///
    /// Always `false` for the empty token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token index cannot be read.
    fn has_token(&self, token: &str) -> Result<bool>;

    /// Persist `update` iff no record exists for its key or the stored
    /// version is strictly lower than `update.version`
    ///
    /// The check and the write are one indivisible step with respect to
    /// concurrent callers on the same key.
    ///
    /// # Errors
    ///
    /// - `Error::VersionConflict` when the precondition fails; nothing is
    ///   written.
    /// - Any other error if the store fails.
    fn conditional_update(&self, update: ConditionalUpdate) -> Result<Record>;

    /// Conditional update and token registration as one step
    ///
    /// Either the record is written and the token recorded, or neither
    /// happens. The default implementation cannot offer that: it checks,
    /// writes, then records, leaving the same window between concurrent
    /// submissions of one token as separate calls would. Backends that can
    /// lock the token and the record together should override it.
    ///
    /// In the default implementation a failure to record the token after
    /// the write was applied is logged and the record is still returned.
    /// The write is not rolled back.
    ///
    /// # Errors
    ///
    /// - `Error::DuplicateToken` if the token is already recorded.
    /// - `Error::VersionConflict` as for `conditional_update`.
    /// - Any other error if the store fails.
    fn conditional_update_with_token(
        &self,
        update: ConditionalUpdate,
        token: &str,
    ) -> Result<Record> {
        if self.has_token(token)? {
            return Err(Error::DuplicateToken(token.to_string()));
        }
        let record = self.conditional_update(update)?;
        if let Err(e) =
            self.put_idempotent(IdempotencyEntry::new(token, &record.key, record.updated_at))
        {
            warn!(
                target: "regionkv::store",
                key = %record.key,
                version = %record.version,
                error = %e,
                "Write applied but idempotency token was not recorded"
            );
        }
        Ok(record)
    }
}

impl<S: VersionedStore + ?Sized> VersionedStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Record>> {
        (**self).get(key)
    }

    fn put_idempotent(&self, entry: IdempotencyEntry) -> Result<()> {
        (**self).put_idempotent(entry)
    }

    fn has_token(&self, token: &str) -> Result<bool> {
        (**self).has_token(token)
    }

    fn conditional_update(&self, update: ConditionalUpdate) -> Result<Record> {
        (**self).conditional_update(update)
    }

    fn conditional_update_with_token(
        &self,
        update: ConditionalUpdate,
        token: &str,
    ) -> Result<Record> {
        (**self).conditional_update_with_token(update, token)
    }
}
