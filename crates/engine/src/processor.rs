//! Event processor: the write path of one region
//!
//! ## Flow
//!
//! 1. Reject events with an empty key.
//! 2. Non-empty token already recorded → `duplicate`, nothing written.
//! 3. Draw a candidate version from the clock and attempt a conditional
//!    update stamped with this processor's region.
//!    - accepted → record the token, return `success`
//!    - `VersionConflict` → read the current record, ask the resolver,
//!      return `resolved`. The write is not retried.
//!    - anything else → `error`, not retried
//!
//! The processor owns no domain state. Many processors, one per region,
//! share one store; the store's conditional update arbitrates between them.
//!
//! ## Token recording
//!
//! With `TokenRecording::Atomic` the write and the token go through
//! `conditional_update_with_token`, so two concurrent submissions of one
//! token cannot both be applied. With `TokenRecording::BestEffort` the token
//! is recorded after the write; if that fails the write stands and a retry
//! of the same request is processed again (it will typically conflict with
//! its own earlier write).

use std::sync::Arc;

use regionkv_core::{
    Clock, ConditionalUpdate, Error, Event, IdempotencyEntry, MonotonicClock, ProcessingResult,
    Record, RegionId, Resolution, Result, Version, VersionedStore,
};
use tracing::{debug, warn};

use crate::config::{ProcessorConfig, TokenRecording};
use crate::conflict::ConflictResolver;
use crate::metrics::{ProcessorMetrics, ProcessorStats};

/// Region-bound orchestrator of idempotency checks, conditional writes and
/// conflict resolution
///
/// # Example
///
/// ```ignore
/// use regionkv_engine::EventProcessor;
/// use regionkv_storage::InMemoryStore;
///
/// let store = Arc::new(InMemoryStore::new());
/// let east = EventProcessor::new(Arc::clone(&store), RegionId::new("us-east-1")?);
/// let west = EventProcessor::new(Arc::clone(&store), RegionId::new("eu-west-1")?);
///
/// let result = east.process_event(&Event::new("k1", json!({"n": 1})).with_token("t1"));
/// assert!(result.is_success());
/// ```
pub struct EventProcessor<S> {
    store: Arc<S>,
    region: RegionId,
    clock: Arc<dyn Clock>,
    resolver: ConflictResolver,
    token_recording: TokenRecording,
    stats: ProcessorStats,
}

impl<S: VersionedStore> EventProcessor<S> {
    /// Processor for `region` with a monotonic clock and atomic token recording
    pub fn new(store: Arc<S>, region: RegionId) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
        Self {
            store,
            region,
            resolver: ConflictResolver::new(Arc::clone(&clock)),
            clock,
            token_recording: TokenRecording::default(),
            stats: ProcessorStats::new(),
        }
    }

    /// Processor configured from a `ProcessorConfig`
    ///
    /// `token_retention_secs` is not applied here: retention belongs to the
    /// store. Build it with `InMemoryStore::from_token_retention(config.token_retention())`
    /// or the equivalent setting of another backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the config does not validate.
    pub fn from_config(store: Arc<S>, config: &ProcessorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(store, config.region_id()?)
            .with_clock(config.build_clock())
            .with_token_recording(config.token_recording))
    }

    /// Replace the clock used for candidate and resolution versions
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.resolver = ConflictResolver::new(Arc::clone(&clock));
        self.clock = clock;
        self
    }

    /// Choose how tokens are persisted
    pub fn with_token_recording(mut self, mode: TokenRecording) -> Self {
        self.token_recording = mode;
        self
    }

    /// Region this processor stamps on its writes
    pub fn region(&self) -> &RegionId {
        &self.region
    }

    /// Shared store handle
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Token persistence mode
    pub fn token_recording(&self) -> TokenRecording {
        self.token_recording
    }

    /// Outcome counters over `process_event` and `reconcile` calls
    pub fn metrics(&self) -> ProcessorMetrics {
        self.stats.snapshot()
    }

    /// Apply one event
    ///
    /// Never panics and never returns a raw store error: every failure is
    /// folded into `ProcessingResult::Error`.
    pub fn process_event(&self, event: &Event) -> ProcessingResult {
        let result = self.handle(event);
        self.stats.record(&result);
        result
    }

    /// Persist the winner of an earlier resolution
    ///
    /// Explicit follow-up to a `resolved` outcome; `process_event` never calls
    /// it. If the existing data was kept, the resolution is returned as-is.
    /// Otherwise the event is written with the resolution's incoming version,
    /// which can itself be rejected if the record moved on in the meantime.
    pub fn reconcile(&self, event: &Event, resolution: &Resolution) -> ProcessingResult {
        let result = self.handle_reconcile(event, resolution);
        self.stats.record(&result);
        result
    }

    fn handle(&self, event: &Event) -> ProcessingResult {
        if let Err(e) = event.validate() {
            return self.failed(event, e);
        }

        if let Some(token) = event.token() {
            match self.store.has_token(token) {
                Ok(true) => return self.duplicate(event, token),
                Ok(false) => {}
                Err(e) => return self.failed(event, e),
            }
        }

        self.write(event, self.clock.next_version())
    }

    fn handle_reconcile(&self, event: &Event, resolution: &Resolution) -> ProcessingResult {
        if let Err(e) = event.validate() {
            return self.failed(event, e);
        }
        if resolution.key != event.key {
            return self.failed(
                event,
                Error::invalid_input(format!(
                    "resolution for key '{}' does not match event key '{}'",
                    resolution.key, event.key
                )),
            );
        }
        if !resolution.incoming_wins() {
            return ProcessingResult::Resolved(resolution.clone());
        }
        self.write(event, resolution.incoming_version)
    }

    fn write(&self, event: &Event, version: Version) -> ProcessingResult {
        let update = ConditionalUpdate {
            key: event.key.clone(),
            payload: event.payload.clone(),
            version,
            region: self.region.clone(),
            timestamp: self.clock.now(),
        };

        let written = match (event.token(), self.token_recording) {
            (Some(token), TokenRecording::Atomic) => {
                self.store.conditional_update_with_token(update, token)
            }
            (token, _) => self.store.conditional_update(update).map(|record| {
                if let Some(token) = token {
                    self.record_token(token, &record);
                }
                record
            }),
        };

        match written {
            Ok(record) => {
                debug!(
                    target: "regionkv::processor",
                    key = %record.key,
                    region = %self.region,
                    version = %record.version,
                    "Event applied"
                );
                ProcessingResult::Success { record }
            }
            Err(Error::DuplicateToken(token)) => self.duplicate(event, &token),
            Err(e) if e.is_version_conflict() => self.resolve(event),
            Err(e) => self.failed(event, e),
        }
    }

    /// Best-effort token write; the record write is not rolled back
    fn record_token(&self, token: &str, record: &Record) {
        let entry = IdempotencyEntry::new(token, &record.key, record.updated_at);
        if let Err(e) = self.store.put_idempotent(entry) {
            warn!(
                target: "regionkv::processor",
                key = %record.key,
                region = %self.region,
                error = %e,
                "Write applied but idempotency token was not recorded"
            );
        }
    }

    fn resolve(&self, event: &Event) -> ProcessingResult {
        match self.store.get(&event.key) {
            Ok(Some(existing)) => ProcessingResult::Resolved(
                self.resolver
                    .resolve_conflict(&existing, event, &self.region),
            ),
            Ok(None) => self.failed(
                event,
                Error::store_failure(format!(
                    "record for key '{}' missing after version conflict",
                    event.key
                )),
            ),
            Err(e) => self.failed(event, e),
        }
    }

    fn duplicate(&self, event: &Event, token: &str) -> ProcessingResult {
        debug!(
            target: "regionkv::processor",
            key = %event.key,
            region = %self.region,
            token,
            "Duplicate event suppressed"
        );
        ProcessingResult::Duplicate {
            token: token.to_string(),
        }
    }

    fn failed(&self, event: &Event, error: Error) -> ProcessingResult {
        warn!(
            target: "regionkv::processor",
            key = %event.key,
            region = %self.region,
            error = %error,
            "Event processing failed"
        );
        ProcessingResult::Error {
            cause: error.to_string(),
        }
    }
}

impl<S> std::fmt::Debug for EventProcessor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventProcessor")
            .field("region", &self.region)
            .field("token_recording", &self.token_recording)
            .finish_non_exhaustive()
    }
}
