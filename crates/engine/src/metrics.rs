//! Event processing counters
//!
//! Every counter uses Relaxed ordering: the counters are observational only
//! and never synchronize other memory. A snapshot taken while events are in
//! flight may be off by the in-flight calls.

use std::sync::atomic::{AtomicU64, Ordering};

use regionkv_core::ProcessingResult;

/// Per-processor outcome counters
#[derive(Debug, Default)]
pub struct ProcessorStats {
    total_processed: AtomicU64,
    total_succeeded: AtomicU64,
    total_duplicates: AtomicU64,
    total_resolved: AtomicU64,
    total_errors: AtomicU64,
}

impl ProcessorStats {
    /// Zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished `process_event` or `reconcile` call by its outcome
    pub fn record(&self, result: &ProcessingResult) {
        self.total_processed.fetch_add(1, Ordering::Relaxed);
        let counter = match result {
            ProcessingResult::Success { .. } => &self.total_succeeded,
            ProcessingResult::Duplicate { .. } => &self.total_duplicates,
            ProcessingResult::Resolved(_) => &self.total_resolved,
            ProcessingResult::Error { .. } => &self.total_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> ProcessorMetrics {
        ProcessorMetrics {
            total_processed: self.total_processed.load(Ordering::Relaxed),
            total_succeeded: self.total_succeeded.load(Ordering::Relaxed),
            total_duplicates: self.total_duplicates.load(Ordering::Relaxed),
            total_resolved: self.total_resolved.load(Ordering::Relaxed),
            total_errors: self.total_errors.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of processor counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessorMetrics {
    /// Calls to `process_event` and `reconcile`
    pub total_processed: u64,
    /// Writes applied
    pub total_succeeded: u64,
    /// Submissions suppressed by their idempotency token
    pub total_duplicates: u64,
    /// Conditional writes rejected and resolved
    pub total_resolved: u64,
    /// Failures reported as `error`
    pub total_errors: u64,
}

impl ProcessorMetrics {
    /// Fraction of counted calls that ended in a conflict
    pub fn conflict_rate(&self) -> f64 {
        if self.total_processed == 0 {
            0.0
        } else {
            self.total_resolved as f64 / self.total_processed as f64
        }
    }
}
