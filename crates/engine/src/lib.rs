//! Event processing engine for regionkv
//!
//! This crate orchestrates the write path on top of a `VersionedStore`:
//! - EventProcessor: idempotency check, conditional write, conflict routing
//! - ConflictResolver: last-write-wins decision between competing versions
//! - ProcessorConfig: `regionkv.toml` loading and validation
//! - ProcessorStats: outcome counters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod conflict;
pub mod metrics;
pub mod processor;

pub use config::{ClockKind, ProcessorConfig, TokenRecording, CONFIG_FILE_NAME};
pub use conflict::ConflictResolver;
pub use metrics::{ProcessorMetrics, ProcessorStats};
pub use processor::EventProcessor;
