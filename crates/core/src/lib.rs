//! Core types and traits for regionkv
//!
//! This crate defines the foundational types used by every other crate:
//! - Record / Event / IdempotencyEntry: the data model
//! - Version / Timestamp: contract types stamped on every accepted write
//! - Clock: injectable time and version sources
//! - VersionedStore: the storage contract backends implement
//! - ProcessingResult / Resolution: outcomes handed back to callers
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod contract;
pub mod error;
pub mod outcome;
pub mod traits;
pub mod types;

pub use clock::{Clock, LogicalClock, ManualClock, MonotonicClock, SystemClock};
pub use contract::{Timestamp, Version};
pub use error::{Error, Result};
pub use outcome::{ProcessingResult, Resolution, ResolutionKind, LWW_MESSAGE};
pub use traits::VersionedStore;
pub use types::{ConditionalUpdate, Event, IdempotencyEntry, Payload, Record, RegionId};
