//! regionkv - write path of a multi-region, eventually-consistent key-value store
//!
//! Events addressed to a key are applied with version-gated conditional
//! writes, deduplicated by idempotency token, and concurrent writes from
//! different regions are arbitrated by last-write-wins.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use regionkv::{Event, EventProcessor, InMemoryStore, RegionId};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let east = EventProcessor::new(Arc::clone(&store), RegionId::new("us-east-1")?);
//!
//! let result = east.process_event(&Event::new("k1", json!({"n": 1})).with_token("t1"));
//! assert!(result.is_success());
//! ```
//!
//! # Architecture
//!
//! - `regionkv-core`: data model, errors, clocks, the `VersionedStore` contract
//! - `regionkv-storage`: the in-memory reference store
//! - `regionkv-engine`: event processor, conflict resolver, configuration

pub use regionkv_core::*;
pub use regionkv_engine::*;
pub use regionkv_storage::{testing, InMemoryStore, TokenCleaner, TokenIndex};
