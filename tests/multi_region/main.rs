//! Multi-Region Write Path Test Suite
//!
//! Exercises the public `regionkv` facade end to end: several region-bound
//! processors sharing one store, configured the way a deployment would be.
//!
//! ## Modules
//!
//! - `replicated_writes`: two regions writing the same records
//! - `deployment`: processors built from `regionkv.toml`, token retention
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test multi_region
//! cargo test --test multi_region deployment::
//! ```

use std::sync::Arc;

use regionkv::{EventProcessor, InMemoryStore, RegionId};

mod deployment;
mod replicated_writes;

/// One store, one processor per region
fn two_regions() -> (
    Arc<InMemoryStore>,
    EventProcessor<InMemoryStore>,
    EventProcessor<InMemoryStore>,
) {
    let store = Arc::new(InMemoryStore::new());
    let east = EventProcessor::new(Arc::clone(&store), RegionId::new("us-east-1").unwrap());
    let west = EventProcessor::new(Arc::clone(&store), RegionId::new("eu-west-1").unwrap());
    (store, east, west)
}
