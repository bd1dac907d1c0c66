//! Testing utilities for exercising store failure paths
//!
//! - **FaultyStore**: wraps any `VersionedStore` and fails selected
//!   operations with `StoreUnavailable`
//!
//! # Example
//!
//! ```ignore
//! use regionkv_storage::testing::{FaultyStore, StoreOp};
//! use regionkv_storage::InMemoryStore;
//!
//! let store = FaultyStore::new(InMemoryStore::new());
//! store.fail(StoreOp::ConditionalUpdate);
//! ```

mod faulty;

pub use faulty::{FaultyStore, StoreOp};
