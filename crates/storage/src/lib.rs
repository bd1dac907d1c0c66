//! Storage layer for regionkv
//!
//! This crate implements the reference `VersionedStore` backend:
//! - InMemoryStore: DashMap-backed records with per-key atomic check-and-set
//! - TokenIndex: idempotency entries with optional retention
//! - TokenCleaner: background purge of expired idempotency entries
//! - testing::FaultyStore: failure injection for error-path tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cleaner;
pub mod store;
pub mod testing;
pub mod tokens;

pub use cleaner::TokenCleaner;
pub use store::InMemoryStore;
pub use tokens::TokenIndex;
