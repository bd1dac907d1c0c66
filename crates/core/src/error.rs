//! Error types for regionkv
//!
//! This module defines the error taxonomy shared by the store contract and the
//! event processor. We use `thiserror` for automatic `Display` and `Error`
//! trait implementations.
//!
//! ## Taxonomy
//!
//! - `VersionConflict`: expected and recoverable. The processor routes it into
//!   conflict resolution and never hands it to the caller raw.
//! - `DuplicateToken`: an idempotency token was already registered when the
//!   store tried to record it atomically with a write.
//! - `StoreUnavailable` / `StoreFailure`: any other store-layer failure,
//!   reported verbatim and never retried by the processor.
//!
//! A duplicate submission is an outcome, not an error, so it has no variant
//! here beyond the store-level `DuplicateToken` signal.

use std::io;
use thiserror::Error;

use crate::contract::Version;

/// Result type alias for regionkv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for regionkv
#[derive(Debug, Error)]
pub enum Error {
    /// Conditional update rejected: the stored version is not lower than the
    /// proposed one
    #[error("Version conflict on key '{key}': current {current}, proposed {proposed}")]
    VersionConflict {
        /// Key the update targeted
        key: String,
        /// Version currently persisted
        current: Version,
        /// Version the rejected update carried
        proposed: Version,
    },

    /// Idempotency token already registered
    #[error("Duplicate idempotency token: {0}")]
    DuplicateToken(String),

    /// Store could not be reached or refused service
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other store-layer failure
    #[error("Store failure: {0}")]
    StoreFailure(String),

    /// Caller supplied an unusable request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error (config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Build an `InvalidInput` error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Build a `StoreFailure` error
    pub fn store_failure(msg: impl Into<String>) -> Self {
        Error::StoreFailure(msg.into())
    }

    /// Build a `Config` error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// True for the optimistic-concurrency rejection
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Error::VersionConflict { .. })
    }

    /// True when a caller may reasonably retry the same request later
    ///
    /// Version conflicts are not retryable: the same candidate version would be
    /// rejected again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
