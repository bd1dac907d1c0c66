//! Data model: records, events, idempotency entries
//!
//! - `RegionId`: identifier of the region a processor runs in
//! - `Record`: the single persisted state of a key
//! - `Event`: a transient client mutation request
//! - `IdempotencyEntry`: token to key association, written once
//! - `ConditionalUpdate`: the arguments of a version-gated write

use serde::{Deserialize, Serialize};

use crate::contract::{Timestamp, Version};
use crate::error::{Error, Result};

/// Opaque structured payload carried by events and records
pub type Payload = serde_json::Value;

/// Region identifier
///
/// Always non-empty. Processors are bound to exactly one region; records
/// remember the region that produced their current version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionId(String);

impl RegionId {
    /// Create a region identifier, rejecting empty or blank names
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_input("region identifier must not be empty"));
        }
        Ok(RegionId(name))
    }

    /// Region name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RegionId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        RegionId::new(value)
    }
}

impl TryFrom<&str> for RegionId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        RegionId::new(value)
    }
}

impl From<RegionId> for String {
    fn from(region: RegionId) -> Self {
        region.0
    }
}

/// Persisted state of a key
///
/// At most one `Record` exists per key. Its version only increases through
/// conditional updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique key
    pub key: String,
    /// Opaque payload of the last accepted write
    pub payload: Payload,
    /// Version of the last accepted write
    pub version: Version,
    /// Region that produced the current version
    pub origin: RegionId,
    /// Time of the last accepted write
    pub updated_at: Timestamp,
}

/// Client-submitted mutation request
///
/// The originating region is not part of the event: it is the region of the
/// processor that handles it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Target key
    pub key: String,
    /// Payload to store
    pub payload: Payload,
    /// Deduplication token; `None` disables deduplication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_token: Option<String>,
}

impl Event {
    /// Event without an idempotency token
    pub fn new(key: impl Into<String>, payload: Payload) -> Self {
        Self {
            key: key.into(),
            payload,
            idempotency_token: None,
        }
    }

    /// Attach an idempotency token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.idempotency_token = Some(token.into());
        self
    }

    /// The token, if present and non-empty
    ///
    /// Empty tokens never deduplicate.
    pub fn token(&self) -> Option<&str> {
        self.idempotency_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }

    /// Reject events that cannot be addressed to a record
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(Error::invalid_input("event key must not be empty"));
        }
        Ok(())
    }
}

/// Token to key association recorded after a successful write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyEntry {
    /// Idempotency token
    pub token: String,
    /// Key of the event the token was seen with
    pub key: String,
    /// When the token was recorded
    pub recorded_at: Timestamp,
}

impl IdempotencyEntry {
    /// Create an entry
    pub fn new(token: impl Into<String>, key: impl Into<String>, recorded_at: Timestamp) -> Self {
        Self {
            token: token.into(),
            key: key.into(),
            recorded_at,
        }
    }
}

/// Arguments of a version-gated write
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalUpdate {
    /// Target key
    pub key: String,
    /// Payload to persist
    pub payload: Payload,
    /// Proposed version; must exceed the stored one
    pub version: Version,
    /// Region stamped as origin
    pub region: RegionId,
    /// Write time
    pub timestamp: Timestamp,
}

impl ConditionalUpdate {
    /// The record this update persists when it is accepted
    pub fn into_record(self) -> Record {
        Record {
            key: self.key,
            payload: self.payload,
            version: self.version,
            origin: self.region,
            updated_at: self.timestamp,
        }
    }
}
