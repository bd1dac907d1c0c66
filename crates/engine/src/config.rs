//! Processor configuration via `regionkv.toml`
//!
//! One file per region deployment. The region is required; everything else
//! has a default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use regionkv_core::{Clock, Error, LogicalClock, MonotonicClock, RegionId, Result, SystemClock};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "regionkv.toml";

/// Which version source a processor uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockKind {
    /// Raw wall-clock milliseconds; same-millisecond writes share a version
    System,
    /// Wall-clock milliseconds bumped to be strictly increasing
    #[default]
    Monotonic,
    /// Lamport counter, independent of wall time
    Logical,
}

/// How a successful write and its idempotency token are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRecording {
    /// Write and token recorded in one store operation
    #[default]
    Atomic,
    /// Token recorded after the write; a failure there is logged and the
    /// write stands. Concurrent submissions of one token may both be applied.
    BestEffort,
}

/// Event processor configuration loaded from `regionkv.toml`
///
/// # Example
///
/// ```toml
/// region = "us-east-1"
/// clock = "monotonic"
/// token_recording = "atomic"
/// # token_retention_secs = 86400
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Region this processor is bound to
    pub region: String,
    /// Version source
    #[serde(default)]
    pub clock: ClockKind,
    /// Token persistence mode
    #[serde(default)]
    pub token_recording: TokenRecording,
    /// Idempotency retention in seconds; absent means entries never expire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_retention_secs: Option<u64>,
}

impl ProcessorConfig {
    /// Defaults for `region`
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            clock: ClockKind::default(),
            token_recording: TokenRecording::default(),
            token_retention_secs: None,
        }
    }

    /// Region as a validated identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the region is empty.
    pub fn region_id(&self) -> Result<RegionId> {
        RegionId::new(self.region.as_str())
            .map_err(|_| Error::config("'region' must be a non-empty string"))
    }

    /// Retention window for idempotency entries
    pub fn token_retention(&self) -> Option<Duration> {
        self.token_retention_secs.map(Duration::from_secs)
    }

    /// Check values serde cannot
    ///
    /// # Errors
    ///
    /// Returns an error for an empty region or a zero retention window.
    pub fn validate(&self) -> Result<()> {
        self.region_id()?;
        if self.token_retention_secs == Some(0) {
            return Err(Error::config(
                "'token_retention_secs' must be positive; omit it to never expire",
            ));
        }
        Ok(())
    }

    /// Instantiate the configured clock
    pub fn build_clock(&self) -> Arc<dyn Clock> {
        match self.clock {
            ClockKind::System => Arc::new(SystemClock),
            ClockKind::Monotonic => Arc::new(MonotonicClock::new()),
            ClockKind::Logical => Arc::new(LogicalClock::new()),
        }
    }

    /// Default config file content with comments
    pub fn default_toml() -> &'static str {
        r#"# regionkv processor configuration
#
# Region this processor is bound to (required)
region = "us-east-1"

# Version source: "system", "monotonic" (default) or "logical"
#   "system"    = raw wall-clock milliseconds
#   "monotonic" = wall-clock milliseconds, strictly increasing per processor
#   "logical"   = Lamport counter
clock = "monotonic"

# Token persistence: "atomic" (default) or "best_effort"
#   "atomic"      = write and idempotency token recorded together
#   "best_effort" = token recorded after the write; failures are logged
token_recording = "atomic"

# Idempotency retention in seconds. Omit to keep tokens forever.
# Applies to the store, not the processor: build it with
# InMemoryStore::from_token_retention(config.token_retention()).
# token_retention_secs = 86400
"#
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ProcessorConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to `path`
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
