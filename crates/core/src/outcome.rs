//! Outcomes returned to callers of the event processor
//!
//! Serialized with a `status` tag so the shape matches what a transport layer
//! would put on the wire:
//!
//! ```json
//! {"status": "success", "record": {...}}
//! {"status": "resolved", "resolution": "existing_data_kept", ...}
//! ```

use serde::{Deserialize, Serialize};

use crate::contract::Version;
use crate::types::{Record, RegionId};

/// Message attached to every last-write-wins resolution
pub const LWW_MESSAGE: &str = "Conflict resolved using last-write-wins";

/// Which side of a conflict was deemed canonical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    /// The incoming event's data wins
    NewDataApplied,
    /// The persisted record is kept as-is
    ExistingDataKept,
}

impl ResolutionKind {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionKind::NewDataApplied => "new_data_applied",
            ResolutionKind::ExistingDataKept => "existing_data_kept",
        }
    }
}

impl std::fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision produced by the conflict resolver
///
/// A decision only: producing it never writes to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Winning side
    pub resolution: ResolutionKind,
    /// Human-readable explanation
    pub message: String,
    /// Contested key
    pub key: String,
    /// Version of the persisted record
    pub existing_version: Version,
    /// Version computed for the incoming event at resolution time
    pub incoming_version: Version,
    /// Region that produced the persisted record
    pub existing_origin: RegionId,
    /// Region that submitted the incoming event
    pub incoming_region: RegionId,
}

impl Resolution {
    /// True when the incoming event's data was deemed to win
    pub fn incoming_wins(&self) -> bool {
        self.resolution == ResolutionKind::NewDataApplied
    }
}

/// Tagged result of processing one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingResult {
    /// Token already seen; nothing was written
    Duplicate {
        /// The repeated token
        token: String,
    },
    /// Write applied
    Success {
        /// Record as persisted
        record: Record,
    },
    /// Conditional write rejected; the resolver decided a winner
    Resolved(Resolution),
    /// Unexpected failure
    Error {
        /// Description of the failure
        cause: String,
    },
}

impl ProcessingResult {
    /// Status tag as it appears on the wire
    pub fn status(&self) -> &'static str {
        match self {
            ProcessingResult::Duplicate { .. } => "duplicate",
            ProcessingResult::Success { .. } => "success",
            ProcessingResult::Resolved(_) => "resolved",
            ProcessingResult::Error { .. } => "error",
        }
    }

    /// True for `Success`
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingResult::Success { .. })
    }

    /// True for `Duplicate`
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ProcessingResult::Duplicate { .. })
    }

    /// Persisted record, if the write was applied
    pub fn record(&self) -> Option<&Record> {
        match self {
            ProcessingResult::Success { record } => Some(record),
            _ => None,
        }
    }

    /// Resolution, if a conflict occurred
    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            ProcessingResult::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }
}
