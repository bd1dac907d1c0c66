//! Last-write-wins conflict resolution
//!
//! Invoked after a conditional write was rejected. The incoming event's
//! version is drawn fresh from the clock at resolution time, so it is not
//! necessarily the candidate version that lost the conditional write. With a
//! frozen `ManualClock` the decision is deterministic; with a real clock two
//! calls on identical inputs may disagree.
//!
//! Resolution is a decision only. Persisting the winner is the separate,
//! explicit `EventProcessor::reconcile` step.

use std::sync::Arc;

use regionkv_core::{Clock, Event, Record, RegionId, Resolution, ResolutionKind, LWW_MESSAGE};
use tracing::info;

/// Decides which of two competing versions is canonical
#[derive(Clone)]
pub struct ConflictResolver {
    clock: Arc<dyn Clock>,
}

impl ConflictResolver {
    /// Resolver drawing incoming versions from `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Compare the persisted record against an incoming event
    ///
    /// `new_data_applied` iff the freshly computed incoming version is
    /// strictly greater than the persisted one; ties keep the existing data.
    pub fn resolve_conflict(
        &self,
        existing: &Record,
        incoming: &Event,
        incoming_region: &RegionId,
    ) -> Resolution {
        let incoming_version = self.clock.next_version();
        let resolution = if incoming_version > existing.version {
            ResolutionKind::NewDataApplied
        } else {
            ResolutionKind::ExistingDataKept
        };

        info!(
            target: "regionkv::resolver",
            key = %incoming.key,
            existing_version = %existing.version,
            existing_origin = %existing.origin,
            incoming_version = %incoming_version,
            incoming_region = %incoming_region,
            resolution = %resolution,
            "Conflict resolved"
        );

        Resolution {
            resolution,
            message: LWW_MESSAGE.to_string(),
            key: incoming.key.clone(),
            existing_version: existing.version,
            incoming_version,
            existing_origin: existing.origin.clone(),
            incoming_region: incoming_region.clone(),
        }
    }
}

impl std::fmt::Debug for ConflictResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictResolver").finish_non_exhaustive()
    }
}
