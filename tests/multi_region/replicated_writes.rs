//! Two regions writing the same records

use std::sync::Arc;

use regionkv::{
    Clock, Event, EventProcessor, ManualClock, ProcessingResult, RegionId, ResolutionKind,
    Version, VersionedStore,
};
use serde_json::json;

use crate::two_regions;

#[test]
fn test_process_new_event() {
    let (store, east, _west) = two_regions();

    let event = Event::new("event-123", json!({"message": "Hello World"})).with_token("idem-123");
    assert_eq!(east.process_event(&event).status(), "success");

    let stored = store.get("event-123").unwrap().unwrap();
    assert_eq!(stored.payload["message"], "Hello World");
    assert_eq!(stored.origin.as_str(), "us-east-1");
}

#[test]
fn test_idempotency() {
    let (_store, east, _west) = two_regions();

    let event =
        Event::new("event-456", json!({"message": "Test Idempotency"})).with_token("idem-456");
    assert_eq!(east.process_event(&event).status(), "success");
    assert_eq!(east.process_event(&event).status(), "duplicate");

    let metrics = east.metrics();
    assert_eq!(metrics.total_processed, 2);
    assert_eq!(metrics.total_succeeded, 1);
    assert_eq!(metrics.total_duplicates, 1);
}

#[test]
fn test_region_two_overwrites_after_forced_low_version() {
    let (store, east, west) = two_regions();

    let first = Event::new("event-789", json!({"message": "Region 1 Data"})).with_token("idem-789-1");
    let second =
        Event::new("event-789", json!({"message": "Region 2 Data"})).with_token("idem-789-2");

    east.process_event(&first);

    let mut item = store.get("event-789").unwrap().unwrap();
    item.version = Version::ZERO;
    store.put(item);

    assert_eq!(west.process_event(&second).status(), "success");
    let stored = store.get("event-789").unwrap().unwrap();
    assert_eq!(stored.payload["message"], "Region 2 Data");
    assert_eq!(stored.origin.as_str(), "eu-west-1");
}

#[test]
fn test_resolved_outcome_wire_shape() {
    let store = Arc::new(regionkv::InMemoryStore::new());
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_millis(1_700_000_000_000));
    let east = EventProcessor::new(Arc::clone(&store), RegionId::new("us-east-1").unwrap())
        .with_clock(Arc::clone(&clock));
    let west = EventProcessor::new(Arc::clone(&store), RegionId::new("eu-west-1").unwrap())
        .with_clock(clock);

    east.process_event(&Event::new("k1", json!("east")));
    let result = west.process_event(&Event::new("k1", json!("west")));

    let wire = serde_json::to_value(&result).unwrap();
    assert_eq!(wire["status"], "resolved");
    assert_eq!(wire["resolution"], "existing_data_kept");
    assert_eq!(wire["message"], "Conflict resolved using last-write-wins");
    assert_eq!(wire["existing_origin"], "us-east-1");
    assert_eq!(wire["incoming_region"], "eu-west-1");

    match result {
        ProcessingResult::Resolved(resolution) => {
            assert_eq!(resolution.resolution, ResolutionKind::ExistingDataKept)
        }
        other => panic!("expected resolved, got {other:?}"),
    }
}

#[test]
fn test_alternating_regions_last_writer_holds_record() {
    let (store, east, west) = two_regions();

    for n in 0..20 {
        let processor = if n % 2 == 0 { &east } else { &west };
        let result = processor.process_event(
            &Event::new("shared", json!({"n": n})).with_token(format!("tok-{n}")),
        );
        assert!(
            matches!(
                result,
                ProcessingResult::Success { .. } | ProcessingResult::Resolved(_)
            ),
            "unexpected {result:?}"
        );
    }

    let stored = store.get("shared").unwrap().unwrap();
    let last_success_region = if stored.payload["n"].as_u64().unwrap() % 2 == 0 {
        "us-east-1"
    } else {
        "eu-west-1"
    };
    assert_eq!(stored.origin.as_str(), last_success_region);
}
