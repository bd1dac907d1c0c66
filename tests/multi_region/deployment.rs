//! Processors built from `regionkv.toml`

use std::sync::Arc;
use std::time::Duration;

use regionkv::{
    ClockKind, Event, EventProcessor, InMemoryStore, ProcessorConfig, TokenCleaner,
    TokenRecording, VersionedStore, CONFIG_FILE_NAME,
};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_regions_from_config_files() {
    let dir = TempDir::new().unwrap();
    let east_path = dir.path().join(format!("east-{CONFIG_FILE_NAME}"));
    let west_path = dir.path().join(format!("west-{CONFIG_FILE_NAME}"));

    std::fs::write(&east_path, "region = \"us-east-1\"\nclock = \"logical\"\n").unwrap();
    std::fs::write(
        &west_path,
        "region = \"eu-west-1\"\nclock = \"logical\"\ntoken_recording = \"best_effort\"\n",
    )
    .unwrap();

    let east_config = ProcessorConfig::from_file(&east_path).unwrap();
    let west_config = ProcessorConfig::from_file(&west_path).unwrap();
    assert_eq!(east_config.clock, ClockKind::Logical);
    assert_eq!(west_config.token_recording, TokenRecording::BestEffort);

    let store = Arc::new(InMemoryStore::new());
    let east = EventProcessor::from_config(Arc::clone(&store), &east_config).unwrap();
    let west = EventProcessor::from_config(Arc::clone(&store), &west_config).unwrap();

    // Independent logical clocks both start at 1: the second region's first
    // write collides with the first region's
    let first = east.process_event(&Event::new("k1", json!("east")).with_token("a"));
    assert_eq!(first.record().unwrap().version.as_u64(), 1);

    let second = west.process_event(&Event::new("k1", json!("west")).with_token("b"));
    let resolution = second.resolution().expect("logical versions collide");
    assert_eq!(resolution.existing_version.as_u64(), 1);
    assert_eq!(resolution.incoming_version.as_u64(), 2);
    assert!(resolution.incoming_wins());

    // Explicit repair persists the winner
    let repaired = west.reconcile(&Event::new("k1", json!("west")).with_token("b"), resolution);
    assert!(repaired.is_success());
    assert_eq!(store.get("k1").unwrap().unwrap().origin.as_str(), "eu-west-1");
}

#[test]
fn test_token_retention_with_cleaner() {
    let config = ProcessorConfig::from_toml_str(
        "region = \"us-east-1\"\ntoken_retention_secs = 1\n",
    )
    .unwrap();
    let store = Arc::new(InMemoryStore::from_token_retention(config.token_retention()));
    assert_eq!(store.token_retention(), Some(Duration::from_secs(1)));
    let processor = EventProcessor::from_config(Arc::clone(&store), &config).unwrap();

    let event = Event::new("k1", json!(1)).with_token("t1");
    assert!(processor.process_event(&event).is_success());
    assert!(processor.process_event(&event).is_duplicate());

    let cleaner = TokenCleaner::new(Arc::clone(&store), Duration::from_millis(50));
    let handle = cleaner.start();
    std::thread::sleep(Duration::from_millis(1_500));
    cleaner.shutdown();
    handle.join().unwrap();

    assert_eq!(store.token_count(), 0);
    assert!(!store.has_token("t1").unwrap());
}
