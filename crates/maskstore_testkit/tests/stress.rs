//! Concurrent mutation stress test.

use maskstore_core::MaskStore;
use maskstore_storage::InMemoryBackend;
use maskstore_testkit::{concurrent_mutations, StressConfig};
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn concurrent_writers_keep_store_consistent() {
    let backend = InMemoryBackend::new();
    let store = Arc::new(MaskStore::builder().backend(backend.clone()).open().unwrap());
    let config = StressConfig::default();

    let result = concurrent_mutations(&store, &config);
    result.print_summary("concurrent writers");

    let expected = config.threads * config.masks_per_thread;
    assert_eq!(result.created, expected);
    assert_eq!(result.updated, expected);
    assert_eq!(result.deleted, expected / 2);
    assert_eq!(store.len(), expected - expected / 2);

    let all = store.get_all(false);
    let ids: HashSet<_> = all.iter().map(|m| m.id.clone()).collect();
    assert_eq!(ids.len(), all.len());
    assert!(all.iter().all(|m| m.name.ends_with("-renamed")));

    let events = store.change_feed().latest_sequence();
    assert_eq!(events, result.total_ops() as u64);

    let reopened = MaskStore::builder().backend(backend).open().unwrap();
    assert_eq!(reopened.get_all(false), all);
}
