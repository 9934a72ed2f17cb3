//! Property tests for migration and the store.

use maskstore_core::{MaskStore, MigrationManager, CURRENT_VERSION};
use maskstore_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    #![proptest_config(PropertyTestConfig::default().to_proptest_config())]

    #[test]
    fn migration_is_idempotent((state, version) in legacy_snapshot_strategy()) {
        let manager = MigrationManager::default();
        let once = manager.migrate(&state, version).unwrap();

        let current = serde_json::to_value(&once.state).unwrap();
        let twice = manager.migrate(&current, CURRENT_VERSION).unwrap();

        prop_assert_eq!(twice.applied_count, 0);
        prop_assert_eq!(twice.state, once.state);
    }

    #[test]
    fn migrated_keys_equal_ids((state, version) in legacy_snapshot_strategy()) {
        let run = MigrationManager::default().migrate(&state, version).unwrap();

        for id in run.state.masks.ids() {
            prop_assert_eq!(&run.state.masks.get(id.as_str()).unwrap().id, id);
        }
        let serialized = serde_json::to_value(&run.state).unwrap();
        for (key, mask) in serialized["masks"].as_object().unwrap() {
            prop_assert_eq!(mask["id"].as_str(), Some(key.as_str()));
        }
    }

    #[test]
    fn migration_keeps_every_mask((state, version) in legacy_snapshot_strategy()) {
        let before = state["masks"].as_object().map_or(0, |m| m.len());
        let run = MigrationManager::default().migrate(&state, version).unwrap();

        prop_assert_eq!(run.state.masks.len(), before);
    }

    #[test]
    fn get_all_is_sorted_newest_first(drafts in prop::collection::vec(mask_draft_strategy(), 0..20)) {
        let store = MaskStore::open_in_memory().unwrap();
        for draft in drafts {
            store.create(Some(draft));
        }

        let all = store.get_all(false);
        prop_assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        prop_assert_eq!(all.len(), store.len());
    }

    #[test]
    fn operations_preserve_invariants(ops in operation_sequence_strategy(1, 40)) {
        let test_store = TestStore::memory();
        let mut live: Vec<String> = Vec::new();

        for op in ops {
            match op {
                StoreOperation::Create { draft } => {
                    let mask = test_store.create(Some(draft));
                    prop_assert!(!live.contains(&mask.id.as_str().to_string()));
                    live.push(mask.id.into_string());
                }
                StoreOperation::Rename { index, name } if !live.is_empty() => {
                    let id = &live[index % live.len()];
                    prop_assert!(test_store.update(id, |m| m.name = name.clone()));
                    prop_assert_eq!(test_store.get(Some(id.as_str())).unwrap().name, name);
                }
                StoreOperation::Delete { index } if !live.is_empty() => {
                    let id = live.remove(index % live.len());
                    prop_assert!(test_store.delete(&id));
                    prop_assert!(test_store.get(Some(id.as_str())).is_none());
                }
                _ => {}
            }
        }

        let stored: HashSet<_> = test_store
            .get_all(false)
            .into_iter()
            .map(|m| m.id.into_string())
            .collect();
        let expected: HashSet<_> = live.iter().cloned().collect();
        prop_assert_eq!(&stored, &expected);

        let reopened = test_store.reopen();
        prop_assert_eq!(reopened.get_all(false), test_store.get_all(false));
    }
}
