//! Benchmark utilities.

use serde_json::{json, Map, Value};

/// Builds a version 2 snapshot of `count` masks with numeric ids, wrapped
/// in a state envelope.
pub fn legacy_snapshot(count: usize) -> Vec<u8> {
    let masks: Map<String, Value> = (0..count)
        .map(|i| {
            let mask = json!({
                "id": i,
                "name": format!("legacy-{i}"),
                "avatar": "1f47e",
                "createdAt": i,
                "context": [],
            });
            (i.to_string(), mask)
        })
        .collect();
    let snapshot = json!({ "state": { "masks": masks }, "version": 2 });
    serde_json::to_vec(&snapshot).unwrap_or_default()
}
