//! Snapshot test vectors.
//!
//! One vector per snapshot shape MaskStore has ever had to read, plus the
//! damaged payloads it must survive.

use serde::{Deserialize, Serialize};

/// What loading a vector must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedLoad {
    /// The store loads these mask names, in `get_all(false)` order.
    Masks {
        /// Version the payload claims, as written by `SchemaVersion`'s Display.
        from_version: String,
        /// Migration steps that must run.
        applied: usize,
        /// Names in `get_all(false)` order.
        names: Vec<String>,
    },
    /// The payload is unusable; the store opens empty.
    Recovered,
}

/// A persisted payload and the expected load result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Raw snapshot bytes, as JSON text.
    pub input: String,
    /// Expected outcome.
    pub expected: ExpectedLoad,
}

fn masks(from_version: &str, applied: usize, names: &[&str]) -> ExpectedLoad {
    ExpectedLoad::Masks {
        from_version: from_version.into(),
        applied,
        names: names.iter().map(|n| (*n).to_string()).collect(),
    }
}

/// Vectors covering every schema version and the corrupt cases.
pub fn snapshot_vectors() -> Vec<SnapshotVector> {
    vec![
        SnapshotVector {
            id: "v0_unversioned".into(),
            description: "No version field: oldest schema, numeric ids".into(),
            input: r#"{"masks":{"0":{"id":0,"name":"Zero","createdAt":1}}}"#.into(),
            expected: masks("0", 2, &["Zero"]),
        },
        SnapshotVector {
            id: "v2_envelope".into(),
            description: "Version 2 inside a state envelope with numeric ids".into(),
            input: r#"{"state":{"masks":{"1":{"id":1,"name":"One","createdAt":10},"2":{"id":2,"name":"Two","createdAt":20}},"lastUpdateTime":20},"version":2}"#.into(),
            expected: masks("2", 2, &["Two", "One"]),
        },
        SnapshotVector {
            id: "v3_stale_keys".into(),
            description: "Version 3 with string ids that do not match their keys".into(),
            input: r#"{"masks":{"k1":{"id":"a","name":"A","createdAt":2},"k2":{"id":"b","name":"B","createdAt":1}},"version":3}"#.into(),
            expected: masks("3", 1, &["A", "B"]),
        },
        SnapshotVector {
            id: "v3_1_current".into(),
            description: "Current version, loaded unchanged".into(),
            input: r#"{"masks":{"a":{"id":"a","name":"A","createdAt":5}},"version":3.1,"lastUpdate":5}"#.into(),
            expected: masks("3.1", 0, &["A"]),
        },
        SnapshotVector {
            id: "v3_1_string_version".into(),
            description: "Version stored as a string".into(),
            input: r#"{"masks":{"a":{"id":"a","name":"A"}},"version":"3.1"}"#.into(),
            expected: masks("3.1", 0, &["A"]),
        },
        SnapshotVector {
            id: "future_version".into(),
            description: "Newer than this build: loaded as is".into(),
            input: r#"{"masks":{"a":{"id":"a","name":"Future","newField":1}},"version":4}"#.into(),
            expected: masks("4", 0, &["Future"]),
        },
        SnapshotVector {
            id: "null_masks".into(),
            description: "Masks explicitly null".into(),
            input: r#"{"masks":null,"version":3.1}"#.into(),
            expected: masks("3.1", 0, &[]),
        },
        SnapshotVector {
            id: "not_json".into(),
            description: "Truncated JSON".into(),
            input: r#"{"masks":{"a":"#.into(),
            expected: ExpectedLoad::Recovered,
        },
        SnapshotVector {
            id: "top_level_array".into(),
            description: "Snapshot is not an object".into(),
            input: "[]".into(),
            expected: ExpectedLoad::Recovered,
        },
        SnapshotVector {
            id: "masks_not_object".into(),
            description: "Masks is a list".into(),
            input: r#"{"masks":[1,2],"version":2}"#.into(),
            expected: ExpectedLoad::Recovered,
        },
        SnapshotVector {
            id: "negative_version".into(),
            description: "Version is negative".into(),
            input: r#"{"masks":{},"version":-1}"#.into(),
            expected: ExpectedLoad::Recovered,
        },
        SnapshotVector {
            id: "bad_field_type".into(),
            description: "A mask field has the wrong type".into(),
            input: r#"{"masks":{"a":{"id":"a","createdAt":"soon"}},"version":3.1}"#.into(),
            expected: ExpectedLoad::Recovered,
        },
    ]
}
