//! Persisted snapshot format.
//!
//! A snapshot is one JSON document:
//!
//! ```json
//! { "masks": { "<id>": { ... } }, "version": 3.1, "lastUpdate": 1700000000000 }
//! ```
//!
//! Older hosts wrapped the state in an envelope,
//! `{ "state": { "masks": ..., "lastUpdateTime": ... }, "version": 3 }`;
//! [`RawSnapshot::decode`] accepts both shapes.

use crate::error::{CoreError, CoreResult};
use crate::mask::MaskMap;
use crate::version::{SchemaVersion, CURRENT_VERSION};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The store's state proper: every user mask, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaskState {
    /// User masks.
    #[serde(default)]
    pub masks: MaskMap,
}

/// A current-shape snapshot, as written by this build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// User masks.
    pub masks: MaskMap,
    /// Schema version of `masks`.
    pub version: SchemaVersion,
    /// Time of the last mutation, epoch milliseconds.
    #[serde(rename = "lastUpdate", default)]
    pub last_update: u64,
}

impl Snapshot {
    /// Creates a snapshot at [`CURRENT_VERSION`].
    #[must_use]
    pub fn new(masks: MaskMap, last_update: u64) -> Self {
        Self {
            masks,
            version: CURRENT_VERSION,
            last_update,
        }
    }

    /// Encodes the snapshot as JSON.
    pub fn encode(&self, pretty: bool) -> CoreResult<Vec<u8>> {
        encode(&self.masks, self.last_update, pretty)
    }

    /// Parses persisted bytes of any version. See [`RawSnapshot::decode`].
    pub fn decode(bytes: &[u8]) -> CoreResult<RawSnapshot> {
        RawSnapshot::decode(bytes)
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    masks: &'a MaskMap,
    version: SchemaVersion,
    #[serde(rename = "lastUpdate")]
    last_update: u64,
}

/// Encodes `masks` as a current-version snapshot without cloning them.
pub(crate) fn encode(masks: &MaskMap, last_update: u64, pretty: bool) -> CoreResult<Vec<u8>> {
    let snapshot = SnapshotRef {
        masks,
        version: CURRENT_VERSION,
        last_update,
    };
    let bytes = if pretty {
        serde_json::to_vec_pretty(&snapshot)?
    } else {
        serde_json::to_vec(&snapshot)?
    };
    Ok(bytes)
}

/// A decoded but not yet migrated snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSnapshot {
    /// The raw `{ "masks": ... }` state object.
    pub state: Value,
    /// Version the state was stored with.
    pub version: SchemaVersion,
    /// Time of the last mutation, epoch milliseconds (0 if unknown).
    pub last_update: u64,
}

impl RawSnapshot {
    /// Parses snapshot bytes.
    ///
    /// A missing version means [`SchemaVersion::INITIAL`].
    ///
    /// # Errors
    ///
    /// Returns `CorruptState` if the bytes are not a JSON object or the
    /// version is not a decimal number.
    pub fn decode(bytes: &[u8]) -> CoreResult<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::corrupt_state(format!("snapshot is not valid JSON: {e}")))?;

        let Value::Object(mut root) = value else {
            return Err(CoreError::corrupt_state("snapshot is not a JSON object"));
        };

        let version = match root.remove("version") {
            None | Some(Value::Null) => SchemaVersion::INITIAL,
            Some(v) => SchemaVersion::from_json(&v)
                .map_err(|e| CoreError::corrupt_state(e.to_string()))?,
        };

        let mut last_update = root
            .remove("lastUpdate")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let mut state = if !root.contains_key("masks") && root.get("state").is_some_and(Value::is_object) {
            root.remove("state").unwrap_or(Value::Null)
        } else {
            Value::Object(root)
        };

        if let Value::Object(fields) = &mut state {
            if let Some(legacy) = fields.remove("lastUpdateTime").and_then(|v| v.as_u64()) {
                last_update = last_update.max(legacy);
            }
        }

        Ok(Self {
            state,
            version,
            last_update,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::Mask;
    use serde_json::json;

    fn mask(id: &str) -> Mask {
        serde_json::from_value(json!({ "id": id, "name": id })).unwrap()
    }

    #[test]
    fn encode_writes_current_version() {
        let masks: MaskMap = vec![mask("a")].into_iter().collect();
        let bytes = Snapshot::new(masks, 77).encode(false).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["version"], json!(3.1));
        assert_eq!(value["lastUpdate"], json!(77));
        assert_eq!(value["masks"]["a"]["name"], json!("a"));
    }

    #[test]
    fn decode_flat_snapshot() {
        let raw = RawSnapshot::decode(br#"{"masks":{"a":{"id":"a"}},"version":3.1,"lastUpdate":9}"#)
            .unwrap();
        assert_eq!(raw.version, CURRENT_VERSION);
        assert_eq!(raw.last_update, 9);
        assert_eq!(raw.state, json!({ "masks": { "a": { "id": "a" } } }));
    }

    #[test]
    fn decode_envelope_snapshot() {
        let raw = RawSnapshot::decode(
            br#"{"state":{"masks":{"1":{"id":1}},"lastUpdateTime":12},"version":2}"#,
        )
        .unwrap();
        assert_eq!(raw.version, SchemaVersion::new(2, 0));
        assert_eq!(raw.last_update, 12);
        assert_eq!(raw.state, json!({ "masks": { "1": { "id": 1 } } }));
    }

    #[test]
    fn decode_without_version_is_initial() {
        let raw = RawSnapshot::decode(br#"{"masks":{}}"#).unwrap();
        assert_eq!(raw.version, SchemaVersion::INITIAL);
        assert_eq!(raw.last_update, 0);
    }

    #[test]
    fn decode_rejects_garbage() {
        for bytes in [
            &b"not json"[..],
            &b"[1,2]"[..],
            &b"{\"masks\":{},\"version\":\"three\"}"[..],
            &b""[..],
        ] {
            let err = RawSnapshot::decode(bytes).unwrap_err();
            assert!(matches!(err, CoreError::CorruptState { .. }));
        }
    }

    #[test]
    fn snapshot_round_trip_preserves_order() {
        let masks: MaskMap = vec![mask("z"), mask("a")].into_iter().collect();
        let snapshot = Snapshot::new(masks, 1);
        let bytes = snapshot.encode(true).unwrap();

        let back: Snapshot = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, snapshot);
        let ids: Vec<_> = back.masks.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["z", "a"]);
    }
}
