//! Insertion-ordered mapping from mask id to mask.

use super::{Mask, MaskId};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Mapping from [`MaskId`] to [`Mask`].
///
/// The key of every entry equals the entry's own `id`; [`MaskMap::insert`]
/// keys by `mask.id` so the two cannot diverge. Entries remember insertion
/// order, which breaks ties when sorting by creation time. Replacing an
/// existing entry keeps its position.
#[derive(Clone, Default, PartialEq)]
pub struct MaskMap {
    entries: Vec<Mask>,
    index: HashMap<MaskId, usize>,
}

impl MaskMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of masks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no masks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a mask by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Mask> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    /// Returns true if `id` is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Inserts `mask` under its own id.
    ///
    /// Returns the previous mask with that id, whose slot is reused.
    pub fn insert(&mut self, mask: Mask) -> Option<Mask> {
        match self.index.get(&mask.id) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i], mask)),
            None => {
                self.index.insert(mask.id.clone(), self.entries.len());
                self.entries.push(mask);
                None
            }
        }
    }

    /// Removes and returns the mask with `id`.
    pub fn remove(&mut self, id: &str) -> Option<Mask> {
        let pos = self.index.remove(id)?;
        let removed = self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// Iterates masks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Mask> {
        self.entries.iter()
    }

    /// Iterates ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &MaskId> {
        self.entries.iter().map(|m| &m.id)
    }
}

impl fmt::Debug for MaskMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|m| (&m.id, m)))
            .finish()
    }
}

impl FromIterator<Mask> for MaskMap {
    fn from_iter<I: IntoIterator<Item = Mask>>(iter: I) -> Self {
        let mut map = Self::new();
        for mask in iter {
            map.insert(mask);
        }
        map
    }
}

impl IntoIterator for MaskMap {
    type Item = Mask;
    type IntoIter = std::vec::IntoIter<Mask>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for MaskMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for mask in &self.entries {
            map.serialize_entry(&mask.id, mask)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MaskMap {
    /// Reads `{ "<key>": mask, ... }`.
    ///
    /// A mask without a string `id` takes its key as id. Entries are then
    /// re-keyed by id; a later entry whose id is already taken gets a fresh
    /// one, so no mask is dropped.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MaskMapVisitor;

        impl<'de> Visitor<'de> for MaskMapVisitor {
            type Value = MaskMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of mask id to mask")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<MaskMap, A::Error> {
                let mut map = MaskMap::new();
                while let Some((key, mut value)) = access.next_entry::<String, Value>()? {
                    if let Value::Object(fields) = &mut value {
                        if !matches!(fields.get("id"), Some(Value::String(_))) {
                            fields.insert("id".to_string(), Value::String(key.clone()));
                        }
                    }
                    let mut mask: Mask = serde_json::from_value(value)
                        .map_err(|e| de::Error::custom(format!("mask {key:?}: {e}")))?;
                    if map.contains(mask.id.as_str()) {
                        let fresh = MaskId::new();
                        warn!(
                            key = key.as_str(),
                            id = %mask.id,
                            fresh = %fresh,
                            "duplicate mask id reassigned"
                        );
                        mask.id = fresh;
                    }
                    map.insert(mask);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MaskMapVisitor)
    }
}
