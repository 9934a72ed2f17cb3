//! Mask identifier.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a mask.
///
/// Mask IDs are strings that are:
/// - Unique within a store
/// - Immutable once assigned
/// - Never reused
///
/// Fresh IDs are random UUIDs in their 32-character simple form. IDs loaded
/// from older snapshots keep whatever string they were persisted with.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskId(String);

impl MaskId {
    /// Creates a new random mask ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wraps an existing identifier string.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for MaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaskId({})", self.0)
    }
}

impl fmt::Display for MaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MaskId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for MaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<MaskId> for String {
    fn from(id: MaskId) -> Self {
        id.0
    }
}
