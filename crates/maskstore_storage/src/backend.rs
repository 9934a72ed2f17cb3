//! Snapshot backend trait definition.

use crate::error::StorageResult;

/// A snapshot blob store for MaskStore.
///
/// Backends are **opaque byte stores** holding at most one snapshot.
/// MaskStore owns the snapshot format - backends do not understand
/// masks, versions or migrations.
///
/// # Invariants
///
/// - `load` returns exactly the bytes passed to the last successful `save`
/// - `load` returns `None` if nothing was ever saved
/// - a failed `save` leaves the previous snapshot intact
/// - Backends must be `Send + Sync` for shared access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait SnapshotBackend: Send + Sync {
    /// Loads the most recently saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read.
    fn load(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the stored snapshot with `data`.
    ///
    /// After this returns successfully, a subsequent `load` (including one
    /// from a new process for durable backends) returns `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn save(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Returns a short human-readable description of where snapshots live.
    fn describe(&self) -> String;
}

impl<B: SnapshotBackend + ?Sized> SnapshotBackend for Box<B> {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        (**self).load()
    }

    fn save(&mut self, data: &[u8]) -> StorageResult<()> {
        (**self).save(data)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
