//! In-memory snapshot backend for testing.

use crate::backend::SnapshotBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// An in-memory snapshot backend.
///
/// This backend keeps the snapshot in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Sharing
///
/// Clones share the same underlying snapshot. Tests hand one clone to a
/// store and keep another to inspect what was saved, or to reopen a second
/// store over the "same disk".
///
/// # Example
///
/// ```rust
/// use maskstore_storage::{SnapshotBackend, InMemoryBackend};
///
/// let reader = InMemoryBackend::new();
/// let mut backend = reader.clone();
/// backend.save(b"snapshot").unwrap();
/// assert_eq!(reader.data().unwrap(), b"snapshot");
/// assert_eq!(reader.save_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    inner: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    data: RwLock<Option<Vec<u8>>>,
    saves: AtomicU64,
    fail_saves: AtomicBool,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with a pre-existing snapshot.
    ///
    /// Useful for testing migration and recovery scenarios.
    #[must_use]
    pub fn with_data(data: impl Into<Vec<u8>>) -> Self {
        let backend = Self::new();
        *backend.inner.data.write() = Some(data.into());
        backend
    }

    /// Returns a copy of the stored snapshot.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.inner.data.read().clone()
    }

    /// Returns how many saves succeeded on this backend (across clones).
    #[must_use]
    pub fn save_count(&self) -> u64 {
        self.inner.saves.load(Ordering::SeqCst)
    }

    /// Makes every subsequent `save` fail with an I/O error.
    ///
    /// Used to exercise persistence-failure paths.
    pub fn set_fail_saves(&self, fail: bool) {
        self.inner.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl SnapshotBackend for InMemoryBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.inner.data.read().clone())
    }

    fn save(&mut self, data: &[u8]) -> StorageResult<()> {
        if self.inner.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected save failure",
            )));
        }
        *self.inner.data.write() = Some(data.to_vec());
        self.inner.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.load().unwrap().is_none());
        assert_eq!(backend.save_count(), 0);
    }

    #[test]
    fn memory_save_then_load() {
        let mut backend = InMemoryBackend::new();
        backend.save(b"hello").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"hello");
    }

    #[test]
    fn memory_save_replaces_previous() {
        let mut backend = InMemoryBackend::new();
        backend.save(b"first").unwrap();
        backend.save(b"second").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"second");
        assert_eq!(backend.save_count(), 2);
    }

    #[test]
    fn memory_clones_share_data() {
        let reader = InMemoryBackend::new();
        let mut writer = reader.clone();
        writer.save(b"shared").unwrap();
        assert_eq!(reader.data().unwrap(), b"shared");
    }

    #[test]
    fn memory_with_data() {
        let backend = InMemoryBackend::with_data(b"preloaded".to_vec());
        assert_eq!(backend.load().unwrap().unwrap(), b"preloaded");
        assert_eq!(backend.save_count(), 0);
    }

    #[test]
    fn memory_injected_failure_keeps_previous() {
        let mut backend = InMemoryBackend::new();
        backend.save(b"good").unwrap();
        backend.set_fail_saves(true);
        assert!(matches!(backend.save(b"bad"), Err(StorageError::Io(_))));
        assert_eq!(backend.load().unwrap().unwrap(), b"good");

        backend.set_fail_saves(false);
        backend.save(b"again").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"again");
    }
}
