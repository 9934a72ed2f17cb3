//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores
//! and common test scenarios.

use maskstore_core::{
    BuiltinCatalog, BuiltinMask, HostDefaults, Lang, MaskDraft, MaskId, MaskStore, ModelConfig,
    ModelConfigOverrides,
};
use maskstore_storage::InMemoryBackend;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Host defaults that can be changed while a store is using them.
#[derive(Debug, Default)]
pub struct SwitchableHost {
    config: RwLock<ModelConfig>,
    locale: RwLock<Lang>,
    hide_builtins: RwLock<bool>,
}

impl SwitchableHost {
    /// Creates a host with stock defaults, shared for handing to a store.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replaces the global model config.
    pub fn set_config(&self, config: ModelConfig) {
        *self.config.write() = config;
    }

    /// Edits the global model config in place.
    pub fn edit_config(&self, f: impl FnOnce(&mut ModelConfig)) {
        f(&mut *self.config.write());
    }

    /// Replaces the locale.
    pub fn set_locale(&self, locale: impl Into<Lang>) {
        *self.locale.write() = locale.into();
    }

    /// Shows or hides built-ins.
    pub fn set_hide_builtins(&self, hide: bool) {
        *self.hide_builtins.write() = hide;
    }
}

impl HostDefaults for SwitchableHost {
    fn current_config(&self) -> ModelConfig {
        self.config.read().clone()
    }

    fn current_locale(&self) -> Lang {
        self.locale.read().clone()
    }

    fn hide_builtin_masks(&self) -> bool {
        *self.hide_builtins.read()
    }
}

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: MaskStore,
    /// Backend handle, for in-memory stores.
    pub backend: Option<InMemoryBackend>,
    /// The host the store reads defaults from.
    pub host: Arc<SwitchableHost>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a new in-memory test store with the sample catalog.
    pub fn memory() -> Self {
        Self::memory_with(InMemoryBackend::new())
    }

    /// Creates an in-memory test store over `backend`.
    ///
    /// Clones of an [`InMemoryBackend`] share their data, so a second store
    /// over a clone sees what the first one persisted.
    pub fn memory_with(backend: InMemoryBackend) -> Self {
        let host = SwitchableHost::shared();
        let store = MaskStore::builder()
            .backend(backend.clone())
            .shared_host(host.clone())
            .catalog(sample_catalog())
            .open()
            .expect("Failed to open in-memory store");

        Self {
            store,
            backend: Some(backend),
            host,
            _temp_dir: None,
        }
    }

    /// Creates a new file-based test store.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let host = SwitchableHost::shared();
        let store = MaskStore::builder()
            .path(temp_dir.path())
            .shared_host(host.clone())
            .catalog(sample_catalog())
            .open()
            .expect("Failed to open file store");

        Self {
            store,
            backend: None,
            host,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the snapshot file path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir
            .as_ref()
            .map(|d| d.path().join(self.store.config().file_name()))
    }

    /// Reopens a store over the same backend or file.
    pub fn reopen(&self) -> MaskStore {
        let builder = MaskStore::builder()
            .shared_host(self.host.clone())
            .catalog(sample_catalog());
        let builder = match &self.backend {
            Some(backend) => builder.backend(backend.clone()),
            None => builder.path(self.path().expect("File store should have a path")),
        };
        builder.open().expect("Failed to reopen store")
    }
}

impl std::ops::Deref for TestStore {
    type Target = MaskStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary in-memory store.
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&MaskStore) -> R,
{
    let test_store = TestStore::memory();
    f(&test_store.store)
}

/// Runs a test with a temporary file-based store.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&MaskStore, &std::path::Path) -> R,
{
    let test_store = TestStore::file();
    let path = test_store.path().expect("File store should have a path");
    f(&test_store.store, &path)
}

/// Two built-ins: one overriding temperature, one overriding model.
pub fn sample_catalog() -> BuiltinCatalog {
    BuiltinCatalog::new(vec![
        BuiltinMask {
            id: MaskId::from_string("builtin-writer"),
            avatar: "1f4dd".to_string(),
            name: "Writer".to_string(),
            created_at: 1_688_899_480_511,
            hide_context: None,
            context: Vec::new(),
            sync_global_config: None,
            model_config: ModelConfigOverrides {
                temperature: Some(0.9),
                ..ModelConfigOverrides::default()
            },
            lang: Lang::new("en"),
            plugin: None,
        },
        BuiltinMask {
            id: MaskId::from_string("builtin-coder"),
            avatar: "1f4bb".to_string(),
            name: "Coder".to_string(),
            created_at: 1_688_899_480_512,
            hide_context: Some(false),
            context: Vec::new(),
            sync_global_config: None,
            model_config: ModelConfigOverrides {
                model: Some("gpt-4".to_string()),
                ..ModelConfigOverrides::default()
            },
            lang: Lang::new("en"),
            plugin: None,
        },
    ])
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a store holding `count` masks named `mask-<i>`, with
    /// `created_at` equal to `i`.
    pub fn populated_store(count: u64) -> TestStore {
        let test_store = TestStore::memory();
        for i in 0..count {
            test_store.create(Some(
                MaskDraft::new().name(format!("mask-{i}")).created_at(i),
            ));
        }
        test_store
    }
}
