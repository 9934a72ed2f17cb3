//! The mask store facade.

use crate::change_feed::{ChangeFeed, MaskEvent};
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::host::{BuiltinCatalog, HostDefaults, StaticDefaults};
use crate::mask::{
    default_context, Mask, MaskDraft, MaskId, MaskMap, ARTIFACTS_PLUGIN, DEFAULT_MASK_AVATAR,
    DEFAULT_MASK_NAME,
};
use crate::migration::MigrationManager;
use crate::snapshot::{self, RawSnapshot, Snapshot};
use crate::version::SchemaVersion;
use maskstore_storage::{FileBackend, InMemoryBackend, SnapshotBackend, StorageError};
use parking_lot::{Mutex, RwLock};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

/// How the store's state was obtained when it was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The backend held no snapshot.
    Fresh,
    /// A snapshot was loaded, running `applied` migration steps.
    Loaded {
        /// Version the snapshot was stored with.
        from: SchemaVersion,
        /// Number of migration steps that ran.
        applied: usize,
    },
    /// The snapshot could not be decoded or migrated; the store started
    /// empty. The bytes stay in the backend until the first mutation.
    Recovered {
        /// What was wrong with the snapshot.
        error: String,
    },
}

struct StoreInner {
    masks: MaskMap,
    last_update: u64,
    sequence: u64,
}

/// A persisted collection of user masks, merged on read with a host
/// supplied built-in catalog.
///
/// `MaskStore` is the only owner of the mask mapping. Reads return owned
/// copies; mutations follow copy-modify-replace and re-persist the whole
/// snapshot before returning.
///
/// # Opening a store
///
/// ```rust
/// use maskstore_core::{MaskDraft, MaskStore};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let store = MaskStore::open(dir.path().join("masks.json"))?;
///
/// let mask = store.create(Some(MaskDraft::new().name("Reviewer")));
/// store.update(mask.id.as_str(), |m| m.model_config.temperature = 0.2);
///
/// let reloaded = MaskStore::open(dir.path().join("masks.json"))?;
/// assert_eq!(reloaded.get(Some(mask.id.as_str())).unwrap().model_config.temperature, 0.2);
/// # Ok(())
/// # }
/// ```
///
/// # Concurrency
///
/// Every mutation holds the state's write lock from the copy until the
/// snapshot is handed to the backend, so persists happen in mutation
/// order. Updater closures run under that lock and must not call back into
/// the store.
pub struct MaskStore {
    config: Config,
    inner: RwLock<StoreInner>,
    backend: Mutex<Box<dyn SnapshotBackend>>,
    host: Arc<dyn HostDefaults>,
    catalog: BuiltinCatalog,
    feed: ChangeFeed,
    persist_failures: AtomicU64,
    load_outcome: LoadOutcome,
}

impl MaskStore {
    /// Opens a store backed by the JSON file at `path`.
    ///
    /// If `path` is an existing directory the snapshot lives at
    /// `<path>/<store_key>.json`. Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read. An unreadable
    /// snapshot is not an error; see [`LoadOutcome::Recovered`].
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        Self::builder().path(path).open()
    }

    /// Opens an empty, non-persistent store with default collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in migrations are misconfigured.
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::builder().backend(InMemoryBackend::new()).open()
    }

    /// Starts configuring a store.
    #[must_use]
    pub fn builder() -> MaskStoreBuilder {
        MaskStoreBuilder::new()
    }

    /// Creates a mask and returns the stored copy.
    ///
    /// The mask starts from defaults (fresh id, default avatar and name,
    /// default seed conversation, the host's locale and model config) and
    /// `draft` fields are laid over them. `id` and `builtin` are always
    /// assigned by the store.
    pub fn create(&self, draft: Option<MaskDraft>) -> Mask {
        let mut mask = self.default_mask();
        if let Some(draft) = draft {
            draft.apply_to(&mut mask);
        }

        let mut inner = self.inner.write();
        while inner.masks.contains(mask.id.as_str()) {
            mask.id = MaskId::new();
        }
        inner.masks.insert(mask.clone());
        debug!(id = %mask.id, name = %mask.name, "mask created");

        self.commit(&mut inner, MaskEvent::created, mask.id.clone());
        mask
    }

    /// Applies `updater` to a copy of the mask with `id` and stores the
    /// copy in its place.
    ///
    /// Returns false, without persisting, if no such mask exists. If the
    /// updater panics the stored mask is left as it was.
    pub fn update<F>(&self, id: &str, updater: F) -> bool
    where
        F: FnOnce(&mut Mask),
    {
        let result = self.try_update(id, |mask| {
            updater(mask);
            Ok::<(), Infallible>(())
        });
        match result {
            Ok(updated) => updated,
            Err(never) => match never {},
        }
    }

    /// Like [`MaskStore::update`], with a fallible updater.
    ///
    /// If the updater returns `Err` the stored mask is unchanged, nothing
    /// is persisted, and the error is handed back.
    pub fn try_update<F, E>(&self, id: &str, updater: F) -> Result<bool, E>
    where
        F: FnOnce(&mut Mask) -> Result<(), E>,
    {
        let mut inner = self.inner.write();
        let Some(current) = inner.masks.get(id) else {
            debug!(id, "update of unknown mask ignored");
            return Ok(false);
        };

        let key = current.id.clone();
        let mut candidate = current.clone();
        updater(&mut candidate)?;
        candidate.id = key.clone();
        candidate.builtin = false;

        inner.masks.insert(candidate);
        debug!(id = %key, "mask updated");

        self.commit(&mut inner, MaskEvent::updated, key);
        Ok(true)
    }

    /// Removes the mask with `id`. Returns false if there was none.
    pub fn delete(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        let Some(removed) = inner.masks.remove(id) else {
            debug!(id, "delete of unknown mask ignored");
            return false;
        };
        debug!(id = %removed.id, "mask deleted");

        self.commit(&mut inner, MaskEvent::deleted, removed.id);
        true
    }

    /// Returns a copy of the user mask with `id`.
    ///
    /// A `None` id is never found.
    #[must_use]
    pub fn get(&self, id: Option<&str>) -> Option<Mask> {
        let id = id?;
        self.inner.read().masks.get(id).cloned()
    }

    /// Returns user masks, newest first, optionally followed by the
    /// resolved built-in catalog.
    ///
    /// Masks with equal `created_at` keep their insertion order. Built-ins
    /// are omitted when the host hides them.
    #[must_use]
    pub fn get_all(&self, include_builtins: bool) -> Vec<Mask> {
        let mut masks: Vec<Mask> = self.inner.read().masks.iter().cloned().collect();
        masks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if include_builtins && !self.host.hide_builtin_masks() {
            let defaults = self.host.current_config();
            masks.extend(self.catalog.resolve_all(&defaults));
        }
        masks
    }

    /// Returns user masks whose name contains `query`, ignoring case.
    ///
    /// Seed conversation content is searched too unless
    /// [`Config::search_context`] is off. A blank query matches everything.
    /// Results are in [`MaskStore::get_all`] order.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Mask> {
        let needle = query.trim().to_lowercase();
        let masks = self.get_all(false);
        if needle.is_empty() {
            return masks;
        }
        masks
            .into_iter()
            .filter(|m| m.matches(&needle, self.config.search_context))
            .collect()
    }

    /// Number of user masks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().masks.len()
    }

    /// Returns true if there are no user masks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().masks.is_empty()
    }

    /// Returns true if a user mask with `id` exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().masks.contains(id)
    }

    /// Time of the last mutation, epoch milliseconds.
    #[must_use]
    pub fn last_update(&self) -> u64 {
        self.inner.read().last_update
    }

    /// Returns the state in its persisted form.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.read();
        Snapshot::new(inner.masks.clone(), inner.last_update)
    }

    /// Writes the current state to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub fn flush(&self) -> CoreResult<()> {
        let inner = self.inner.read();
        self.persist(&inner)
    }

    /// Subscribes to mutation events.
    pub fn subscribe(&self) -> Receiver<MaskEvent> {
        self.feed.subscribe()
    }

    /// The change feed, for cursor polling.
    #[must_use]
    pub fn change_feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// How the state was obtained at open.
    #[must_use]
    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// Number of mutations whose snapshot could not be persisted.
    #[must_use]
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures.load(Ordering::Relaxed)
    }

    /// The store configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The built-in catalog.
    #[must_use]
    pub fn catalog(&self) -> &BuiltinCatalog {
        &self.catalog
    }

    /// Where snapshots are stored.
    #[must_use]
    pub fn describe_backend(&self) -> String {
        self.backend.lock().describe()
    }

    fn default_mask(&self) -> Mask {
        Mask {
            id: MaskId::new(),
            created_at: now_millis(),
            avatar: DEFAULT_MASK_AVATAR.to_string(),
            name: DEFAULT_MASK_NAME.to_string(),
            hide_context: Some(true),
            context: default_context(),
            sync_global_config: Some(true),
            model_config: self.host.current_config(),
            lang: self.host.current_locale(),
            builtin: false,
            plugin: Some(vec![ARTIFACTS_PLUGIN.to_string()]),
            extra: serde_json::Map::new(),
        }
    }

    /// Bumps metadata, persists, and announces a mutation. The caller
    /// holds the write lock.
    fn commit(&self, inner: &mut StoreInner, event: fn(u64, MaskId) -> MaskEvent, id: MaskId) {
        inner.last_update = now_millis().max(inner.last_update);
        inner.sequence += 1;

        if let Err(e) = self.persist(inner) {
            let failures = self.persist_failures.fetch_add(1, Ordering::Relaxed) + 1;
            error!(error = %e, failures, "failed to persist mask snapshot");
        }
        self.feed.emit(event(inner.sequence, id));
    }

    fn persist(&self, inner: &StoreInner) -> CoreResult<()> {
        let bytes = snapshot::encode(&inner.masks, inner.last_update, self.config.pretty_json)?;
        self.backend.lock().save(&bytes)?;
        Ok(())
    }
}

impl std::fmt::Debug for MaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskStore")
            .field("config", &self.config)
            .field("masks", &self.len())
            .field("builtins", &self.catalog.len())
            .field("load_outcome", &self.load_outcome)
            .finish_non_exhaustive()
    }
}

/// Configures and opens a [`MaskStore`].
pub struct MaskStoreBuilder {
    config: Config,
    path: Option<PathBuf>,
    backend: Option<Box<dyn SnapshotBackend>>,
    host: Arc<dyn HostDefaults>,
    catalog: BuiltinCatalog,
    migrations: MigrationManager,
}

impl MaskStoreBuilder {
    /// Creates a builder with default configuration, stock host defaults,
    /// an empty catalog and the built-in migrations.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            path: None,
            backend: None,
            host: Arc::new(StaticDefaults::default()),
            catalog: BuiltinCatalog::empty(),
            migrations: MigrationManager::with_builtin_migrations(),
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Stores snapshots in the file at `path` (or in `path` if it is a
    /// directory). Replaces any backend set earlier.
    #[must_use]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self.backend = None;
        self
    }

    /// Stores snapshots in `backend`. Replaces any path set earlier.
    #[must_use]
    pub fn backend(mut self, backend: impl SnapshotBackend + 'static) -> Self {
        self.backend = Some(Box::new(backend));
        self.path = None;
        self
    }

    /// Sets the host defaults.
    #[must_use]
    pub fn host(mut self, host: impl HostDefaults + 'static) -> Self {
        self.host = Arc::new(host);
        self
    }

    /// Sets shared host defaults.
    #[must_use]
    pub fn shared_host(mut self, host: Arc<dyn HostDefaults>) -> Self {
        self.host = host;
        self
    }

    /// Sets the built-in catalog.
    #[must_use]
    pub fn catalog(mut self, catalog: BuiltinCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replaces the migration registry.
    #[must_use]
    pub fn migrations(mut self, migrations: MigrationManager) -> Self {
        self.migrations = migrations;
        self
    }

    /// Opens the store, loading and migrating the persisted snapshot.
    ///
    /// A snapshot that needed migration is written back in the current
    /// format. One that could not be read at all is left in place and the
    /// store starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the migration registry is invalid or the backend
    /// cannot be opened or read.
    pub fn open(self) -> CoreResult<MaskStore> {
        self.migrations.validate()?;

        let backend: Box<dyn SnapshotBackend> = match (self.backend, &self.path) {
            (Some(backend), _) => backend,
            (None, Some(path)) => {
                let file = if path.is_dir() {
                    path.join(self.config.file_name())
                } else {
                    path.clone()
                };
                Box::new(FileBackend::open_with_create_dirs(&file)?)
            }
            (None, None) => Box::new(InMemoryBackend::new()),
        };

        let (masks, last_update, load_outcome) = load(&*backend, &self.migrations)?;
        let needs_write_back = matches!(load_outcome, LoadOutcome::Loaded { applied, .. } if applied > 0);

        let store = MaskStore {
            feed: ChangeFeed::with_max_history(self.config.change_feed_history),
            config: self.config,
            inner: RwLock::new(StoreInner {
                masks,
                last_update,
                sequence: 0,
            }),
            backend: Mutex::new(backend),
            host: self.host,
            catalog: self.catalog,
            persist_failures: AtomicU64::new(0),
            load_outcome,
        };

        if needs_write_back {
            if let Err(e) = store.flush() {
                store.persist_failures.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "failed to write back migrated snapshot");
            }
        }

        info!(
            backend = %store.describe_backend(),
            masks = store.len(),
            builtins = store.catalog.len(),
            outcome = ?store.load_outcome,
            "mask store opened"
        );
        Ok(store)
    }
}

impl Default for MaskStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MaskStoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskStoreBuilder")
            .field("config", &self.config)
            .field("path", &self.path)
            .field("catalog", &self.catalog.len())
            .field("migrations", &self.migrations)
            .finish_non_exhaustive()
    }
}

fn load(
    backend: &dyn SnapshotBackend,
    migrations: &MigrationManager,
) -> CoreResult<(MaskMap, u64, LoadOutcome)> {
    let bytes = match backend.load() {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Ok((MaskMap::new(), 0, LoadOutcome::Fresh)),
        Err(StorageError::Corrupted(message)) => return Ok(recovered(CoreError::corrupt_state(message))),
        Err(e) => return Err(e.into()),
    };

    let decoded = RawSnapshot::decode(&bytes).and_then(|raw| {
        let run = migrations.migrate(&raw.state, raw.version)?;
        Ok((raw.last_update, run))
    });

    match decoded {
        Ok((last_update, run)) => {
            let outcome = LoadOutcome::Loaded {
                from: run.from_version,
                applied: run.applied_count,
            };
            Ok((run.state.masks, last_update, outcome))
        }
        Err(e) if e.is_corruption() => Ok(recovered(e)),
        Err(e) => Err(e),
    }
}

fn recovered(error: CoreError) -> (MaskMap, u64, LoadOutcome) {
    warn!(error = %error, "persisted mask snapshot is unusable; starting empty");
    (
        MaskMap::new(),
        0,
        LoadOutcome::Recovered {
            error: error.to_string(),
        },
    )
}

/// Current time in epoch milliseconds.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
