//! Snapshot schema migration.
//!
//! This module upgrades persisted mask state from any schema version this
//! store has ever written to the current one.
//!
//! ## Design Philosophy
//!
//! Migrations in MaskStore are:
//! - **Ordered**: steps are keyed by [`SchemaVersion`] and run in increasing order
//! - **Gated**: a step runs only if the stored version is older than the step
//! - **Copy-on-write**: the engine works on a deep clone, never on the caller's value
//! - **Validated**: the migrated value must decode into a [`MaskState`]
//!
//! Steps operate on raw JSON because old snapshots may not fit the current
//! types (pre-3.0 ids were numbers, for example).
//!
//! ## Usage
//!
//! ```rust
//! use maskstore_core::{MigrationManager, SchemaVersion};
//! use serde_json::json;
//!
//! let raw = json!({ "masks": { "1": { "id": 1, "name": "Old" } } });
//! let manager = MigrationManager::default();
//! let run = manager.migrate(&raw, SchemaVersion::new(2, 0)).unwrap();
//!
//! assert_eq!(run.applied_count, 2);
//! let mask = run.state.masks.iter().next().unwrap();
//! assert_eq!(mask.name, "Old");
//! assert!(run.state.masks.contains(mask.id.as_str()));
//! ```

use crate::error::{CoreError, CoreResult};
use crate::mask::MaskId;
use crate::snapshot::MaskState;
use crate::version::{SchemaVersion, CURRENT_VERSION};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::{debug, info, warn};

/// Information about a registered migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationInfo {
    /// Version this step upgrades to.
    pub version: SchemaVersion,
    /// Human-readable name.
    pub name: String,
    /// Description of what this migration does.
    pub description: Option<String>,
}

/// Result of running a single migration.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    /// The migration version that was run.
    pub version: SchemaVersion,
    /// The migration name.
    pub name: String,
    /// Operations the step reported.
    pub operations: Vec<String>,
}

/// Result of migrating one snapshot.
#[derive(Debug, Clone)]
pub struct MigrationRunResult {
    /// The migrated, typed state.
    pub state: MaskState,
    /// Version the snapshot was stored with.
    pub from_version: SchemaVersion,
    /// Version the state now conforms to.
    pub final_version: SchemaVersion,
    /// Steps that ran, in order.
    pub migrations: Vec<MigrationResult>,
    /// Number of steps applied.
    pub applied_count: usize,
}

/// Context passed to migration steps.
#[derive(Debug)]
pub struct MigrationContext {
    /// Version the snapshot was stored with.
    pub stored_version: SchemaVersion,
    /// Operations performed during this step (for logging/debugging).
    pub operations: Vec<String>,
}

impl MigrationContext {
    /// Creates a new migration context.
    #[must_use]
    pub fn new(stored_version: SchemaVersion) -> Self {
        Self {
            stored_version,
            operations: Vec::new(),
        }
    }

    /// Records an operation.
    pub fn record(&mut self, description: impl Into<String>) {
        self.operations.push(description.into());
    }
}

/// Trait for defining migrations.
pub trait Migration: Send + Sync {
    /// Returns the version this step upgrades to.
    ///
    /// The step runs for every snapshot stored with an older version.
    fn version(&self) -> SchemaVersion;

    /// Returns the name of this migration.
    fn name(&self) -> &str;

    /// Returns an optional description.
    fn description(&self) -> Option<&str> {
        None
    }

    /// Transforms `state` (the raw `{ "masks": ... }` object) in place.
    ///
    /// Must be deterministic apart from identifier generation.
    fn up(&self, state: &mut Value, ctx: &mut MigrationContext) -> CoreResult<()>;
}

/// Returns the raw `masks` object, or `None` if the snapshot has none.
fn masks_mut(state: &mut Value) -> CoreResult<Option<&mut Map<String, Value>>> {
    match state.get_mut("masks") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(masks)) => Ok(Some(masks)),
        Some(other) => Err(CoreError::corrupt_state(format!(
            "`masks` must be an object, found {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn not_an_object(key: &str, mask: &Value) -> CoreError {
    CoreError::corrupt_state(format!(
        "mask {key:?} is {}, expected an object",
        json_kind(mask)
    ))
}

/// 3.0: replace every mask's `id` value with a freshly generated one.
///
/// Keys are left alone; 3.1 realigns them.
#[derive(Debug, Default)]
pub struct RekeyMaskIds;

impl Migration for RekeyMaskIds {
    fn version(&self) -> SchemaVersion {
        SchemaVersion::new(3, 0)
    }

    fn name(&self) -> &str {
        "rekey_mask_ids"
    }

    fn description(&self) -> Option<&str> {
        Some("assign fresh string identifiers to every mask")
    }

    fn up(&self, state: &mut Value, ctx: &mut MigrationContext) -> CoreResult<()> {
        let Some(masks) = masks_mut(state)? else {
            return Ok(());
        };

        for (key, mask) in masks.iter_mut() {
            match mask {
                Value::Object(fields) => {
                    fields.insert("id".to_string(), Value::String(MaskId::new().into_string()));
                }
                other => return Err(not_an_object(key, other)),
            }
        }

        ctx.record(format!("assigned fresh ids to {} masks", masks.len()));
        Ok(())
    }
}

/// 3.1: rebuild the mapping so every key equals its mask's `id`.
///
/// A mask without a string id gets a fresh one. If two masks claim the
/// same id, the later one gets a fresh id instead of shadowing the earlier.
#[derive(Debug, Default)]
pub struct AlignMaskKeys;

impl Migration for AlignMaskKeys {
    fn version(&self) -> SchemaVersion {
        SchemaVersion::new(3, 1)
    }

    fn name(&self) -> &str {
        "align_mask_keys"
    }

    fn description(&self) -> Option<&str> {
        Some("key every mask by its own id")
    }

    fn up(&self, state: &mut Value, ctx: &mut MigrationContext) -> CoreResult<()> {
        let Some(masks) = masks_mut(state)? else {
            return Ok(());
        };

        let old = std::mem::take(masks);
        let mut moved = 0usize;
        let mut reassigned = 0usize;

        for (key, mut mask) in old {
            let fields = match &mut mask {
                Value::Object(fields) => fields,
                other => return Err(not_an_object(&key, other)),
            };

            let mut id = match fields.get("id") {
                Some(Value::String(id)) => id.clone(),
                _ => {
                    reassigned += 1;
                    MaskId::new().into_string()
                }
            };
            if masks.contains_key(&id) {
                reassigned += 1;
                id = MaskId::new().into_string();
            }
            if id != key {
                moved += 1;
            }

            fields.insert("id".to_string(), Value::String(id.clone()));
            masks.insert(id, mask);
        }

        ctx.record(format!("re-keyed {moved} masks"));
        if reassigned > 0 {
            ctx.record(format!("assigned fresh ids to {reassigned} masks"));
        }
        Ok(())
    }
}

/// Manages snapshot migrations.
pub struct MigrationManager {
    /// Registered migrations, keyed by version.
    migrations: BTreeMap<SchemaVersion, Box<dyn Migration>>,
}

impl MigrationManager {
    /// Creates a manager with no steps registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            migrations: BTreeMap::new(),
        }
    }

    /// Creates a manager with every step this build ships.
    #[must_use]
    pub fn with_builtin_migrations() -> Self {
        let mut migrations: BTreeMap<SchemaVersion, Box<dyn Migration>> = BTreeMap::new();
        migrations.insert(RekeyMaskIds.version(), Box::new(RekeyMaskIds));
        migrations.insert(AlignMaskKeys.version(), Box::new(AlignMaskKeys));
        Self { migrations }
    }

    /// Registers a migration.
    ///
    /// Returns an error if a migration with the same version already exists.
    pub fn register(&mut self, migration: Box<dyn Migration>) -> CoreResult<()> {
        let version = migration.version();
        if self.migrations.contains_key(&version) {
            return Err(CoreError::migration_failed(format!(
                "migration version {version} already registered"
            )));
        }
        self.migrations.insert(version, migration);
        Ok(())
    }

    /// Returns list of registered migrations.
    #[must_use]
    pub fn list(&self) -> Vec<MigrationInfo> {
        self.migrations.values().map(|m| info_of(m.as_ref())).collect()
    }

    /// Returns the migrations that would run for a snapshot stored at `stored`.
    #[must_use]
    pub fn pending(&self, stored: SchemaVersion) -> Vec<MigrationInfo> {
        self.steps_after(stored)
            .map(|(_, m)| info_of(m))
            .collect()
    }

    /// Validates that no step targets a version newer than this build writes.
    pub fn validate(&self) -> CoreResult<()> {
        for version in self.migrations.keys() {
            if *version > CURRENT_VERSION {
                return Err(CoreError::migration_failed(format!(
                    "migration {version} is newer than current version {CURRENT_VERSION}"
                )));
            }
            if *version == SchemaVersion::INITIAL {
                return Err(CoreError::migration_failed(
                    "migration version must be greater than 0",
                ));
            }
        }
        Ok(())
    }

    /// Migrates `raw` (stored at version `stored`) to the current schema.
    ///
    /// `raw` is never modified; every step works on a deep clone. Applying
    /// this to already-current state runs no step.
    ///
    /// # Errors
    ///
    /// Returns `CorruptState` if the state is not an object, a step fails,
    /// or the result does not decode into a [`MaskState`].
    pub fn migrate(&self, raw: &Value, stored: SchemaVersion) -> CoreResult<MigrationRunResult> {
        let mut state = raw.clone();
        if !state.is_object() {
            return Err(CoreError::corrupt_state(format!(
                "state is {}, expected an object",
                json_kind(&state)
            )));
        }

        if stored > CURRENT_VERSION {
            warn!(
                stored = %stored,
                current = %CURRENT_VERSION,
                "snapshot is newer than this build; loading without migration"
            );
        }

        let mut results = Vec::new();
        for (version, migration) in self.steps_after(stored) {
            let mut ctx = MigrationContext::new(stored);
            migration.up(&mut state, &mut ctx).map_err(|e| match e {
                CoreError::CorruptState { .. } => e,
                other => CoreError::corrupt_state(format!(
                    "migration {version} ({}) failed: {other}",
                    migration.name()
                )),
            })?;

            for op in &ctx.operations {
                debug!(version = %version, migration = migration.name(), "{op}");
            }
            results.push(MigrationResult {
                version: *version,
                name: migration.name().to_string(),
                operations: ctx.operations,
            });
        }

        if let Value::Object(fields) = &mut state {
            if fields.get("masks").is_some_and(Value::is_null) {
                fields.remove("masks");
            }
        }
        let state: MaskState = serde_json::from_value(state)
            .map_err(|e| CoreError::corrupt_state(format!("migrated state is invalid: {e}")))?;

        if !results.is_empty() {
            info!(
                from = %stored,
                to = %CURRENT_VERSION,
                steps = results.len(),
                masks = state.masks.len(),
                "migrated mask snapshot"
            );
        }

        Ok(MigrationRunResult {
            state,
            from_version: stored,
            final_version: CURRENT_VERSION.max(stored),
            applied_count: results.len(),
            migrations: results,
        })
    }

    fn steps_after(
        &self,
        stored: SchemaVersion,
    ) -> impl Iterator<Item = (&SchemaVersion, &dyn Migration)> {
        self.migrations
            .range((Bound::Excluded(stored), Bound::Unbounded))
            .map(|(version, m)| (version, m.as_ref()))
    }
}

fn info_of(m: &dyn Migration) -> MigrationInfo {
    MigrationInfo {
        version: m.version(),
        name: m.name().to_string(),
        description: m.description().map(String::from),
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::with_builtin_migrations()
    }
}

impl std::fmt::Debug for MigrationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationManager")
            .field("versions", &self.migrations.keys().collect::<Vec<_>>())
            .finish()
    }
}
