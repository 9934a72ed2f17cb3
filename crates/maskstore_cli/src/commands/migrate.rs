//! Migrate command.

use super::StoreOptions;
use maskstore_core::{LoadOutcome, MigrationManager, RawSnapshot, CURRENT_VERSION};
use tracing::info;

/// Upgrades the snapshot file to [`CURRENT_VERSION`].
///
/// With `dry_run`, lists the steps that would run and writes nothing.
pub fn run(options: &StoreOptions, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    info!("Checking migrations for {}", options.snapshot_path().display());

    let raw = RawSnapshot::decode(&options.read_snapshot()?)?;
    let manager = MigrationManager::with_builtin_migrations();
    let pending = manager.pending(raw.version);

    println!("Stored version: {}", raw.version);
    println!("Current version: {CURRENT_VERSION}");

    if pending.is_empty() {
        println!("✓ No pending migrations to run.");
        return Ok(());
    }

    if dry_run {
        println!("Dry run - would apply {} migration(s):", pending.len());
        for migration in &pending {
            println!("  v{}: {}", migration.version, migration.name);
            if let Some(desc) = &migration.description {
                println!("      {desc}");
            }
        }
        return Ok(());
    }

    // A snapshot that cannot be migrated is reported and left untouched.
    if let Err(e) = manager.migrate(&raw.state, raw.version) {
        return Err(format!("snapshot could not be migrated: {e}").into());
    }

    // Opening migrates and writes the snapshot back.
    let store = options.open()?;
    match store.load_outcome() {
        LoadOutcome::Loaded { from, applied } => {
            if store.persist_failures() > 0 {
                return Err("migrated snapshot could not be written back".into());
            }
            println!("✓ Migrated from v{from} ({applied} step(s)), {} mask(s).", store.len());
        }
        LoadOutcome::Recovered { error } => {
            return Err(format!("snapshot could not be migrated: {error}").into());
        }
        LoadOutcome::Fresh => println!("Nothing to migrate."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;

    fn legacy_store() -> (tempfile::TempDir, StoreOptions) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mask-store.json");
        let legacy = json!({
            "state": { "masks": { "7": { "id": 7, "name": "Legacy" } } },
            "version": 2
        });
        fs::write(&file, legacy.to_string()).unwrap();
        let options = StoreOptions {
            path: Some(file),
            ..StoreOptions::default()
        };
        (dir, options)
    }

    fn stored_version(options: &StoreOptions) -> Value {
        let value: Value =
            serde_json::from_slice(&fs::read(options.snapshot_path()).unwrap()).unwrap();
        value["version"].clone()
    }

    #[test]
    fn dry_run_writes_nothing() {
        let (_dir, options) = legacy_store();
        run(&options, true).unwrap();
        assert_eq!(stored_version(&options), json!(2));
    }

    #[test]
    fn failed_migration_keeps_original_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mask-store.json");
        let broken = r#"{"masks":{"1":{"id":1,"name":"Precious","createdAt":"yesterday"}},"version":2}"#;
        fs::write(&file, broken).unwrap();
        let options = StoreOptions {
            path: Some(file.clone()),
            ..StoreOptions::default()
        };

        let err = run(&options, false).unwrap_err();
        assert!(err.to_string().contains("could not be migrated"));
        assert_eq!(fs::read_to_string(&file).unwrap(), broken);
    }

    #[test]
    fn migrate_rewrites_current_version() {
        let (_dir, options) = legacy_store();
        run(&options, false).unwrap();
        assert_eq!(stored_version(&options), json!(3.1));

        let store = options.open().unwrap();
        assert_eq!(store.get_all(false)[0].name, "Legacy");
    }
}
