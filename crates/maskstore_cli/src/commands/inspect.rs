//! Inspect command implementation.

use super::{OutputFormat, StoreOptions};
use maskstore_core::{LoadOutcome, RawSnapshot};
use serde::Serialize;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Snapshot path.
    pub path: String,
    /// Snapshot file size in bytes.
    pub file_size: u64,
    /// Schema version the file was written with, if readable.
    pub stored_version: Option<String>,
    /// Last mutation time, epoch milliseconds.
    pub last_update: u64,
    /// Number of user masks after loading.
    pub mask_count: usize,
    /// Number of built-in masks in the catalog.
    pub builtin_count: usize,
    /// Migration steps that ran while loading.
    pub migrations_applied: usize,
    /// Why the snapshot was unusable, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered_from: Option<String>,
}

/// Runs the inspect command.
pub fn run(options: &StoreOptions, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let path = options.snapshot_path();
    let bytes = options.read_snapshot()?;
    let stored_version = RawSnapshot::decode(&bytes)
        .ok()
        .map(|raw| raw.version.to_string());

    let store = options.open_read_only()?;
    let (migrations_applied, recovered_from) = match store.load_outcome() {
        LoadOutcome::Fresh => (0, None),
        LoadOutcome::Loaded { applied, .. } => (*applied, None),
        LoadOutcome::Recovered { error } => (0, Some(error.clone())),
    };

    let result = InspectResult {
        path: path.display().to_string(),
        file_size: bytes.len() as u64,
        stored_version,
        last_update: store.last_update(),
        mask_count: store.len(),
        builtin_count: store.catalog().len(),
        migrations_applied,
        recovered_from,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_text_output(&result),
    }
    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("Mask Store Inspection");
    println!("=====================");
    println!("Path: {}", result.path);
    println!("File size: {} bytes", result.file_size);
    println!(
        "Stored version: {}",
        result.stored_version.as_deref().unwrap_or("unreadable")
    );
    println!("Last update: {}", result.last_update);
    println!();
    println!("Masks: {}", result.mask_count);
    println!("Built-ins: {}", result.builtin_count);
    println!("Migrations applied on load: {}", result.migrations_applied);
    if let Some(error) = &result.recovered_from {
        println!();
        println!("Snapshot unusable, store opened empty: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspect_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions {
            path: Some(dir.path().join("absent.json")),
            ..StoreOptions::default()
        };
        let err = run(&options, OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("no mask store"));
    }

    #[test]
    fn inspect_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions {
            path: Some(dir.path().to_path_buf()),
            ..StoreOptions::default()
        };
        options.open().unwrap().create(None);
        run(&options, OutputFormat::Json).unwrap();
    }

    #[test]
    fn inspect_does_not_rewrite_legacy_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mask-store.json");
        let legacy = r#"{"state":{"masks":{"1":{"id":1,"name":"Old"}}},"version":2}"#;
        std::fs::write(&file, legacy).unwrap();
        let options = StoreOptions {
            path: Some(file.clone()),
            ..StoreOptions::default()
        };

        run(&options, OutputFormat::Text).unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), legacy);
    }
}
