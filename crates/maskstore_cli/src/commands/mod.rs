//! CLI command implementations.

pub mod create;
pub mod delete;
pub mod inspect;
pub mod list;
pub mod migrate;
pub mod search;
pub mod update;

use clap::ValueEnum;
use maskstore_core::{
    BuiltinCatalog, Config, Mask, MaskStore, MaskStoreBuilder, StaticDefaults,
};
use maskstore_storage::{FileBackend, InMemoryBackend, SnapshotBackend, StorageError};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// No user mask has the given id.
    #[error("no mask with id {0:?}")]
    MaskNotFound(String),

    /// The snapshot file does not exist.
    #[error("no mask store found at {0}")]
    NoSnapshot(String),

    /// The built-in catalog file could not be read.
    #[error("cannot read catalog {path}: {source}")]
    Catalog {
        /// Catalog path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Snapshot file or directory; defaults to the working directory.
    pub path: Option<PathBuf>,
    /// Built-in catalog file.
    pub catalog: Option<PathBuf>,
    /// Host locale.
    pub lang: Option<String>,
    /// Hide built-ins from listings.
    pub hide_builtins: bool,
    /// Pretty-print snapshots.
    pub pretty: bool,
}

impl StoreOptions {
    fn config(&self) -> Config {
        Config::new().pretty_json(self.pretty)
    }

    /// Resolves the snapshot file path.
    pub fn snapshot_path(&self) -> PathBuf {
        let base = self.path.clone().unwrap_or_else(|| PathBuf::from("."));
        if base.is_dir() {
            base.join(self.config().file_name())
        } else {
            base
        }
    }

    /// Reads the raw snapshot bytes without opening a store.
    ///
    /// An empty snapshot file reads as no bytes; decoding reports it.
    pub fn read_snapshot(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let path = self.snapshot_path();
        self.load_snapshot()?
            .ok_or_else(|| CliError::NoSnapshot(path.display().to_string()).into())
    }

    fn load_snapshot(&self) -> Result<Option<Vec<u8>>, Box<dyn std::error::Error>> {
        match FileBackend::open(&self.snapshot_path())?.load() {
            Ok(bytes) => Ok(bytes),
            Err(StorageError::Corrupted(_)) => Ok(Some(Vec::new())),
            Err(e) => Err(e.into()),
        }
    }

    fn catalog(&self) -> Result<BuiltinCatalog, Box<dyn std::error::Error>> {
        let Some(path) = &self.catalog else {
            return Ok(BuiltinCatalog::empty());
        };
        let bytes = fs::read(path).map_err(|source| CliError::Catalog {
            path: path.display().to_string(),
            source,
        })?;
        Ok(BuiltinCatalog::from_json(&bytes)?)
    }

    fn builder(&self) -> Result<MaskStoreBuilder, Box<dyn std::error::Error>> {
        let mut host = StaticDefaults::new().hide_builtins(self.hide_builtins);
        if let Some(lang) = &self.lang {
            host = host.locale(lang.as_str());
        }

        Ok(MaskStore::builder()
            .config(self.config())
            .host(host)
            .catalog(self.catalog()?))
    }

    /// Opens the store these options describe.
    ///
    /// A snapshot that needs migration is rewritten on open.
    pub fn open(&self) -> Result<MaskStore, Box<dyn std::error::Error>> {
        let store = self.builder()?.path(self.snapshot_path()).open()?;
        Ok(store)
    }

    /// Opens the store over an in-memory copy of the snapshot.
    ///
    /// Masks are migrated as usual, but the file is never written.
    pub fn open_read_only(&self) -> Result<MaskStore, Box<dyn std::error::Error>> {
        let backend = match self.load_snapshot()? {
            Some(bytes) => InMemoryBackend::with_data(bytes),
            None => InMemoryBackend::new(),
        };
        let store = self.builder()?.backend(backend).open()?;
        Ok(store)
    }
}

/// Prints masks as text or JSON.
pub fn print_masks(masks: &[Mask], format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(masks)?),
        OutputFormat::Text => {
            if masks.is_empty() {
                println!("  No masks.");
            }
            for mask in masks {
                println!("{}", summary_line(mask));
            }
        }
    }
    Ok(())
}

/// One-line description of a mask.
pub fn summary_line(mask: &Mask) -> String {
    let kind = if mask.builtin { "builtin" } else { "user" };
    format!(
        "  {:<32}  {:<7}  {:<5}  {:<14}  {}",
        mask.id.as_str(),
        kind,
        mask.lang.as_str(),
        mask.model_config.model,
        mask.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_path_in_directory_uses_store_key() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions {
            path: Some(dir.path().to_path_buf()),
            ..StoreOptions::default()
        };
        assert_eq!(options.snapshot_path(), dir.path().join("mask-store.json"));
    }

    #[test]
    fn open_applies_host_options() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("builtins.json");
        fs::write(
            &catalog,
            r#"[{ "id": "b1", "avatar": "1f916", "name": "Bot", "modelConfig": { "temperature": 0.9 } }]"#,
        )
        .unwrap();

        let options = StoreOptions {
            path: Some(dir.path().join("store.json")),
            catalog: Some(catalog),
            lang: Some("de".to_string()),
            ..StoreOptions::default()
        };
        let store = options.open().unwrap();

        assert_eq!(store.create(None).lang.as_str(), "de");
        assert_eq!(store.get_all(true).len(), 2);
    }

    #[test]
    fn read_only_open_leaves_legacy_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");
        let legacy = r#"{"masks":{"3":{"id":3,"name":"Kept"}},"version":2}"#;
        fs::write(&file, legacy).unwrap();
        let options = StoreOptions {
            path: Some(file.clone()),
            ..StoreOptions::default()
        };

        let store = options.open_read_only().unwrap();
        assert_eq!(store.get_all(false)[0].name, "Kept");
        assert_eq!(fs::read_to_string(&file).unwrap(), legacy);
    }

    #[test]
    fn read_only_open_without_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions {
            path: Some(dir.path().join("absent.json")),
            ..StoreOptions::default()
        };

        assert!(options.open_read_only().unwrap().is_empty());
        assert!(!dir.path().join("absent.json").exists());
    }

    #[test]
    fn missing_catalog_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions {
            path: Some(dir.path().join("store.json")),
            catalog: Some(dir.path().join("absent.json")),
            ..StoreOptions::default()
        };
        let err = options.open().unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
