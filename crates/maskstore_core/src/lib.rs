//! # MaskStore Core
//!
//! Persisted store of chat "masks": named bundles of a seed conversation,
//! model parameters and display metadata.
//!
//! This crate provides:
//! - [`MaskStore`], the repository that owns user masks and persists them
//!   as one JSON snapshot after every mutation
//! - Schema-versioned migration of snapshots written by older builds
//! - Merge-on-read of a host-supplied [`BuiltinCatalog`] over the host's
//!   current default model config
//! - A [`ChangeFeed`] of mutation events
//!
//! ## Example
//!
//! ```rust
//! use maskstore_core::{MaskDraft, MaskStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MaskStore::open_in_memory()?;
//! let mask = store.create(Some(MaskDraft::new().name("Editor")));
//!
//! assert_eq!(store.get_all(false)[0].id, mask.id);
//! assert_eq!(store.search("edit").len(), 1);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod change_feed;
mod config;
mod error;
mod host;
mod mask;
mod migration;
mod snapshot;
mod store;
mod version;

pub use change_feed::{ChangeFeed, MaskEvent, MaskEventKind};
pub use config::{Config, DEFAULT_CHANGE_FEED_HISTORY, DEFAULT_STORE_KEY};
pub use error::{CoreError, CoreResult};
pub use host::{BuiltinCatalog, BuiltinMask, HostDefaults, StaticDefaults};
pub use mask::{
    default_context, ChatMessage, Lang, Mask, MaskDraft, MaskId, MaskMap, ModelConfig,
    ModelConfigOverrides, Role, ARTIFACTS_PLUGIN, DEFAULT_MASK_AVATAR, DEFAULT_MASK_NAME,
};
pub use migration::{
    AlignMaskKeys, Migration, MigrationContext, MigrationInfo, MigrationManager, MigrationResult,
    MigrationRunResult, RekeyMaskIds,
};
pub use snapshot::{MaskState, RawSnapshot, Snapshot};
pub use store::{LoadOutcome, MaskStore, MaskStoreBuilder};
pub use version::{SchemaVersion, CURRENT_VERSION};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
