//! # MaskStore Storage
//!
//! Snapshot storage backends for MaskStore.
//!
//! This crate provides the lowest-level persistence abstraction for MaskStore.
//! Backends hold **one opaque snapshot blob** - they do not interpret the
//! bytes they store. Encoding, versioning and migration live in
//! `maskstore_core`.
//!
//! ## Design Principles
//!
//! - Backends are simple blob stores (load, save)
//! - A `save` replaces the previous snapshot as a whole
//! - Must be `Send + Sync` so a store can be shared across threads
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - For persistent storage with atomic replacement
//!
//! ## Example
//!
//! ```rust
//! use maskstore_storage::{SnapshotBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! assert!(backend.load().unwrap().is_none());
//! backend.save(br#"{"masks":{}}"#).unwrap();
//! assert_eq!(backend.load().unwrap().unwrap(), br#"{"masks":{}}"#);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::SnapshotBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
