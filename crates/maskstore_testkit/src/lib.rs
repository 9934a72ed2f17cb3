//! # MaskStore Testkit
//!
//! Test utilities for MaskStore.
//!
//! This crate provides:
//! - Store fixtures over in-memory and temporary-file backends
//! - A host double whose defaults can be changed mid-test
//! - Property-based test generators using proptest
//! - Snapshot vectors covering every schema version ever written
//! - Concurrent stress helpers
//!
//! ## Usage
//!
//! ```rust
//! use maskstore_testkit::prelude::*;
//!
//! with_temp_store(|store| {
//!     let mask = store.create(None);
//!     assert!(store.contains(mask.id.as_str()));
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
pub use vectors::*;
