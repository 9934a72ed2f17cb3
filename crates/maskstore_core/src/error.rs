//! Error types for MaskStore core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in MaskStore core operations.
///
/// Missing masks are never an error: operations on an absent id are
/// silent no-ops.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] maskstore_storage::StorageError),

    /// JSON encoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persisted payload could not be parsed or migrated.
    #[error("corrupt state: {message}")]
    CorruptState {
        /// Description of the corruption.
        message: String,
    },

    /// Schema version is not a valid decimal version.
    #[error("invalid schema version: {message}")]
    InvalidVersion {
        /// Description of the problem.
        message: String,
    },

    /// Migration registration or execution failed.
    #[error("migration failed: {message}")]
    MigrationFailed {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Creates a corrupt state error.
    pub fn corrupt_state(message: impl Into<String>) -> Self {
        Self::CorruptState {
            message: message.into(),
        }
    }

    /// Creates an invalid version error.
    pub fn invalid_version(message: impl Into<String>) -> Self {
        Self::InvalidVersion {
            message: message.into(),
        }
    }

    /// Creates a migration failed error.
    pub fn migration_failed(message: impl Into<String>) -> Self {
        Self::MigrationFailed {
            message: message.into(),
        }
    }

    /// Returns true if this error means the persisted payload is unusable.
    ///
    /// The store recovers from these by starting from an empty state.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::CorruptState { .. } | Self::InvalidVersion { .. } | Self::Json(_)
        )
    }
}
