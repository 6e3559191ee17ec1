//! Storage driver errors

use thiserror::Error;

/// Result type for driver calls
pub type StorageResult<T> = Result<T, StorageError>;

/// Driver-reported failures.
///
/// The transaction coalescer catches these and rolls back; they never
/// propagate past `process`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Record addressed by the write does not exist
    #[error("Record not found: {model_id}/{record_id}")]
    RecordNotFound {
        model_id: String,
        record_id: String,
    },

    /// Driver-specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}
