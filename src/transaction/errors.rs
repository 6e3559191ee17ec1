//! Transaction errors
//!
//! Only caller mistakes surface as errors here. Storage failures during
//! dispatch never do; they become a RolledBack receipt.

use thiserror::Error;

/// Result type for transaction submission
pub type TransactionResult<T> = Result<T, TransactionError>;

/// Transaction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// Operation count exceeds the configured limit
    #[error("Transaction has {count} operations, limit is {limit}")]
    TooManyOperations { count: usize, limit: usize },
}
