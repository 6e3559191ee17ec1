//! Commit/rollback extension points
//!
//! Hooks observe the outcome of a processed transaction. They receive the
//! flattened operation list and run exactly once per `process` call;
//! compensating-write strategies plug in here without touching the
//! grouping/flattening algorithm.

use super::operation::RecordUpdate;
use super::transaction::TransactionMeta;

/// Observes transaction outcomes.
pub trait TransactionHooks: Send + Sync {
    /// Called once after the storage call was acknowledged (or after an
    /// empty transaction short-circuited).
    fn on_commit(&self, applied: &[RecordUpdate], meta: &TransactionMeta) {
        let _ = (applied, meta);
    }

    /// Called once after a storage failure; `attempted` is the flattened
    /// list that was not applied.
    fn on_rollback(&self, attempted: &[RecordUpdate], meta: &TransactionMeta) {
        let _ = (attempted, meta);
    }
}

/// The default hooks: observe nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl TransactionHooks for NoopHooks {}
