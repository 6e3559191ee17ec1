//! Driver trait
//!
//! Two write primitives, mirroring the call shapes the coalescer decides
//! between: one record or one bulk call covering many records and models.

use serde_json::{Map, Value};

use super::errors::StorageResult;
use crate::query::QueryDoc;
use crate::transaction::RecordUpdate;

/// How a single-record write addresses its target.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSelector {
    /// By record id
    Id(String),
    /// By compiled query document
    Query(QueryDoc),
}

impl RecordSelector {
    pub fn id(record_id: impl Into<String>) -> Self {
        RecordSelector::Id(record_id.into())
    }
}

/// The write primitives a storage backend must provide.
///
/// A returned `Ok(true)` acknowledges the write; `Ok(false)` means the
/// backend refused it without an error. The coalescer treats both
/// `Ok(false)` and `Err` as failure.
pub trait StorageDriver: Send + Sync {
    /// Apply field updates to one record.
    fn update_one(
        &self,
        model_id: &str,
        selector: &RecordSelector,
        updates: &Map<String, Value>,
    ) -> StorageResult<bool>;

    /// Apply many record updates, possibly spanning models, in one call.
    fn update_bulk(&self, updates: &[RecordUpdate]) -> StorageResult<bool>;
}
