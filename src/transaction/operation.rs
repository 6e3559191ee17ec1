//! Operation wire types
//!
//! An Operation is one record's set of field updates within a transaction:
//! created by application logic, consumed exactly once, never mutated after
//! submission.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Actions an operation can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationAction {
    /// Field-level update of an existing record
    Update,
}

impl OperationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationAction::Update => "update",
        }
    }
}

/// One record's field updates as submitted by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub action: OperationAction,

    #[serde(rename = "modelId")]
    pub model_id: String,

    #[serde(rename = "recordId")]
    pub record_id: String,

    pub updates: Map<String, Value>,
}

impl Operation {
    /// Create an update operation.
    pub fn update(
        model_id: impl Into<String>,
        record_id: impl Into<String>,
        updates: Map<String, Value>,
    ) -> Self {
        Self {
            action: OperationAction::Update,
            model_id: model_id.into(),
            record_id: record_id.into(),
            updates,
        }
    }

    /// Create an update operation from a JSON object literal.
    ///
    /// Non-object values yield an operation with no updates; the coalescer
    /// drops empty buckets.
    pub fn update_from_value(
        model_id: impl Into<String>,
        record_id: impl Into<String>,
        updates: Value,
    ) -> Self {
        let updates = match updates {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::update(model_id, record_id, updates)
    }
}

/// The merged field updates for one record, derived during coalescing.
///
/// Keyed by (model, record); the updates map is the union of every
/// operation submitted for that record in the owning transaction, later
/// operations overriding earlier ones on conflicting fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    #[serde(rename = "modelId")]
    pub model_id: String,

    #[serde(rename = "recordId")]
    pub record_id: String,

    pub updates: Map<String, Value>,
}

impl RecordUpdate {
    pub fn new(
        model_id: impl Into<String>,
        record_id: impl Into<String>,
        updates: Map<String, Value>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            record_id: record_id.into(),
            updates,
        }
    }

    /// Absorb another operation's updates; later keys overwrite.
    pub fn merge(&mut self, updates: &Map<String, Value>) {
        for (key, value) in updates {
            self.updates.insert(key.clone(), value.clone());
        }
    }
}
