//! In-memory reference driver
//!
//! Stores records as JSON objects keyed by (model, record). Updates merge
//! per field into the existing record. Used by the test suites and as the
//! executable description of driver update semantics.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Map, Value};

use super::driver::{RecordSelector, StorageDriver};
use super::errors::{StorageError, StorageResult};
use crate::transaction::RecordUpdate;

/// In-memory record store.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    records: Mutex<HashMap<(String, String), Map<String, Value>>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record.
    pub fn insert(&self, model_id: impl Into<String>, record_id: impl Into<String>, body: Map<String, Value>) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert((model_id.into(), record_id.into()), body);
    }

    /// Read a record back.
    pub fn get(&self, model_id: &str, record_id: &str) -> Option<Map<String, Value>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .get(&(model_id.to_string(), record_id.to_string()))
            .cloned()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn apply(
        records: &mut HashMap<(String, String), Map<String, Value>>,
        model_id: &str,
        record_id: &str,
        updates: &Map<String, Value>,
    ) -> StorageResult<()> {
        let record = records
            .get_mut(&(model_id.to_string(), record_id.to_string()))
            .ok_or_else(|| StorageError::RecordNotFound {
                model_id: model_id.to_string(),
                record_id: record_id.to_string(),
            })?;

        for (key, value) in updates {
            record.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

impl StorageDriver for MemoryDriver {
    fn update_one(
        &self,
        model_id: &str,
        selector: &RecordSelector,
        updates: &Map<String, Value>,
    ) -> StorageResult<bool> {
        let record_id = match selector {
            RecordSelector::Id(record_id) => record_id,
            // Query addressing needs an executor; this driver only resolves ids
            RecordSelector::Query(_) => {
                return Err(StorageError::Backend(
                    "MemoryDriver resolves id selectors only".to_string(),
                ))
            }
        };

        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Self::apply(&mut records, model_id, record_id, updates)?;
        Ok(true)
    }

    fn update_bulk(&self, updates: &[RecordUpdate]) -> StorageResult<bool> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        for update in updates {
            Self::apply(&mut records, &update.model_id, &update.record_id, &update.updates)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_update_one_merges_fields() {
        let driver = MemoryDriver::new();
        driver.insert("task", "r1", object(json!({"status": "open", "title": "T"})));

        let acked = driver
            .update_one("task", &RecordSelector::id("r1"), &object(json!({"status": "done"})))
            .unwrap();

        assert!(acked);
        assert_eq!(
            driver.get("task", "r1").unwrap(),
            object(json!({"status": "done", "title": "T"}))
        );
    }

    #[test]
    fn test_update_one_missing_record_fails() {
        let driver = MemoryDriver::new();
        let result =
            driver.update_one("task", &RecordSelector::id("ghost"), &object(json!({"a": 1})));

        assert_eq!(
            result,
            Err(StorageError::RecordNotFound {
                model_id: "task".to_string(),
                record_id: "ghost".to_string(),
            })
        );
    }

    #[test]
    fn test_update_bulk_spans_models() {
        let driver = MemoryDriver::new();
        driver.insert("task", "r1", object(json!({"a": 1})));
        driver.insert("user", "u1", object(json!({"b": 2})));

        let updates = vec![
            RecordUpdate::new("task", "r1", object(json!({"a": 10}))),
            RecordUpdate::new("user", "u1", object(json!({"b": 20}))),
        ];
        assert!(driver.update_bulk(&updates).unwrap());

        assert_eq!(driver.get("task", "r1").unwrap(), object(json!({"a": 10})));
        assert_eq!(driver.get("user", "u1").unwrap(), object(json!({"b": 20})));
    }
}
