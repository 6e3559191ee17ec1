//! Transaction Coalescing Tests
//!
//! End-to-end invariants of the write path against the in-memory driver:
//! - Operations merge by (model, record) with last-write-wins per field
//! - One storage call per transaction: single update or one bulk call
//! - Audit stamping only when the transaction carries a user
//! - Empty transactions commit without touching storage
//! - Rolled-back transactions leave records untouched

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use formabase_persist::config::PlatformConfig;
use formabase_persist::context::{Clock, FixedClock};
use formabase_persist::storage::{MemoryDriver, RecordSelector, StorageDriver, StorageResult};
use formabase_persist::transaction::{
    NoopHooks, Operation, RecordUpdate, Transaction, TransactionCoalescer, TransactionState,
};
use serde_json::{json, Map, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap(),
    ))
}

fn seeded_driver() -> MemoryDriver {
    let driver = MemoryDriver::new();
    driver.insert("task", "r1", object(json!({"status": "open", "title": "A"})));
    driver.insert("task", "r2", object(json!({"status": "open", "title": "B"})));
    driver.insert("user", "u1", object(json!({"email": "x@y.z"})));
    driver
}

fn coalescer(driver: MemoryDriver) -> TransactionCoalescer<MemoryDriver, NoopHooks> {
    TransactionCoalescer::new(driver, NoopHooks, clock(), PlatformConfig::default())
}

// =============================================================================
// Merge Semantics
// =============================================================================

/// Two operations on one record merge; the later value wins per field.
#[test]
fn test_last_write_wins_within_transaction() {
    let coalescer = coalescer(seeded_driver());

    let txn = Transaction::new()
        .add_operation(Operation::update("task", "r1", object(json!({"x": 1}))))
        .add_operation(Operation::update("task", "r1", object(json!({"x": 2, "y": 3}))));
    let receipt = coalescer.process(txn).unwrap();

    assert!(receipt.is_committed());
    let record = coalescer.driver().get("task", "r1").unwrap();
    assert_eq!(record.get("x"), Some(&json!(2)));
    assert_eq!(record.get("y"), Some(&json!(3)));
    // Untouched fields survive
    assert_eq!(record.get("title"), Some(&json!("A")));
}

/// Updates spanning models land on their own records.
#[test]
fn test_cross_model_batch() {
    let coalescer = coalescer(seeded_driver());

    let txn = Transaction::new()
        .add_operation(Operation::update("task", "r1", object(json!({"status": "done"}))))
        .add_operation(Operation::update("task", "r2", object(json!({"status": "done"}))))
        .add_operation(Operation::update("user", "u1", object(json!({"email": "new@y.z"}))));
    let receipt = coalescer.process(txn).unwrap();

    assert_eq!(receipt.applied.len(), 3);
    assert_eq!(
        coalescer.driver().get("task", "r2").unwrap().get("status"),
        Some(&json!("done"))
    );
    assert_eq!(
        coalescer.driver().get("user", "u1").unwrap().get("email"),
        Some(&json!("new@y.z"))
    );
}

// =============================================================================
// Audit Stamping
// =============================================================================

/// A user-attributed transaction stamps every merged record.
#[test]
fn test_audit_stamps_every_record() {
    let coalescer = coalescer(seeded_driver());

    let txn = Transaction::new()
        .with_user("user_7")
        .add_operation(Operation::update("task", "r1", object(json!({"status": "done"}))))
        .add_operation(Operation::update("task", "r2", object(json!({"status": "done"}))));
    let receipt = coalescer.process(txn).unwrap();

    for applied in &receipt.applied {
        assert_eq!(
            applied.updates.get("updatedAt"),
            Some(&json!("2024-03-15T10:30:00.000Z"))
        );
        assert_eq!(applied.updates.get("updatedBy"), Some(&json!("user_7")));
    }

    let record = coalescer.driver().get("task", "r1").unwrap();
    assert_eq!(record.get("updatedBy"), Some(&json!("user_7")));
}

/// Stamp field names follow the configuration.
#[test]
fn test_audit_stamp_fields_are_configurable() {
    let config = PlatformConfig {
        updated_at_field: "modifiedOn".to_string(),
        updated_by_field: "modifiedBy".to_string(),
        ..Default::default()
    };
    let coalescer = TransactionCoalescer::new(seeded_driver(), NoopHooks, clock(), config);

    let txn = Transaction::new()
        .with_user("user_7")
        .add_operation(Operation::update("task", "r1", object(json!({"status": "done"}))));
    let receipt = coalescer.process(txn).unwrap();

    let updates = &receipt.applied[0].updates;
    assert!(updates.contains_key("modifiedOn"));
    assert!(updates.contains_key("modifiedBy"));
    assert!(!updates.contains_key("updatedAt"));
}

// =============================================================================
// Dispatch Shape
// =============================================================================

/// A counting wrapper proves the single-vs-bulk decision.
struct CountingDriver {
    inner: MemoryDriver,
    singles: std::sync::Mutex<usize>,
    bulks: std::sync::Mutex<usize>,
}

impl CountingDriver {
    fn new(inner: MemoryDriver) -> Self {
        Self {
            inner,
            singles: std::sync::Mutex::new(0),
            bulks: std::sync::Mutex::new(0),
        }
    }
}

impl StorageDriver for CountingDriver {
    fn update_one(
        &self,
        model_id: &str,
        selector: &RecordSelector,
        updates: &Map<String, Value>,
    ) -> StorageResult<bool> {
        *self.singles.lock().unwrap() += 1;
        self.inner.update_one(model_id, selector, updates)
    }

    fn update_bulk(&self, updates: &[RecordUpdate]) -> StorageResult<bool> {
        *self.bulks.lock().unwrap() += 1;
        self.inner.update_bulk(updates)
    }
}

/// One merged record goes through the single-update primitive.
#[test]
fn test_single_record_dispatch() {
    let driver = CountingDriver::new(seeded_driver());
    let coalescer = TransactionCoalescer::new(driver, NoopHooks, clock(), PlatformConfig::default());

    let txn = Transaction::new()
        .add_operation(Operation::update("task", "r1", object(json!({"a": 1}))))
        .add_operation(Operation::update("task", "r1", object(json!({"b": 2}))));
    coalescer.process(txn).unwrap();

    assert_eq!(*coalescer.driver().singles.lock().unwrap(), 1);
    assert_eq!(*coalescer.driver().bulks.lock().unwrap(), 0);
}

/// Three merged records go through exactly one bulk call.
#[test]
fn test_bulk_dispatch_is_one_call() {
    let driver = CountingDriver::new(seeded_driver());
    let coalescer = TransactionCoalescer::new(driver, NoopHooks, clock(), PlatformConfig::default());

    let txn = Transaction::new()
        .add_operation(Operation::update("task", "r1", object(json!({"a": 1}))))
        .add_operation(Operation::update("task", "r2", object(json!({"a": 2}))))
        .add_operation(Operation::update("user", "u1", object(json!({"a": 3}))));
    coalescer.process(txn).unwrap();

    assert_eq!(*coalescer.driver().singles.lock().unwrap(), 0);
    assert_eq!(*coalescer.driver().bulks.lock().unwrap(), 1);
}

// =============================================================================
// Outcomes
// =============================================================================

/// Zero operations: committed, empty, storage untouched.
#[test]
fn test_empty_transaction_is_a_noop() {
    let driver = CountingDriver::new(seeded_driver());
    let coalescer = TransactionCoalescer::new(driver, NoopHooks, clock(), PlatformConfig::default());

    let receipt = coalescer.process(Transaction::new()).unwrap();

    assert_eq!(receipt.state, TransactionState::Committed);
    assert!(receipt.applied.is_empty());
    assert_eq!(*coalescer.driver().singles.lock().unwrap(), 0);
    assert_eq!(*coalescer.driver().bulks.lock().unwrap(), 0);
}

/// A write against a missing record rolls the transaction back.
#[test]
fn test_storage_failure_rolls_back() {
    let coalescer = coalescer(seeded_driver());

    let txn = Transaction::new()
        .add_operation(Operation::update("task", "ghost", object(json!({"a": 1}))));
    let receipt = coalescer.process(txn).unwrap();

    assert_eq!(receipt.state, TransactionState::RolledBack);
    assert!(receipt.applied.is_empty());
}

/// Processing through the transaction itself is equivalent to handing it
/// to the coalescer.
#[test]
fn test_transaction_process_consumes_into_coalescer() {
    let coalescer = coalescer(seeded_driver());

    let receipt = Transaction::new()
        .with_user("user_7")
        .add_operation(Operation::update("task", "r1", object(json!({"status": "done"}))))
        .process(&coalescer)
        .unwrap();

    assert!(receipt.is_committed());
    assert_eq!(
        coalescer.driver().get("task", "r1").unwrap().get("status"),
        Some(&json!("done"))
    );
}

/// The receipt distinguishes no-op commits from rollbacks even though both
/// carry empty lists.
#[test]
fn test_noop_and_failure_are_distinguishable() {
    let coalescer = coalescer(seeded_driver());

    let noop = coalescer.process(Transaction::new()).unwrap();
    let failed = coalescer
        .process(
            Transaction::new()
                .add_operation(Operation::update("task", "ghost", object(json!({"a": 1})))),
        )
        .unwrap();

    assert_eq!(noop.applied, failed.applied);
    assert_ne!(noop.state, failed.state);
}
