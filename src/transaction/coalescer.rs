//! Transaction coalescing and dispatch
//!
//! Groups a transaction's operations by (model, record), merges their field
//! updates, stamps audit metadata, and dispatches the cheapest correct
//! storage call: a single-record update for one merged record, one bulk
//! call otherwise.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::errors::{TransactionError, TransactionResult};
use super::hooks::TransactionHooks;
use super::operation::RecordUpdate;
use super::transaction::{Transaction, TransactionMeta, TransactionReceipt};
use crate::config::PlatformConfig;
use crate::context::Clock;
use crate::observability::{events, Logger};
use crate::query::render_instant;
use crate::storage::{RecordSelector, StorageDriver};

/// Coalesces transactions into minimal storage writes.
///
/// Constructed once with its collaborators; `process` consumes one
/// transaction per call and performs exactly one outstanding storage call.
pub struct TransactionCoalescer<D: StorageDriver, H: TransactionHooks> {
    driver: D,
    hooks: H,
    clock: Arc<dyn Clock>,
    config: PlatformConfig,
}

impl<D: StorageDriver, H: TransactionHooks> TransactionCoalescer<D, H> {
    pub fn new(driver: D, hooks: H, clock: Arc<dyn Clock>, config: PlatformConfig) -> Self {
        Self {
            driver,
            hooks,
            clock,
            config,
        }
    }

    /// Access the wired driver (tests inspect recorded calls through this).
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Process one transaction.
    ///
    /// Returns `Err` only for caller mistakes (operation count over the
    /// configured limit). Storage failures are caught and reported through
    /// the receipt's RolledBack state.
    pub fn process(&self, transaction: Transaction) -> TransactionResult<TransactionReceipt> {
        if transaction.len() > self.config.max_operations {
            return Err(TransactionError::TooManyOperations {
                count: transaction.len(),
                limit: self.config.max_operations,
            });
        }

        let meta = transaction.meta();
        let flattened = self.flatten(transaction);

        if flattened.is_empty() {
            // Deliberate no-op: nothing reaches the storage layer
            self.hooks.on_commit(&[], &meta);
            Logger::info(events::TXN_EMPTY, &[("txn_id", &meta.id.to_string())]);
            return Ok(TransactionReceipt::committed(Vec::new()));
        }

        let acked = self.dispatch(&flattened);

        match acked {
            Ok(true) => {
                self.hooks.on_commit(&flattened, &meta);
                Logger::info(
                    events::TXN_COMMIT,
                    &[
                        ("call", if flattened.len() == 1 { "single" } else { "bulk" }),
                        ("db_mode", meta.db_mode.as_str()),
                        ("records", &flattened.len().to_string()),
                        ("txn_id", &meta.id.to_string()),
                    ],
                );
                Ok(TransactionReceipt::committed(flattened))
            }
            Ok(false) => {
                self.roll_back(&flattened, &meta, "write not acknowledged");
                Ok(TransactionReceipt::rolled_back())
            }
            Err(error) => {
                self.roll_back(&flattened, &meta, &error.to_string());
                Ok(TransactionReceipt::rolled_back())
            }
        }
    }

    /// Group by (model, record) in submission order and merge field
    /// updates, then stamp audit metadata on every merged record.
    fn flatten(&self, transaction: Transaction) -> Vec<RecordUpdate> {
        let mut buckets: Vec<RecordUpdate> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();

        let user_id = transaction.user_id.clone();

        for operation in transaction.operations {
            let key = (operation.model_id.clone(), operation.record_id.clone());
            match index.get(&key) {
                Some(&position) => buckets[position].merge(&operation.updates),
                None => {
                    index.insert(key, buckets.len());
                    buckets.push(RecordUpdate::new(
                        operation.model_id,
                        operation.record_id,
                        operation.updates,
                    ));
                }
            }
        }

        // Operations that carried no fields produce nothing
        buckets.retain(|bucket| !bucket.updates.is_empty());

        if let Some(user_id) = user_id {
            let stamped_at = render_instant(self.clock.now());
            for bucket in &mut buckets {
                bucket.updates.insert(
                    self.config.updated_at_field.clone(),
                    Value::String(stamped_at.clone()),
                );
                bucket.updates.insert(
                    self.config.updated_by_field.clone(),
                    Value::String(user_id.clone()),
                );
            }
        }

        buckets
    }

    /// One storage call: single-record update or one bulk call.
    fn dispatch(&self, flattened: &[RecordUpdate]) -> crate::storage::StorageResult<bool> {
        match flattened {
            [only] => self.driver.update_one(
                &only.model_id,
                &RecordSelector::id(&only.record_id),
                &only.updates,
            ),
            many => self.driver.update_bulk(many),
        }
    }

    fn roll_back(&self, attempted: &[RecordUpdate], meta: &TransactionMeta, reason: &str) {
        self.hooks.on_rollback(attempted, meta);
        Logger::error(
            events::TXN_ROLLBACK,
            &[
                ("reason", reason),
                ("records", &attempted.len().to_string()),
                ("txn_id", &meta.id.to_string()),
            ],
        );
    }
}

impl Transaction {
    /// Process this transaction through a coalescer, consuming it.
    pub fn process<D: StorageDriver, H: TransactionHooks>(
        self,
        coalescer: &TransactionCoalescer<D, H>,
    ) -> TransactionResult<TransactionReceipt> {
        coalescer.process(self)
    }
}
