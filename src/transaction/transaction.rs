//! Transaction lifecycle types
//!
//! A Transaction owns its operations exclusively until processed, after
//! which it is consumed. The receipt reports the terminal state and the
//! flattened operations that were actually applied.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::operation::{Operation, RecordUpdate};

/// Which database the writes target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbMode {
    /// The published application data
    #[default]
    Live,
    /// The in-design draft copy
    Draft,
}

impl DbMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbMode::Live => "live",
            DbMode::Draft => "draft",
        }
    }
}

/// Processing states of a transaction.
///
/// `Empty -> Grouping -> Flattened -> Dispatched -> {Committed | RolledBack}`;
/// the receipt carries the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Empty,
    Grouping,
    Flattened,
    Dispatched,
    Committed,
    RolledBack,
}

impl TransactionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionState::Empty => "EMPTY",
            TransactionState::Grouping => "GROUPING",
            TransactionState::Flattened => "FLATTENED",
            TransactionState::Dispatched => "DISPATCHED",
            TransactionState::Committed => "COMMITTED",
            TransactionState::RolledBack => "ROLLED_BACK",
        }
    }

    /// True for the two terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionState::Committed | TransactionState::RolledBack)
    }
}

/// A batch of operations coalesced into minimal storage writes.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub operations: Vec<Operation>,

    /// When set, every merged record mutation is stamped with the update
    /// instant and this identity
    pub user_id: Option<String>,

    pub db_mode: DbMode,
}

impl Transaction {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            operations: Vec::new(),
            user_id: None,
            db_mode: DbMode::default(),
        }
    }

    /// Attribute the transaction to a user; enables audit stamping.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Target the draft or live database.
    pub fn with_db_mode(mut self, db_mode: DbMode) -> Self {
        self.db_mode = db_mode;
        self
    }

    /// Append an operation in submission order.
    pub fn add_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Snapshot of the identifying metadata, handed to hooks and logging.
    pub fn meta(&self) -> TransactionMeta {
        TransactionMeta {
            id: self.id,
            user_id: self.user_id.clone(),
            db_mode: self.db_mode,
        }
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifying metadata of a transaction, without its operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionMeta {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub db_mode: DbMode,
}

/// Outcome of processing a transaction.
///
/// The state is the channel distinguishing "nothing to do" from "failed":
/// an empty applied list with `Committed` is a deliberate no-op, with
/// `RolledBack` it is a storage failure.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionReceipt {
    pub state: TransactionState,
    pub applied: Vec<RecordUpdate>,
}

impl TransactionReceipt {
    pub(crate) fn committed(applied: Vec<RecordUpdate>) -> Self {
        Self {
            state: TransactionState::Committed,
            applied,
        }
    }

    pub(crate) fn rolled_back() -> Self {
        Self {
            state: TransactionState::RolledBack,
            applied: Vec::new(),
        }
    }

    pub fn is_committed(&self) -> bool {
        self.state == TransactionState::Committed
    }

    /// The post-hoc "what actually changed" record.
    pub fn into_applied(self) -> Vec<RecordUpdate> {
        self.applied
    }
}
