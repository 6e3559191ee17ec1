//! Observability for the persistence layer
//!
//! Structured JSON logging of transaction outcomes.
//!
//! # Principles
//!
//! 1. Observability is read-only; no side effects on execution
//! 2. One log line = one event
//! 3. Deterministic key ordering
//! 4. Synchronous, no buffering

mod logger;

pub use logger::{Logger, Severity};

/// Event names emitted by this layer.
pub mod events {
    /// Transaction dispatched and acknowledged
    pub const TXN_COMMIT: &str = "TXN_COMMIT";

    /// Transaction rolled back after a storage failure
    pub const TXN_ROLLBACK: &str = "TXN_ROLLBACK";

    /// Transaction carried no operations; nothing dispatched
    pub const TXN_EMPTY: &str = "TXN_EMPTY";
}
