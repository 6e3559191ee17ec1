//! formabase-persist - Persistence translation layer for Formabase
//!
//! Compiles application-level filter/sort descriptions into storage query
//! documents and coalesces field-level update intents into minimal storage
//! write calls.

pub mod config;
pub mod context;
pub mod filter;
pub mod observability;
pub mod query;
pub mod sanitize;
pub mod schema;
pub mod sort;
pub mod storage;
pub mod transaction;
