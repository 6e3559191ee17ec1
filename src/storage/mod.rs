//! Storage driver boundary
//!
//! The persistence layer does not own an engine; it talks to whatever
//! driver the deployment wires in through the `StorageDriver` trait. The
//! in-memory driver is the reference implementation used by the test
//! suites.

mod driver;
mod errors;
mod memory;

pub use driver::{RecordSelector, StorageDriver};
pub use errors::{StorageError, StorageResult};
pub use memory::MemoryDriver;
