//! Model Catalog subsystem
//!
//! The boundary to the platform's model registry. The persistence layer
//! consumes two facts per model: the accepted-field set (static models) and
//! whether the model is dynamic (user-defined, no fixed field whitelist).

mod catalog;

pub use catalog::{ModelCatalog, ModelRegistry};
