//! Model registry and accepted-field lookup
//!
//! Static system models declare a fixed set of accepted fields; payloads
//! written to them are whitelisted against that set. Dynamic models are
//! user-defined at runtime, identified by a generated unique id, and carry
//! no whitelist.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

/// Read-only view of the model registry consumed by the sanitizer.
pub trait ModelRegistry: Send + Sync {
    /// Accepted field ids for a statically declared model.
    ///
    /// Returns None when the model is not statically declared.
    fn accepted_fields(&self, model_id: &str) -> Option<&HashSet<String>>;

    /// True if the model is user-defined (generated id, no whitelist).
    fn is_dynamic_model(&self, model_id: &str) -> bool;
}

/// In-process model catalog.
///
/// Static models are registered with their accepted-field sets. A model id
/// counts as dynamic when it was explicitly registered as such or when it is
/// a generated unique id (the form the model designer assigns to
/// user-defined models).
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    accepted: HashMap<String, HashSet<String>>,
    dynamic: HashSet<String>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a static model with its accepted fields.
    pub fn register_static<I, S>(&mut self, model_id: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted.insert(
            model_id.into(),
            fields.into_iter().map(Into::into).collect(),
        );
    }

    /// Declare a dynamic model id explicitly.
    pub fn register_dynamic(&mut self, model_id: impl Into<String>) {
        self.dynamic.insert(model_id.into());
    }

    /// True if the id is known at all (static or dynamic).
    pub fn contains(&self, model_id: &str) -> bool {
        self.accepted.contains_key(model_id) || self.is_dynamic_model(model_id)
    }
}

impl ModelRegistry for ModelCatalog {
    fn accepted_fields(&self, model_id: &str) -> Option<&HashSet<String>> {
        self.accepted.get(model_id)
    }

    fn is_dynamic_model(&self, model_id: &str) -> bool {
        // Statically declared wins over the generated-id heuristic
        if self.accepted.contains_key(model_id) {
            return false;
        }
        self.dynamic.contains(model_id) || Uuid::parse_str(model_id).is_ok()
    }
}
