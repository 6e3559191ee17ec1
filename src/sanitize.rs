//! Field Sanitizer
//!
//! Whitelists an inbound record payload against the model's accepted-field
//! set before it reaches the write path.
//!
//! Trust boundary: statically declared system models are protected from
//! arbitrary field injection; dynamically defined models have no fixed
//! whitelist and the payload passes through whole.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::ModelRegistry;

/// Result type for sanitization
pub type SanitizeResult<T> = Result<T, SanitizeError>;

/// Sanitization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    /// Model id is neither statically declared nor dynamic
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Payload was not a JSON object
    #[error("Payload for model {0} is not an object")]
    NotAnObject(String),
}

/// Whitelists record payloads against the model catalog.
pub struct Sanitizer<'a, R: ModelRegistry> {
    registry: &'a R,
}

impl<'a, R: ModelRegistry> Sanitizer<'a, R> {
    pub fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// Returns the payload with every key outside the model's accepted-field
    /// set removed. Dynamic models pass through unchanged.
    pub fn sanitize(&self, payload: &Value, model_id: &str) -> SanitizeResult<Value> {
        let object = payload
            .as_object()
            .ok_or_else(|| SanitizeError::NotAnObject(model_id.to_string()))?;

        if self.registry.is_dynamic_model(model_id) {
            return Ok(payload.clone());
        }

        let accepted = self
            .registry
            .accepted_fields(model_id)
            .ok_or_else(|| SanitizeError::UnknownModel(model_id.to_string()))?;

        let clean: Map<String, Value> = object
            .iter()
            .filter(|(key, _)| accepted.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Value::Object(clean))
    }
}
