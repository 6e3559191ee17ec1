//! Platform Configuration
//!
//! Names of the system-managed record fields and limits enforced by the
//! persistence layer. Applications override these when their record shape
//! differs from the defaults.

use serde::{Deserialize, Serialize};

/// Persistence layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Field holding the record creation instant (default: "createdAt")
    #[serde(default = "default_created_at_field")]
    pub created_at_field: String,

    /// Field holding the last-update instant (default: "updatedAt")
    #[serde(default = "default_updated_at_field")]
    pub updated_at_field: String,

    /// Field holding the last updater's identity (default: "updatedBy")
    #[serde(default = "default_updated_by_field")]
    pub updated_by_field: String,

    /// Maximum operations accepted per transaction (default: 1000)
    #[serde(default = "default_max_operations")]
    pub max_operations: usize,
}

fn default_created_at_field() -> String {
    "createdAt".to_string()
}

fn default_updated_at_field() -> String {
    "updatedAt".to_string()
}

fn default_updated_by_field() -> String {
    "updatedBy".to_string()
}

fn default_max_operations() -> usize {
    1000
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            created_at_field: default_created_at_field(),
            updated_at_field: default_updated_at_field(),
            updated_by_field: default_updated_by_field(),
            max_operations: default_max_operations(),
        }
    }
}

impl PlatformConfig {
    /// Returns true if `field` stores a full timestamp but is filtered by
    /// calendar date (the system-stamped instant fields).
    pub fn is_timestamp_field(&self, field: &str) -> bool {
        field == self.created_at_field || field == self.updated_at_field
    }
}
