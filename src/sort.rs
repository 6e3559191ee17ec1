//! Sort Compiler
//!
//! Converts an ordered (field, direction) list into storage sort directives.
//! Order is semantically significant: primary, secondary, ... sort keys.
//! The compiler never reorders and never deduplicates; a field referenced
//! twice keeps its first occurrence's position.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type for sort compilation
pub type SortResult<T> = Result<T, SortError>;

/// Sort compilation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// Wire entry was not a single-entry object
    #[error("Sort entry must be a single {{field: direction}} object")]
    MalformedEntry,

    /// Direction was neither "asc" nor "desc"
    #[error("Invalid sort direction for {field}: {direction}")]
    InvalidDirection { field: String, direction: String },
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// The storage dialect's direction marker: `1` ascending, `-1`
    /// descending.
    pub fn marker(&self) -> i64 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// One sort key: a field and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parses the wire shape: a JSON array of single-entry objects,
    /// `[{"a": "asc"}, {"b": "desc"}]`, preserving array order.
    pub fn parse_list(value: &Value) -> SortResult<Vec<SortKey>> {
        let entries = value.as_array().ok_or(SortError::MalformedEntry)?;

        let mut keys = Vec::with_capacity(entries.len());
        for entry in entries {
            let object = entry.as_object().ok_or(SortError::MalformedEntry)?;
            if object.len() != 1 {
                return Err(SortError::MalformedEntry);
            }
            let (field, direction) = match object.iter().next() {
                Some(entry) => entry,
                None => return Err(SortError::MalformedEntry),
            };
            let direction = match direction.as_str() {
                Some("asc") => SortDirection::Asc,
                Some("desc") => SortDirection::Desc,
                other => {
                    return Err(SortError::InvalidDirection {
                        field: field.clone(),
                        direction: other.map(str::to_string).unwrap_or_default(),
                    })
                }
            };
            keys.push(SortKey {
                field: field.clone(),
                direction,
            });
        }
        Ok(keys)
    }
}

/// One compiled sort directive in the storage dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortDirective {
    pub field: String,
    pub order: i64,
}

/// Compiles sort keys into ordered storage directives.
///
/// Pure, order-preserving, stable under duplicate fields.
pub fn compile_sort(keys: &[SortKey]) -> Vec<SortDirective> {
    keys.iter()
        .map(|key| SortDirective {
            field: key.field.clone(),
            order: key.direction.marker(),
        })
        .collect()
}

/// Renders directives as the `[["field", 1], ...]` pair list some drivers
/// take verbatim.
pub fn to_pairs(directives: &[SortDirective]) -> Vec<(String, i64)> {
    directives
        .iter()
        .map(|d| (d.field.clone(), d.order))
        .collect()
}
