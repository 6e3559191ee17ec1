//! Storage Query Dialect
//!
//! Typed builders for the document-store filter syntax the storage drivers
//! consume. Output is bit-exact MongoDB filter syntax so drivers need no
//! further translation:
//!
//! - `{field: value}` equality
//! - `{field: {"$gt": v}}` comparisons
//! - `{"$and": [...]}` / `{"$or": [...]}` boolean groups
//! - `{field: {"$regex": pat, "$options": "i"}}` case-insensitive contains
//! - `{field: {"$in": [...]}}` / `{"$nin": [...]}` set membership
//! - `{field: {"$exists": bool}}` presence checks

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// A compiled storage query document.
pub type QueryDoc = Value;

/// `{field: value}`: implicit equality.
pub fn eq(field: &str, value: Value) -> QueryDoc {
    json!({ field: value })
}

/// `{field: {"$<op>": value}}`: a single comparison operator.
pub fn op(field: &str, operator: &str, value: Value) -> QueryDoc {
    json!({ field: { operator: value } })
}

/// `{field: {"$in": values}}`: value is a member of the set.
pub fn is_in(field: &str, values: Vec<Value>) -> QueryDoc {
    json!({ field: { "$in": values } })
}

/// `{field: {"$nin": values}}`: value is not a member of the set.
pub fn not_in(field: &str, values: Vec<Value>) -> QueryDoc {
    json!({ field: { "$nin": values } })
}

/// `{field: {"$regex": pattern, "$options": "i"}}`.
///
/// `pattern` must already be escaped; callers pass `regex::escape` output
/// for literal substring matches.
pub fn contains(field: &str, pattern: &str) -> QueryDoc {
    json!({ field: { "$regex": pattern, "$options": "i" } })
}

/// `{field: {"$not": {"$regex": pattern, "$options": "i"}}}`.
pub fn not_contains(field: &str, pattern: &str) -> QueryDoc {
    json!({ field: { "$not": { "$regex": pattern, "$options": "i" } } })
}

/// `{field: {"$exists": present}}`.
pub fn exists(field: &str, present: bool) -> QueryDoc {
    json!({ field: { "$exists": present } })
}

/// `{"$and": [...]}`.
pub fn and(clauses: Vec<QueryDoc>) -> QueryDoc {
    json!({ "$and": clauses })
}

/// `{"$or": [...]}`.
pub fn or(clauses: Vec<QueryDoc>) -> QueryDoc {
    json!({ "$or": clauses })
}

/// A half-open instant range on one field.
///
/// The typed replacement for date-slice comparisons against timestamp
/// fields: "same calendar day" becomes `gte <= t < lt` with explicit
/// boundaries, evaluated by the driver like any other range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    /// Field the range applies to
    pub field: String,
    /// Inclusive lower bound
    pub gte: DateTime<Utc>,
    /// Exclusive upper bound
    pub lt: DateTime<Utc>,
}

impl DateRange {
    /// Create a range covering `[gte, lt)`.
    pub fn new(field: impl Into<String>, gte: DateTime<Utc>, lt: DateTime<Utc>) -> Self {
        Self {
            field: field.into(),
            gte,
            lt,
        }
    }

    /// `{field: {"$gte": start, "$lt": end}}` with RFC-3339 millisecond
    /// rendering, matching the stored timestamp format.
    pub fn to_doc(&self) -> QueryDoc {
        json!({
            &self.field: {
                "$gte": render_instant(self.gte),
                "$lt": render_instant(self.lt),
            }
        })
    }

    /// Negation: `{field: {"$not": {"$gte": start, "$lt": end}}}`.
    pub fn to_negated_doc(&self) -> QueryDoc {
        json!({
            &self.field: {
                "$not": {
                    "$gte": render_instant(self.gte),
                    "$lt": render_instant(self.lt),
                }
            }
        })
    }
}

/// Renders an instant the way records store them: RFC-3339, millisecond
/// precision, `Z` suffix.
pub fn render_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
