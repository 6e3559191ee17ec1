//! Filter tree wire types
//!
//! The language-neutral filter description applications submit: leaf
//! predicates and boolean groups, nested to arbitrary depth. Field names
//! follow the platform's camelCase wire format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Leaf comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Equals
    #[serde(rename = "=")]
    Eq,

    /// Not equals
    #[serde(rename = "<>")]
    Neq,

    /// Less than
    #[serde(rename = "<")]
    Lt,

    /// Greater than
    #[serde(rename = ">")]
    Gt,

    /// Less than or equal
    #[serde(rename = "<=")]
    Lte,

    /// Greater than or equal
    #[serde(rename = ">=")]
    Gte,

    /// Case-insensitive substring match
    #[serde(rename = "contains")]
    Contains,

    /// Negated case-insensitive substring match
    #[serde(rename = "does not contain")]
    NotContains,

    /// Empty string, empty array, or absent field
    #[serde(rename = "is empty")]
    Empty,

    /// None of the emptiness conditions
    #[serde(rename = "is not empty")]
    NotEmpty,
}

impl FilterOperator {
    /// Wire representation of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Neq => "<>",
            FilterOperator::Lt => "<",
            FilterOperator::Gt => ">",
            FilterOperator::Lte => "<=",
            FilterOperator::Gte => ">=",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "does not contain",
            FilterOperator::Empty => "is empty",
            FilterOperator::NotEmpty => "is not empty",
        }
    }

    /// True for every operator except the emptiness checks
    pub fn requires_value(&self) -> bool {
        !matches!(self, FilterOperator::Empty | FilterOperator::NotEmpty)
    }
}

/// Date macro operators carried on a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateOperator {
    /// The current calendar date
    #[serde(rename = "today")]
    Today,

    /// Today plus the leaf value (a day count)
    #[serde(rename = "days from now")]
    DaysFromNow,

    /// Today minus the leaf value (a day count)
    #[serde(rename = "days ago")]
    DaysAgo,
}

/// Declared field type hint carried on a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
    Array,
}

/// A single field/operator/value predicate.
///
/// `value` is required except for the emptiness operators; `fieldType` and
/// `dateOperator` are optional hints from the query designer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterLeaf {
    #[serde(rename = "fieldId")]
    pub field_id: String,

    pub operator: FilterOperator,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(
        rename = "fieldType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub field_type: Option<FieldKind>,

    #[serde(
        rename = "dateOperator",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub date_operator: Option<DateOperator>,
}

impl FilterLeaf {
    /// Create a leaf with an operator and value.
    pub fn new(field_id: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field_id: field_id.into(),
            operator,
            value: Some(value),
            field_type: None,
            date_operator: None,
        }
    }

    /// Create a valueless leaf (the emptiness operators).
    pub fn without_value(field_id: impl Into<String>, operator: FilterOperator) -> Self {
        Self {
            field_id: field_id.into(),
            operator,
            value: None,
            field_type: None,
            date_operator: None,
        }
    }

    /// Attach a field type hint.
    pub fn with_field_type(mut self, field_type: FieldKind) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Attach a date macro operator.
    pub fn with_date_operator(mut self, date_operator: DateOperator) -> Self {
        self.date_operator = Some(date_operator);
        self
    }
}

/// Boolean combinators for groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOperator {
    And,
    Or,
}

impl GroupOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupOperator::And => "and",
            GroupOperator::Or => "or",
        }
    }
}

/// Marker for the group wire tag (`"type": "group"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupTag {
    #[serde(rename = "group")]
    Group,
}

/// A boolean combination of filter nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(rename = "type")]
    pub tag: GroupTag,

    pub operator: GroupOperator,

    pub filters: Vec<FilterNode>,
}

impl FilterGroup {
    pub fn new(operator: GroupOperator, filters: Vec<FilterNode>) -> Self {
        Self {
            tag: GroupTag::Group,
            operator,
            filters,
        }
    }
}

/// A node in the filter tree: a leaf predicate or a nested group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Group(FilterGroup),
    Leaf(FilterLeaf),
}

impl FilterNode {
    /// Leaf node shorthand.
    pub fn leaf(field_id: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        FilterNode::Leaf(FilterLeaf::new(field_id, operator, value))
    }

    /// AND group shorthand.
    pub fn and(filters: Vec<FilterNode>) -> Self {
        FilterNode::Group(FilterGroup::new(GroupOperator::And, filters))
    }

    /// OR group shorthand.
    pub fn or(filters: Vec<FilterNode>) -> Self {
        FilterNode::Group(FilterGroup::new(GroupOperator::Or, filters))
    }
}

impl From<FilterLeaf> for FilterNode {
    fn from(leaf: FilterLeaf) -> Self {
        FilterNode::Leaf(leaf)
    }
}

impl From<FilterGroup> for FilterNode {
    fn from(group: FilterGroup) -> Self {
        FilterNode::Group(group)
    }
}
