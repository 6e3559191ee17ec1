//! Filter tree compilation
//!
//! Turns a filter tree into a storage query document by structural
//! recursion. Macro resolution happens before predicate construction;
//! operator mapping is total over the operator enum; errors are explicit.

use serde_json::{json, Value};

use super::errors::{FilterError, FilterResult, MacroError};
use super::macros::{as_calendar_date, day_range, is_identity_macro, resolve_date_value};
use super::node::{FilterGroup, FilterLeaf, FilterNode, FilterOperator, GroupOperator};
use crate::config::PlatformConfig;
use crate::context::CompileContext;
use crate::query::{self, QueryDoc};

/// Compiles filter trees against an explicit context.
///
/// Construction injects everything compilation depends on: the clock (date
/// macros), the ACL identity (identity macros) and the platform config
/// (system timestamp field names). `compile` is a pure function of the tree
/// plus that context.
pub struct FilterCompiler<'a> {
    ctx: CompileContext,
    config: &'a PlatformConfig,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(ctx: CompileContext, config: &'a PlatformConfig) -> Self {
        Self { ctx, config }
    }

    /// Compile a filter tree into a storage query document.
    pub fn compile(&self, node: &FilterNode) -> FilterResult<QueryDoc> {
        match node {
            FilterNode::Group(group) => self.compile_group(group),
            FilterNode::Leaf(leaf) => self.compile_leaf(leaf),
        }
    }

    /// Compile a boolean group by compiling each child and wrapping the
    /// results under the group's combinator.
    pub fn compile_group(&self, group: &FilterGroup) -> FilterResult<QueryDoc> {
        if group.filters.is_empty() {
            return Err(FilterError::EmptyGroup);
        }

        let children = group
            .filters
            .iter()
            .map(|child| self.compile(child))
            .collect::<FilterResult<Vec<_>>>()?;

        Ok(match group.operator {
            GroupOperator::And => query::and(children),
            GroupOperator::Or => query::or(children),
        })
    }

    /// Compile a single leaf predicate.
    pub fn compile_leaf(&self, leaf: &FilterLeaf) -> FilterResult<QueryDoc> {
        let field = leaf.field_id.as_str();

        // Emptiness operators carry no value and resolve no macros
        match leaf.operator {
            FilterOperator::Empty => return Ok(Self::empty_conditions(field)),
            FilterOperator::NotEmpty => return Ok(Self::not_empty_conditions(field)),
            _ => {}
        }

        let value = resolve_date_value(leaf, self.ctx.today())?.ok_or_else(|| {
            FilterError::MissingValue {
                field: leaf.field_id.clone(),
                operator: leaf.operator.as_str().to_string(),
            }
        })?;

        if is_identity_macro(&value) {
            return self.compile_identity(leaf);
        }

        // System timestamp fields store full instants but equality filters
        // mean "same calendar day"
        if self.config.is_timestamp_field(field)
            && matches!(leaf.operator, FilterOperator::Eq | FilterOperator::Neq)
        {
            if let Some(date) = as_calendar_date(&value) {
                let range = day_range(field, date)?;
                return Ok(match leaf.operator {
                    FilterOperator::Neq => range.to_negated_doc(),
                    _ => range.to_doc(),
                });
            }
        }

        Ok(match leaf.operator {
            FilterOperator::Eq => query::eq(field, value),
            FilterOperator::Neq => query::op(field, "$ne", value),
            FilterOperator::Lt => query::op(field, "$lt", value),
            FilterOperator::Gt => query::op(field, "$gt", value),
            FilterOperator::Lte => query::op(field, "$lte", value),
            FilterOperator::Gte => query::op(field, "$gte", value),
            FilterOperator::Contains => {
                query::contains(field, &regex::escape(&text_of(&value)))
            }
            FilterOperator::NotContains => {
                query::not_contains(field, &regex::escape(&text_of(&value)))
            }
            // Handled above
            FilterOperator::Empty => Self::empty_conditions(field),
            FilterOperator::NotEmpty => Self::not_empty_conditions(field),
        })
    }

    /// `$userId`: the caller's identity set, as membership.
    fn compile_identity(&self, leaf: &FilterLeaf) -> FilterResult<QueryDoc> {
        let acl = self
            .ctx
            .acl
            .as_ref()
            .ok_or(MacroError::IdentityUnavailable)?;

        let ids: Vec<Value> = acl
            .effective_identity_set()
            .into_iter()
            .map(Value::String)
            .collect();

        match leaf.operator {
            FilterOperator::Eq | FilterOperator::Contains => {
                Ok(query::is_in(&leaf.field_id, ids))
            }
            FilterOperator::Neq | FilterOperator::NotContains => {
                Ok(query::not_in(&leaf.field_id, ids))
            }
            other => Err(MacroError::UnsupportedIdentityOperator {
                operator: other.as_str().to_string(),
            }
            .into()),
        }
    }

    /// Empty string, empty array, or absent field.
    fn empty_conditions(field: &str) -> QueryDoc {
        query::or(vec![
            query::eq(field, json!("")),
            query::eq(field, json!([])),
            query::exists(field, false),
        ])
    }

    /// None of the emptiness conditions.
    fn not_empty_conditions(field: &str) -> QueryDoc {
        query::and(vec![
            query::op(field, "$ne", json!("")),
            query::op(field, "$ne", json!([])),
            query::exists(field, true),
        ])
    }
}

/// Text a value contributes to a substring pattern.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FixedClock, StaticIdentity};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn fixed_ctx() -> CompileContext {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap());
        CompileContext::anonymous(Arc::new(clock))
    }

    fn identity_ctx(ids: Vec<&str>) -> CompileContext {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap());
        CompileContext::authenticated(
            Arc::new(clock),
            Arc::new(StaticIdentity::new(
                ids.into_iter().map(String::from).collect(),
            )),
        )
    }

    fn compile(ctx: CompileContext, node: &FilterNode) -> FilterResult<QueryDoc> {
        let config = PlatformConfig::default();
        FilterCompiler::new(ctx, &config).compile(node)
    }

    #[test]
    fn test_equality_leaf() {
        let node = FilterNode::leaf("age", FilterOperator::Eq, json!(30));
        assert_eq!(compile(fixed_ctx(), &node).unwrap(), json!({"age": 30}));
    }

    #[test]
    fn test_comparison_operators_map() {
        let cases = [
            (FilterOperator::Neq, "$ne"),
            (FilterOperator::Lt, "$lt"),
            (FilterOperator::Gt, "$gt"),
            (FilterOperator::Lte, "$lte"),
            (FilterOperator::Gte, "$gte"),
        ];
        for (operator, key) in cases {
            let node = FilterNode::leaf("age", operator, json!(30));
            assert_eq!(
                compile(fixed_ctx(), &node).unwrap(),
                json!({"age": {key: 30}})
            );
        }
    }

    #[test]
    fn test_contains_is_case_insensitive_regex() {
        let node = FilterNode::leaf("name", FilterOperator::Contains, json!("wil"));
        assert_eq!(
            compile(fixed_ctx(), &node).unwrap(),
            json!({"name": {"$regex": "wil", "$options": "i"}})
        );
    }

    #[test]
    fn test_contains_escapes_metacharacters() {
        let node = FilterNode::leaf("name", FilterOperator::Contains, json!("a.b*"));
        assert_eq!(
            compile(fixed_ctx(), &node).unwrap(),
            json!({"name": {"$regex": r"a\.b\*", "$options": "i"}})
        );
    }

    #[test]
    fn test_is_empty_is_three_conditions() {
        let node = FilterNode::Leaf(FilterLeaf::without_value("tags", FilterOperator::Empty));
        assert_eq!(
            compile(fixed_ctx(), &node).unwrap(),
            json!({"$or": [
                {"tags": ""},
                {"tags": []},
                {"tags": {"$exists": false}},
            ]})
        );
    }

    #[test]
    fn test_is_not_empty_negates_all_three() {
        let node = FilterNode::Leaf(FilterLeaf::without_value("tags", FilterOperator::NotEmpty));
        assert_eq!(
            compile(fixed_ctx(), &node).unwrap(),
            json!({"$and": [
                {"tags": {"$ne": ""}},
                {"tags": {"$ne": []}},
                {"tags": {"$exists": true}},
            ]})
        );
    }

    #[test]
    fn test_groups_nest_recursively() {
        let node = FilterNode::and(vec![
            FilterNode::leaf("a", FilterOperator::Eq, json!(1)),
            FilterNode::or(vec![
                FilterNode::leaf("b", FilterOperator::Gt, json!(2)),
                FilterNode::leaf("c", FilterOperator::Lt, json!(3)),
            ]),
        ]);
        assert_eq!(
            compile(fixed_ctx(), &node).unwrap(),
            json!({"$and": [
                {"a": 1},
                {"$or": [{"b": {"$gt": 2}}, {"c": {"$lt": 3}}]},
            ]})
        );
    }

    #[test]
    fn test_empty_group_is_an_error() {
        let node = FilterNode::and(vec![]);
        assert_eq!(compile(fixed_ctx(), &node), Err(FilterError::EmptyGroup));
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let node = FilterNode::Leaf(FilterLeaf::without_value("age", FilterOperator::Gt));
        assert_eq!(
            compile(fixed_ctx(), &node),
            Err(FilterError::MissingValue {
                field: "age".to_string(),
                operator: ">".to_string(),
            })
        );
    }

    #[test]
    fn test_user_id_macro_compiles_to_membership() {
        let node = FilterNode::leaf("owner", FilterOperator::Eq, json!("$userId"));
        assert_eq!(
            compile(identity_ctx(vec!["u1", "team_4"]), &node).unwrap(),
            json!({"owner": {"$in": ["u1", "team_4"]}})
        );

        let node = FilterNode::leaf("owner", FilterOperator::Neq, json!("$userId"));
        assert_eq!(
            compile(identity_ctx(vec!["u1"]), &node).unwrap(),
            json!({"owner": {"$nin": ["u1"]}})
        );
    }

    #[test]
    fn test_user_id_contains_maps_to_membership() {
        let node = FilterNode::leaf("assignees", FilterOperator::Contains, json!("$userId"));
        assert_eq!(
            compile(identity_ctx(vec!["u1"]), &node).unwrap(),
            json!({"assignees": {"$in": ["u1"]}})
        );

        let node = FilterNode::leaf("assignees", FilterOperator::NotContains, json!("$userId"));
        assert_eq!(
            compile(identity_ctx(vec!["u1"]), &node).unwrap(),
            json!({"assignees": {"$nin": ["u1"]}})
        );
    }

    #[test]
    fn test_user_id_without_identity_fails() {
        let node = FilterNode::leaf("owner", FilterOperator::Eq, json!("$userId"));
        assert_eq!(
            compile(fixed_ctx(), &node),
            Err(FilterError::Macro(MacroError::IdentityUnavailable))
        );
    }

    #[test]
    fn test_user_id_with_range_operator_fails() {
        let node = FilterNode::leaf("owner", FilterOperator::Gt, json!("$userId"));
        assert_eq!(
            compile(identity_ctx(vec!["u1"]), &node),
            Err(FilterError::Macro(MacroError::UnsupportedIdentityOperator {
                operator: ">".to_string(),
            }))
        );
    }

    #[test]
    fn test_timestamp_equality_becomes_day_range() {
        let node = FilterNode::leaf("createdAt", FilterOperator::Eq, json!("$today"));
        assert_eq!(
            compile(fixed_ctx(), &node).unwrap(),
            json!({"createdAt": {
                "$gte": "2024-03-15T00:00:00.000Z",
                "$lt": "2024-03-16T00:00:00.000Z",
            }})
        );
    }

    #[test]
    fn test_timestamp_inequality_negates_day_range() {
        let node = FilterNode::leaf("updatedAt", FilterOperator::Neq, json!("2024-03-15"));
        assert_eq!(
            compile(fixed_ctx(), &node).unwrap(),
            json!({"updatedAt": {"$not": {
                "$gte": "2024-03-15T00:00:00.000Z",
                "$lt": "2024-03-16T00:00:00.000Z",
            }}})
        );
    }

    #[test]
    fn test_timestamp_range_operator_passes_date_through() {
        // Only = and <> get the day-range treatment
        let node = FilterNode::leaf("createdAt", FilterOperator::Gte, json!("2024-03-15"));
        assert_eq!(
            compile(fixed_ctx(), &node).unwrap(),
            json!({"createdAt": {"$gte": "2024-03-15"}})
        );
    }

    #[test]
    fn test_plain_field_date_equality_stays_equality() {
        let node = FilterNode::leaf("dueDate", FilterOperator::Eq, json!("2024-03-15"));
        assert_eq!(
            compile(fixed_ctx(), &node).unwrap(),
            json!({"dueDate": "2024-03-15"})
        );
    }
}
