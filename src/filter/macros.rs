//! Macro resolution
//!
//! Sentinel values in a filter leaf are substituted against the compile
//! context before any predicate is constructed: `$today` and the date
//! offset operators resolve against the clock, `$userId` against the
//! caller's effective ACL identity set.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde_json::Value;

use super::errors::MacroError;
use super::node::{DateOperator, FilterLeaf};
use crate::query::DateRange;

/// Sentinel resolved to the current calendar date.
pub const TODAY_MACRO: &str = "$today";

/// Sentinel resolved to the caller's effective identity set.
pub const USER_ID_MACRO: &str = "$userId";

/// Substitutes date macros in a leaf's value.
///
/// Returns the leaf value with any date macro replaced by a plain
/// `"YYYY-MM-DD"` string; non-macro values pass through untouched.
pub(crate) fn resolve_date_value(
    leaf: &FilterLeaf,
    today: NaiveDate,
) -> Result<Option<Value>, MacroError> {
    if let Some(date_operator) = leaf.date_operator {
        let date = match date_operator {
            DateOperator::Today => today,
            DateOperator::DaysFromNow => offset_days(leaf, today, 1)?,
            DateOperator::DaysAgo => offset_days(leaf, today, -1)?,
        };
        return Ok(Some(Value::String(render_date(date))));
    }

    if leaf.value.as_ref().and_then(Value::as_str) == Some(TODAY_MACRO) {
        return Ok(Some(Value::String(render_date(today))));
    }

    Ok(leaf.value.clone())
}

fn offset_days(leaf: &FilterLeaf, today: NaiveDate, sign: i64) -> Result<NaiveDate, MacroError> {
    let days = leaf
        .value
        .as_ref()
        .and_then(Value::as_i64)
        .ok_or_else(|| MacroError::InvalidDateInput {
            field: leaf.field_id.clone(),
            detail: "day offset must be a number".to_string(),
        })?;

    days.checked_mul(sign)
        .and_then(Duration::try_days)
        .and_then(|offset| today.checked_add_signed(offset))
        .ok_or_else(|| MacroError::InvalidDateInput {
            field: leaf.field_id.clone(),
            detail: format!("day offset {days} out of range"),
        })
}

/// True if the value is the `$userId` sentinel.
pub(crate) fn is_identity_macro(value: &Value) -> bool {
    value.as_str() == Some(USER_ID_MACRO)
}

/// The calendar date named by a value, if any.
///
/// Accepts plain `"YYYY-MM-DD"` strings and full RFC-3339 instants (the
/// date portion is taken). Anything else is not a date.
pub(crate) fn as_calendar_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?;
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|instant| instant.with_timezone(&Utc).date_naive())
}

/// The half-open instant range covering one calendar day of `field`.
pub(crate) fn day_range(field: &str, date: NaiveDate) -> Result<DateRange, MacroError> {
    let next = date.succ_opt().ok_or_else(|| MacroError::InvalidDateInput {
        field: field.to_string(),
        detail: "date out of range".to_string(),
    })?;

    Ok(DateRange::new(
        field,
        date.and_time(NaiveTime::MIN).and_utc(),
        next.and_time(NaiveTime::MIN).and_utc(),
    ))
}

fn render_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
