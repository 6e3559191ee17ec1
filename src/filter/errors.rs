//! Filter compilation errors
//!
//! A malformed node or unresolvable macro is always surfaced to the caller;
//! nothing here ever degrades to an empty (match-all) query document.

use thiserror::Error;

/// Result type for filter compilation
pub type FilterResult<T> = Result<T, FilterError>;

/// Filter compilation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Operator needs a comparison value and the leaf has none
    #[error("Filter on {field} requires a value for operator '{operator}'")]
    MissingValue { field: String, operator: String },

    /// Boolean group with no children
    #[error("Filter group has no children")]
    EmptyGroup,

    /// Macro failed to resolve
    #[error(transparent)]
    Macro(#[from] MacroError),
}

/// Macro resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacroError {
    /// `$userId` was requested but the caller supplied no identity context
    #[error("$userId macro requires an identity context")]
    IdentityUnavailable,

    /// `$userId` only composes with equality and membership operators
    #[error("$userId macro does not support operator '{operator}'")]
    UnsupportedIdentityOperator { operator: String },

    /// Date macro input did not resolve to a calendar date
    #[error("Invalid date input for {field}: {detail}")]
    InvalidDateInput { field: String, detail: String },
}
