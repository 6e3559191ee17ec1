//! Filter subsystem
//!
//! Application-level filter trees and their compilation into storage query
//! documents.
//!
//! # Design Principles
//!
//! - A filter is a finite acyclic tree of leaves and boolean groups,
//!   compiled by structural recursion; no node is visited twice
//! - Compilation is a pure function of the tree plus an explicit context
//!   (clock, ACL identity); no globals, no I/O
//! - Macros (`$today`, `$userId`, date offsets) resolve before predicate
//!   construction
//! - No silent fallbacks: anything unresolvable is an explicit error, never
//!   a match-all document

mod compiler;
mod errors;
mod macros;
mod node;

pub use compiler::FilterCompiler;
pub use errors::{FilterError, FilterResult, MacroError};
pub use macros::{TODAY_MACRO, USER_ID_MACRO};
pub use node::{
    DateOperator, FieldKind, FilterGroup, FilterLeaf, FilterNode, FilterOperator, GroupOperator,
    GroupTag,
};
