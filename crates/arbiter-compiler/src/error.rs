//! Compiler error types

use thiserror::Error;

/// Compiler error
#[derive(Error, Debug)]
pub enum CompileError {
    /// Field path with no catalog entry reached the compiler
    ///
    /// Validation runs first, so this indicates a caller skipped it.
    #[error("Unresolved field path '{path}' for record type '{record_type}'")]
    UnresolvedField { path: String, record_type: String },

    /// Operator text outside the comparison grammar
    #[error("Invalid operator '{operator}' in condition on '{path}'")]
    InvalidOperator { operator: String, path: String },

    /// Rule compiled to no predicate at all
    #[error("Rule '{rule}' has no conditions to compile")]
    EmptyConditions { rule: String },
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
