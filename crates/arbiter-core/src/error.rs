//! Error types for ARBITER Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Validation error raised before compilation
///
/// These are authoring-time failures: a rule that fails validation is
/// rejected by the caller and never reaches the compiler or the runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Rule has no usable conditions
    #[error("Rule '{rule}' has no conditions")]
    EmptyConditions { rule: String },

    /// Field path has no catalog entry
    #[error("Unknown field path '{path}' for record type '{record_type}'")]
    UnknownField { path: String, record_type: String },

    /// Operator text is not part of the comparison grammar
    #[error("Unknown operator '{operator}' in condition on '{path}'")]
    UnknownOperator { operator: String, path: String },

    /// Condition has no operator
    #[error("Condition on '{path}' is missing an operator")]
    MissingOperator { path: String },

    /// Condition has no comparison value
    #[error("Condition on '{path}' is missing a comparison value")]
    MissingValue { path: String },

    /// Rule has no output specification
    #[error("Rule '{rule}' has no output specification")]
    EmptyOutput { rule: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
