//! Engine error types

use arbiter_core::ValidationError;
use thiserror::Error;

/// Engine error
#[derive(Error, Debug)]
pub enum EngineError {
    /// The runtime rejected an assembled compilation unit
    ///
    /// The previously live container keeps serving; the failed build is
    /// abandoned before any swap.
    #[error(
        "Compilation failed for record type '{record_type}' \
         (attempted version {attempted_version}, {rule_count} rules): {diagnostics}"
    )]
    Compilation {
        record_type: String,
        attempted_version: i64,
        rule_count: usize,
        diagnostics: String,
        source_preview: String,
    },

    /// No deployed container version matches the request
    #[error("No container version {version} for record type '{record_type}'")]
    VersionNotFound { record_type: String, version: i64 },

    /// No field catalog is registered for the record type
    #[error("No field catalog for record type '{record_type}'")]
    UnknownRecordType { record_type: String },

    /// Rule failed authoring-time validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Rule could not be compiled to source at save time
    #[error(transparent)]
    RuleCompile(#[from] arbiter_compiler::CompileError),

    /// Collaborating store failed
    #[error("Store error: {0}")]
    Store(String),

    /// Runtime session could not be opened or executed
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
