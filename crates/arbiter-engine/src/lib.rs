//! ARBITER Engine - versioned container management and rule execution
//!
//! Owns the lifecycle of compiled rule sets ("containers") per record type:
//! building them from rule records, hashing for change detection, atomically
//! swapping live containers, executing incoming facts against them,
//! aggregating the resulting hits, and reconciling hits back to their
//! originating rules for audit persistence.
//!
//! The pattern-matching runtime itself is external: the engine drives it
//! through the [`runtime::MatchRuntime`] boundary and never looks inside.

pub mod aggregate;
pub mod container;
pub mod error;
pub mod reconcile;
pub mod runtime;
pub mod store;

// Re-export main types
pub use aggregate::{aggregate, EvaluationOutcome};
pub use container::{ActivationReport, ContainerService, ContainerStatus, VerifyReport};
pub use error::{EngineError, Result};
pub use reconcile::Reconciler;
pub use runtime::{
    CompileDiagnostics, CompiledModule, Hit, HitAccumulator, MatchRuntime, MatchSession,
};
pub use store::{AuditStore, ExecutionAudit, RuleStore, SnapshotStore, VersionStore};
