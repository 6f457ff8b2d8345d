//! ARBITER Core - Core types and definitions for the ARBITER rule engine
//!
//! This crate provides the fundamental types used across the ARBITER ecosystem:
//! - Rule records with condition trees and output specifications
//! - Field catalogs for record types
//! - Container versioning and deployment snapshots
//! - Validation and error types

pub mod catalog;
pub mod condition;
pub mod error;
pub mod operator;
pub mod rule;
pub mod validate;
pub mod value;
pub mod version;

// Re-export commonly used types
pub use catalog::{CatalogSet, FieldCatalog, FieldKind, RelationDescriptor, ResolvedField};
pub use condition::{Combinator, ConditionLeaf, ConditionNode, ConditionTree, FlatCondition};
pub use error::{CoreError, ValidationError};
pub use operator::ComparisonOp;
pub use rule::{OutputSpec, RuleRecord, RuleStatus};
pub use validate::{validate_rule, ValidationWarning};
pub use value::Value;
pub use version::{ContainerDiff, ContainerVersion, DeploymentSnapshot, RuleDelta};
