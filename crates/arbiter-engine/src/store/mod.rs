//! Collaborator store interfaces
//!
//! The persistence layer is external; the engine consumes it through
//! these synchronous traits. In-memory implementations live in
//! [`memory`] and back the tests and demos.

pub mod memory;

pub use memory::{InMemoryAuditStore, InMemoryRuleStore, InMemorySnapshotStore, InMemoryVersionStore};

use crate::error::Result;
use arbiter_core::{ContainerVersion, DeploymentSnapshot, RuleRecord, RuleStatus};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rule-record store
pub trait RuleStore: Send + Sync {
    /// Insert a record, replacing any existing record with the same id
    fn insert(&self, record: RuleRecord) -> Result<()>;

    /// Active, latest records for a record type, ordered by priority
    fn find_active_latest(&self, record_type: &str) -> Result<Vec<RuleRecord>>;

    /// Load exact records by id, ignoring status and latest flags,
    /// preserving the order of the given ids
    fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<RuleRecord>>;

    fn find_by_id(&self, id: i64) -> Result<Option<RuleRecord>>;

    fn set_status(&self, id: i64, status: RuleStatus) -> Result<()>;

    /// Store the source block produced at save time
    fn save_compiled_source(&self, id: i64, source: &str) -> Result<()>;
}

/// Container-version store
pub trait VersionStore: Send + Sync {
    fn insert(&self, version: ContainerVersion) -> Result<()>;

    /// Highest deployed version for a record type
    fn latest(&self, record_type: &str) -> Result<Option<ContainerVersion>>;

    fn find(&self, record_type: &str, version: i64) -> Result<Option<ContainerVersion>>;
}

/// Deployment-snapshot store
pub trait SnapshotStore: Send + Sync {
    fn insert_all(&self, snapshots: Vec<DeploymentSnapshot>) -> Result<()>;

    fn find(&self, record_type: &str, container_version: i64) -> Result<Vec<DeploymentSnapshot>>;
}

/// One persisted audit row linking a business record to a fired rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionAudit {
    /// Business-record identifier the evaluation ran against
    pub business_ref: String,
    pub rule_id: i64,
    pub rule_name: String,
    pub matched: bool,
    pub action: String,
    pub result_text: String,
    pub score: BigDecimal,
    pub recorded_at: DateTime<Utc>,
}

/// Execution-audit store
pub trait AuditStore: Send + Sync {
    fn insert(&self, audit: ExecutionAudit) -> Result<()>;
}
