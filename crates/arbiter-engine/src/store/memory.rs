//! In-memory store implementations

use super::{AuditStore, ExecutionAudit, RuleStore, SnapshotStore, VersionStore};
use crate::error::{EngineError, Result};
use arbiter_core::{ContainerVersion, DeploymentSnapshot, RuleRecord, RuleStatus};
use parking_lot::Mutex;

/// In-memory rule-record store
#[derive(Default)]
pub struct InMemoryRuleStore {
    records: Mutex<Vec<RuleRecord>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleStore for InMemoryRuleStore {
    fn insert(&self, record: RuleRecord) -> Result<()> {
        let mut records = self.records.lock();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(())
    }

    fn find_active_latest(&self, record_type: &str) -> Result<Vec<RuleRecord>> {
        let mut matching: Vec<RuleRecord> = self
            .records
            .lock()
            .iter()
            .filter(|r| r.record_type == record_type && r.is_deployable())
            .cloned()
            .collect();
        matching.sort_by_key(|r| (r.priority, r.id));
        Ok(matching)
    }

    fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<RuleRecord>> {
        let records = self.records.lock();
        Ok(ids
            .iter()
            .filter_map(|id| records.iter().find(|r| r.id == *id).cloned())
            .collect())
    }

    fn find_by_id(&self, id: i64) -> Result<Option<RuleRecord>> {
        Ok(self.records.lock().iter().find(|r| r.id == id).cloned())
    }

    fn set_status(&self, id: i64, status: RuleStatus) -> Result<()> {
        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| EngineError::Store(format!("no rule record with id {}", id)))?;
        record.status = status;
        Ok(())
    }

    fn save_compiled_source(&self, id: i64, source: &str) -> Result<()> {
        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| EngineError::Store(format!("no rule record with id {}", id)))?;
        record.compiled_source = Some(source.to_string());
        Ok(())
    }
}

/// In-memory container-version store
#[derive(Default)]
pub struct InMemoryVersionStore {
    versions: Mutex<Vec<ContainerVersion>>,
}

impl InMemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All persisted versions, for test assertions
    pub fn all(&self) -> Vec<ContainerVersion> {
        self.versions.lock().clone()
    }
}

impl VersionStore for InMemoryVersionStore {
    fn insert(&self, version: ContainerVersion) -> Result<()> {
        self.versions.lock().push(version);
        Ok(())
    }

    fn latest(&self, record_type: &str) -> Result<Option<ContainerVersion>> {
        Ok(self
            .versions
            .lock()
            .iter()
            .filter(|v| v.record_type == record_type)
            .max_by_key(|v| v.version)
            .cloned())
    }

    fn find(&self, record_type: &str, version: i64) -> Result<Option<ContainerVersion>> {
        Ok(self
            .versions
            .lock()
            .iter()
            .find(|v| v.record_type == record_type && v.version == version)
            .cloned())
    }
}

/// In-memory deployment-snapshot store
#[derive(Default)]
pub struct InMemorySnapshotStore {
    rows: Mutex<Vec<DeploymentSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn insert_all(&self, snapshots: Vec<DeploymentSnapshot>) -> Result<()> {
        self.rows.lock().extend(snapshots);
        Ok(())
    }

    fn find(&self, record_type: &str, container_version: i64) -> Result<Vec<DeploymentSnapshot>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|s| s.record_type == record_type && s.container_version == container_version)
            .cloned()
            .collect())
    }
}

/// In-memory execution-audit store
#[derive(Default)]
pub struct InMemoryAuditStore {
    rows: Mutex<Vec<ExecutionAudit>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All persisted audit rows, for test assertions
    pub fn rows(&self) -> Vec<ExecutionAudit> {
        self.rows.lock().clone()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn insert(&self, audit: ExecutionAudit) -> Result<()> {
        self.rows.lock().push(audit);
        Ok(())
    }
}
