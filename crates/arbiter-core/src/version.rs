//! Container versioning and deployment snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One deployed version of a record type's compiled rule set
///
/// Created only on deploy, never on refresh. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerVersion {
    /// Record-type tag this container serves
    pub record_type: String,

    /// Per-record-type monotonically increasing version number
    pub version: i64,

    /// Content hash of the compiled rule set
    pub content_hash: String,

    /// The runtime's module identifier for this build
    pub release_id: String,

    /// Ids of the rule records included, in evaluation order
    pub rule_ids: Vec<i64>,

    /// Human change summary
    pub change_summary: String,

    /// Structured diff against the prior version
    pub diff: ContainerDiff,

    /// Creation metadata
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// Diff between two container versions, keyed by logical rule identity
///
/// Comparing logical identities classifies a new edit-version of an
/// existing rule as "updated" rather than "added + removed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContainerDiff {
    pub added: Vec<RuleDelta>,
    pub removed: Vec<RuleDelta>,
    pub updated: Vec<RuleDelta>,
}

/// One rule's entry in a container diff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDelta {
    pub logical_id: i64,
    pub rule_id: i64,
    pub name: String,
}

/// One (container version, rule record) pair captured at deploy time
///
/// The durable ground truth for rollback: which record, at which of its
/// own versions, with which priority, was live at that deployment —
/// independent of later edits to the rule record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSnapshot {
    pub record_type: String,
    pub container_version: i64,
    pub rule_id: i64,
    pub rule_version: i32,
    pub priority: i32,
}

impl ContainerDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }

    /// Short human summary, e.g. "2 added, 1 removed, 0 updated"
    pub fn summary(&self) -> String {
        format!(
            "{} added, {} removed, {} updated",
            self.added.len(),
            self.removed.len(),
            self.updated.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(logical_id: i64, rule_id: i64, name: &str) -> RuleDelta {
        RuleDelta {
            logical_id,
            rule_id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_diff_summary() {
        let diff = ContainerDiff {
            added: vec![delta(1, 1, "A"), delta(2, 2, "B")],
            removed: vec![delta(3, 3, "C")],
            updated: vec![],
        };
        assert_eq!(diff.summary(), "2 added, 1 removed, 0 updated");
        assert!(!diff.is_empty());
        assert!(ContainerDiff::default().is_empty());
    }

    #[test]
    fn test_container_version_serde() {
        let version = ContainerVersion {
            record_type: "loan".to_string(),
            version: 3,
            content_hash: "abc123".to_string(),
            release_id: "rel_20250101000000_00ff00".to_string(),
            rule_ids: vec![4, 9],
            change_summary: "1 added, 0 removed, 0 updated".to_string(),
            diff: ContainerDiff::default(),
            created_at: Utc::now(),
            created_by: "system".to_string(),
        };

        let json = serde_json::to_string(&version).unwrap();
        let decoded: ContainerVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(version, decoded);
    }
}
