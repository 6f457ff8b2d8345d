//! Rule records and output specifications

use crate::condition::ConditionTree;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a rule record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleStatus {
    Draft,
    Active,
    Inactive,
}

/// A versioned business rule
///
/// Records are mutated on edit either in place or via a new version row
/// pointing at its parent. They are never hard-deleted while referenced
/// by a deployment snapshot; exclusion happens through status/is_latest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Unique record id
    pub id: i64,

    /// Human-readable name
    pub name: String,

    /// Record-type tag this rule targets
    pub record_type: String,

    /// Evaluation priority; becomes the rule block's salience
    pub priority: i32,

    /// Lifecycle status
    pub status: RuleStatus,

    /// Condition tree
    pub conditions: ConditionTree,

    /// Output specification
    pub output: Option<OutputSpec>,

    /// Source text produced at save time, reused verbatim by the assembler
    pub compiled_source: Option<String>,

    /// Version number within this rule's edit chain
    pub version: i32,

    /// Root record of the edit chain, if this is an edit-version
    pub parent_id: Option<i64>,

    /// Whether this is the newest version of its chain
    pub is_latest: bool,
}

/// What a rule emits when it matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OutputSpec {
    /// Action tag; conventionally APPROVE/REJECT/FLAG/REVIEW/HOLD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Human-readable result text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_text: Option<String>,

    /// Score contribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<BigDecimal>,

    /// Flag/category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,

    /// Referenced document type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,

    /// Referenced document id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,

    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RuleRecord {
    /// Create a new draft rule
    pub fn new(id: i64, name: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            record_type: record_type.into(),
            priority: 0,
            status: RuleStatus::Draft,
            conditions: ConditionTree::default(),
            output: None,
            compiled_source: None,
            version: 1,
            parent_id: None,
            is_latest: true,
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the lifecycle status
    pub fn with_status(mut self, status: RuleStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the condition tree
    pub fn with_conditions(mut self, conditions: ConditionTree) -> Self {
        self.conditions = conditions;
        self
    }

    /// Set the output specification
    pub fn with_output(mut self, output: OutputSpec) -> Self {
        self.output = Some(output);
        self
    }

    /// Logical identity of the rule across its edit chain: the record's
    /// own id if it is the root, otherwise the stored parent id. Diffing,
    /// rollback, and reconciliation all use this, never re-derive it.
    pub fn logical_id(&self) -> i64 {
        self.parent_id.unwrap_or(self.id)
    }

    /// Create the next edit-version of this rule
    ///
    /// The new record carries the chain's logical identity as its parent
    /// and takes over the is_latest flag; the caller is responsible for
    /// clearing it on this record when persisting both.
    pub fn new_edit(&self, new_id: i64) -> RuleRecord {
        let mut edit = self.clone();
        edit.id = new_id;
        edit.parent_id = Some(self.logical_id());
        edit.version = self.version + 1;
        edit.is_latest = true;
        edit
    }

    /// Whether this record participates in live container builds
    pub fn is_deployable(&self) -> bool {
        self.status == RuleStatus::Active && self.is_latest
    }
}
