//! Common test utilities for engine integration tests

use arbiter_core::{
    CatalogSet, ConditionNode, ConditionTree, FieldCatalog, FieldKind, OutputSpec, RuleRecord,
    RuleStatus, Value,
};
use arbiter_engine::runtime::MockRuntime;
use arbiter_engine::store::{
    AuditStore, InMemoryAuditStore, InMemoryRuleStore, InMemorySnapshotStore,
    InMemoryVersionStore, SnapshotStore, VersionStore,
};
use arbiter_engine::{ContainerService, RuleStore};
use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Everything a container lifecycle test needs: the service under test
/// plus handles to the mock runtime and the backing stores
pub struct TestHarness {
    pub runtime: MockRuntime,
    pub rules: Arc<InMemoryRuleStore>,
    pub versions: Arc<InMemoryVersionStore>,
    pub snapshots: Arc<InMemorySnapshotStore>,
    pub audits: Arc<InMemoryAuditStore>,
    pub service: ContainerService,
}

impl TestHarness {
    pub fn new() -> Self {
        let mut catalogs = CatalogSet::new();
        catalogs.insert(loan_catalog());

        let runtime = MockRuntime::new();
        let rules = Arc::new(InMemoryRuleStore::new());
        let versions = Arc::new(InMemoryVersionStore::new());
        let snapshots = Arc::new(InMemorySnapshotStore::new());
        let audits = Arc::new(InMemoryAuditStore::new());

        let service = ContainerService::new(
            Arc::new(runtime.clone()),
            Arc::clone(&rules) as Arc<dyn RuleStore>,
            Arc::clone(&versions) as Arc<dyn VersionStore>,
            Arc::clone(&snapshots) as Arc<dyn SnapshotStore>,
            Arc::clone(&audits) as Arc<dyn AuditStore>,
            catalogs,
        );

        Self {
            runtime,
            rules,
            versions,
            snapshots,
            audits,
            service,
        }
    }

    /// Validate and compile a record through the engine's save path,
    /// then insert it
    pub fn save_rule(&self, record: RuleRecord) -> RuleRecord {
        let prepared = self
            .service
            .prepare_rule(record)
            .expect("rule should validate and compile");
        self.rules.insert(prepared.clone()).unwrap();
        prepared
    }
}

pub fn loan_catalog() -> FieldCatalog {
    FieldCatalog::new("loan", "Loan")
        .with_field("amount", FieldKind::Decimal)
        .with_field("status", FieldKind::Text)
        .with_field("applicants.age", FieldKind::Integer)
        .with_relation("applicants", "Applicant", None)
}

/// An active loan rule with one condition and a flagging output
pub fn active_rule(id: i64, name: &str, priority: i32) -> RuleRecord {
    RuleRecord::new(id, name, "loan")
        .with_priority(priority)
        .with_status(RuleStatus::Active)
        .with_conditions(ConditionTree::all_of(vec![ConditionNode::leaf(
            "loan.amount",
            ">",
            "1000",
        )]))
        .with_output(OutputSpec {
            action: Some("FLAG".to_string()),
            score: Some(BigDecimal::from_str("10").unwrap()),
            ..OutputSpec::default()
        })
}

/// A minimal loan fact
pub fn loan_fact() -> Value {
    let mut map = HashMap::new();
    map.insert("amount".to_string(), Value::Number(2500.0));
    map.insert("status".to_string(), Value::String("OPEN".to_string()));
    Value::Object(map)
}
