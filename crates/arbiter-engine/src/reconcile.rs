//! Result-rule reconciliation
//!
//! Maps fired hits back to their originating rule records and persists
//! one audit row per matched rule. Attribution prefers the hidden
//! `RULE_ID:<id>` marker in the hit description; hits without a marker
//! (legacy rules) fall back to name-substring matching against the
//! hit's result text. Misses are logged and skipped: audit bookkeeping
//! never fails the evaluation.

use crate::error::EngineError;
use crate::runtime::Hit;
use crate::store::{AuditStore, ExecutionAudit, RuleStore};
use arbiter_core::RuleRecord;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

/// The marker the output compiler appends to every hit description
const RULE_ID_MARKER: &str = "RULE_ID:";

/// Reconciles evaluation hits against the rule-record store
pub struct Reconciler {
    rules: Arc<dyn RuleStore>,
    audits: Arc<dyn AuditStore>,
}

impl Reconciler {
    pub fn new(rules: Arc<dyn RuleStore>, audits: Arc<dyn AuditStore>) -> Self {
        Self { rules, audits }
    }

    /// Reconcile the hits of one evaluation, returning the number of
    /// audit rows written
    pub fn reconcile(&self, record_type: &str, business_ref: &str, hits: &[Hit]) -> usize {
        let mut matched: HashSet<i64> = HashSet::new();
        let mut written = 0;

        // First pass: attribute by the hidden rule-identity marker
        for hit in hits {
            let Some(rule_id) = hit.description.as_deref().and_then(extract_rule_id) else {
                continue;
            };
            match self.rules.find_by_id(rule_id) {
                Ok(Some(rule)) if rule.record_type == record_type && rule.is_deployable() => {
                    if matched.insert(rule.id) {
                        written += self.persist(business_ref, &rule, hit);
                    }
                }
                Ok(_) => {
                    tracing::warn!(
                        rule_id,
                        record_type,
                        "hit carries a rule marker but no active latest rule matches; skipping audit row"
                    );
                }
                Err(e) => {
                    tracing::warn!(rule_id, error = %e, "rule lookup failed during reconciliation");
                }
            }
        }

        // Second pass: legacy hits without a marker match by rule name.
        // A rule already reconciled by id is never reconciled again.
        let active = match self.rules.find_active_latest(record_type) {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(record_type, error = %e, "rule listing failed during reconciliation");
                return written;
            }
        };
        for hit in hits {
            if hit.description.as_deref().and_then(extract_rule_id).is_some() {
                continue;
            }
            for rule in &active {
                if !matched.contains(&rule.id)
                    && !rule.name.is_empty()
                    && hit.result_text.contains(&rule.name)
                {
                    matched.insert(rule.id);
                    written += self.persist(business_ref, rule, hit);
                }
            }
        }

        written
    }

    fn persist(&self, business_ref: &str, rule: &RuleRecord, hit: &Hit) -> usize {
        let audit = ExecutionAudit {
            business_ref: business_ref.to_string(),
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            matched: true,
            action: hit.action.clone(),
            result_text: hit.result_text.clone(),
            score: hit.score.clone(),
            recorded_at: Utc::now(),
        };
        match self.audits.insert(audit) {
            Ok(()) => 1,
            Err(e) => {
                log_persist_failure(rule.id, &e);
                0
            }
        }
    }
}

fn log_persist_failure(rule_id: i64, error: &EngineError) {
    tracing::warn!(rule_id, error = %error, "failed to persist execution audit row");
}

/// Extract the rule id from a `RULE_ID:<id>` marker in a description
fn extract_rule_id(description: &str) -> Option<i64> {
    let start = description.find(RULE_ID_MARKER)? + RULE_ID_MARKER.len();
    let digits: String = description[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
