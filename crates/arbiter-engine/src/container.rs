//! Versioned container manager
//!
//! Builds, hashes, caches, and atomically swaps per-record-type compiled
//! rule sets, and reconstructs historical versions on demand. One
//! process-wide read/write lock guards the record-type map: evaluations
//! and status reads share the read lock, rebuilds take the write lock
//! for the whole build-and-swap.

use crate::aggregate::{aggregate, EvaluationOutcome};
use crate::error::{EngineError, Result};
use crate::reconcile::Reconciler;
use crate::runtime::{CompiledModule, HitAccumulator, MatchRuntime};
use crate::store::{AuditStore, RuleStore, SnapshotStore, VersionStore};
use arbiter_core::{
    validate_rule, CatalogSet, ContainerDiff, ContainerVersion, DeploymentSnapshot, FieldCatalog,
    RuleDelta, RuleRecord, RuleStatus, Value,
};
use arbiter_compiler::{assemble_source, compile_rule};
use chrono::Utc;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Longest source excerpt carried inside a compilation error
const SOURCE_PREVIEW_CHARS: usize = 400;

/// One live container: the compiled module plus its cached identity
struct ContainerInfo {
    module: Box<dyn CompiledModule>,
    version: i64,
    content_hash: String,
    release_id: String,
}

/// Read-only view of a container's state
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerStatus {
    pub exists: bool,
    pub version: Option<i64>,
    pub content_hash: Option<String>,
    pub release_id: Option<String>,
}

/// Result of the liveness probe
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyReport {
    pub exists: bool,
    pub session_ok: bool,
    pub version: Option<i64>,
    pub release_id: Option<String>,
}

/// Result of re-activating a historical version
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivationReport {
    /// Names of rules deactivated because the target version excludes them
    pub deactivated: Vec<String>,
    /// Names of rules re-activated from the target version
    pub activated: Vec<String>,
    /// Snapshot rule ids whose records no longer exist
    pub not_found: Vec<i64>,
    /// Version created when `create_new_version` was requested
    pub new_version: Option<i64>,
}

/// The versioned container manager
///
/// An injectable, lock-guarded service instance; the record-type map is
/// never exposed, only the operations below.
pub struct ContainerService {
    runtime: Arc<dyn MatchRuntime>,
    rules: Arc<dyn RuleStore>,
    versions: Arc<dyn VersionStore>,
    snapshots: Arc<dyn SnapshotStore>,
    catalogs: CatalogSet,
    reconciler: Reconciler,
    containers: RwLock<HashMap<String, ContainerInfo>>,
}

impl ContainerService {
    pub fn new(
        runtime: Arc<dyn MatchRuntime>,
        rules: Arc<dyn RuleStore>,
        versions: Arc<dyn VersionStore>,
        snapshots: Arc<dyn SnapshotStore>,
        audits: Arc<dyn AuditStore>,
        catalogs: CatalogSet,
    ) -> Self {
        let reconciler = Reconciler::new(Arc::clone(&rules), audits);
        Self {
            runtime,
            rules,
            versions,
            snapshots,
            catalogs,
            reconciler,
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Validate and compile a rule record, returning it with fresh source
    ///
    /// The save path for rule authoring: validation errors are reported
    /// to the caller before anything reaches the runtime, and warnings
    /// are logged. The caller persists the returned record.
    pub fn prepare_rule(&self, mut record: RuleRecord) -> Result<RuleRecord> {
        let catalog = self.catalog(&record.record_type)?;
        for warning in validate_rule(&record, catalog)? {
            tracing::warn!(rule = %record.name, ?warning, "rule validation warning");
        }
        record.compiled_source = Some(compile_rule(&record, catalog)?);
        Ok(record)
    }

    /// Rebuild the live container for a record type from its current
    /// active latest rules
    ///
    /// The module is always rebuilt fresh, but the version number is not
    /// incremented and no version or snapshot rows are written; those
    /// happen only on [`deploy`](Self::deploy).
    pub fn refresh(&self, record_type: &str) -> Result<ContainerStatus> {
        let mut containers = self.containers.write();

        let rules = self.rules.find_active_latest(record_type)?;
        let content_hash = content_fingerprint(&rules);

        let current_version = match containers.get(record_type) {
            Some(info) => info.version,
            None => self
                .versions
                .latest(record_type)?
                .map(|v| v.version)
                .unwrap_or(0),
        };

        if containers
            .get(record_type)
            .is_some_and(|info| info.content_hash == content_hash)
        {
            tracing::debug!(record_type, "content hash unchanged, rebuilding module in place");
        }

        let module = self.build_module(record_type, &rules, current_version)?;
        let info = ContainerInfo {
            module,
            version: current_version,
            content_hash,
            release_id: generate_release_id(record_type),
        };
        self.install(&mut containers, record_type, info);

        tracing::info!(record_type, version = current_version, "container refreshed");
        Ok(status_of(containers.get(record_type)))
    }

    /// Build and persist a new container version
    ///
    /// Always increments the version number, even when the content is
    /// unchanged, and writes one deployment-snapshot row per included
    /// rule plus a version row carrying a logical-identity diff.
    pub fn deploy(&self, record_type: &str, actor: &str, notes: &str) -> Result<ContainerVersion> {
        let mut containers = self.containers.write();

        let rules = self.rules.find_active_latest(record_type)?;
        let prior = self.versions.latest(record_type)?;
        let next_version = prior.as_ref().map(|v| v.version + 1).unwrap_or(1);

        let module = self.build_module(record_type, &rules, next_version)?;
        let content_hash = content_fingerprint(&rules);
        let release_id = generate_release_id(record_type);

        let diff = self.diff_against(record_type, prior.as_ref(), &rules)?;
        let change_summary = if notes.is_empty() {
            diff.summary()
        } else {
            format!("{} ({})", notes, diff.summary())
        };

        let version_row = ContainerVersion {
            record_type: record_type.to_string(),
            version: next_version,
            content_hash: content_hash.clone(),
            release_id: release_id.clone(),
            rule_ids: rules.iter().map(|r| r.id).collect(),
            change_summary,
            diff,
            created_at: Utc::now(),
            created_by: actor.to_string(),
        };
        self.versions.insert(version_row.clone())?;
        self.snapshots.insert_all(
            rules
                .iter()
                .map(|r| DeploymentSnapshot {
                    record_type: record_type.to_string(),
                    container_version: next_version,
                    rule_id: r.id,
                    rule_version: r.version,
                    priority: r.priority,
                })
                .collect(),
        )?;

        let info = ContainerInfo {
            module,
            version: next_version,
            content_hash,
            release_id,
        };
        self.install(&mut containers, record_type, info);

        tracing::info!(
            record_type,
            version = next_version,
            rule_count = version_row.rule_ids.len(),
            "container deployed"
        );
        Ok(version_row)
    }

    /// Refresh every record type that has a registered catalog
    pub fn bootstrap(&self) -> Result<Vec<ContainerStatus>> {
        self.catalogs
            .record_types()
            .into_iter()
            .map(|record_type| self.refresh(&record_type))
            .collect()
    }

    /// Evaluate a fact against the live container
    ///
    /// Returns the empty, zero-score outcome when no container exists
    /// for the record type. Matched hits are reconciled to their source
    /// rules and persisted as audit rows.
    pub fn fire_rules(
        &self,
        record_type: &str,
        business_ref: &str,
        fact: &Value,
    ) -> Result<EvaluationOutcome> {
        let containers = self.containers.read();

        let Some(info) = containers.get(record_type) else {
            tracing::debug!(record_type, "no live container, returning empty outcome");
            return Ok(EvaluationOutcome::empty());
        };

        let accumulator = HitAccumulator::new();
        let mut session = info.module.open_session()?;
        session.set_accumulator(accumulator.clone());
        session.execute(fact)?;

        let outcome = aggregate(accumulator.drain());
        self.reconciler.reconcile(record_type, business_ref, &outcome.hits);
        Ok(outcome)
    }

    /// Evaluate a fact against a historical container version
    ///
    /// Loads the version's exact rule records regardless of their current
    /// status, builds a module scoped to this call, and disposes it on
    /// every path. The live container is never touched; no audit rows are
    /// written for this what-if replay.
    pub fn fire_rules_with_version(
        &self,
        record_type: &str,
        fact: &Value,
        version: i64,
    ) -> Result<EvaluationOutcome> {
        let version_row = self
            .versions
            .find(record_type, version)?
            .ok_or_else(|| EngineError::VersionNotFound {
                record_type: record_type.to_string(),
                version,
            })?;

        let rules = self.rules.find_by_ids(&version_row.rule_ids)?;
        let module = self.build_module(record_type, &rules, version)?;

        let result = (|| {
            let accumulator = HitAccumulator::new();
            let mut session = module.open_session()?;
            session.set_accumulator(accumulator.clone());
            session.execute(fact)?;
            Ok(aggregate(accumulator.drain()))
        })();

        // Request-scoped: the temporary module must not outlive the call,
        // even when execution failed
        if let Err(e) = module.dispose() {
            tracing::warn!(record_type, version, error = %e, "failed to dispose temporary module");
        }

        result
    }

    /// Version of the live container, if one exists
    pub fn get_container_version(&self, record_type: &str) -> Option<i64> {
        self.containers.read().get(record_type).map(|c| c.version)
    }

    /// Release id of the live container's module, if one exists
    pub fn get_container_release_id(&self, record_type: &str) -> Option<String> {
        self.containers
            .read()
            .get(record_type)
            .map(|c| c.release_id.clone())
    }

    /// Read-only view of the live container
    pub fn get_status(&self, record_type: &str) -> ContainerStatus {
        status_of(self.containers.read().get(record_type))
    }

    /// Liveness probe: can a session actually be opened?
    pub fn verify(&self, record_type: &str) -> VerifyReport {
        let containers = self.containers.read();
        match containers.get(record_type) {
            None => VerifyReport {
                exists: false,
                session_ok: false,
                version: None,
                release_id: None,
            },
            Some(info) => VerifyReport {
                exists: true,
                session_ok: info.module.open_session().is_ok(),
                version: Some(info.version),
                release_id: Some(info.release_id.clone()),
            },
        }
    }

    /// Re-activate a previously deployed version
    ///
    /// Deactivates active rules whose logical identity is absent from the
    /// target version, re-activates the target's rules, then deploys a
    /// new version or refreshes in place per `create_new_version`.
    pub fn activate_version(
        &self,
        record_type: &str,
        target_version: i64,
        create_new_version: bool,
        notes: &str,
    ) -> Result<ActivationReport> {
        let target = self
            .versions
            .find(record_type, target_version)?
            .ok_or_else(|| EngineError::VersionNotFound {
                record_type: record_type.to_string(),
                version: target_version,
            })?;

        let target_rules = self.rules.find_by_ids(&target.rule_ids)?;
        let found_ids: HashSet<i64> = target_rules.iter().map(|r| r.id).collect();
        let not_found: Vec<i64> = target
            .rule_ids
            .iter()
            .copied()
            .filter(|id| !found_ids.contains(id))
            .collect();
        let target_logicals: HashSet<i64> =
            target_rules.iter().map(RuleRecord::logical_id).collect();

        let mut deactivated = Vec::new();
        for rule in self.rules.find_active_latest(record_type)? {
            if !target_logicals.contains(&rule.logical_id()) {
                self.rules.set_status(rule.id, RuleStatus::Inactive)?;
                deactivated.push(rule.name);
            }
        }

        let mut activated = Vec::new();
        for rule in &target_rules {
            if rule.status != RuleStatus::Active {
                self.rules.set_status(rule.id, RuleStatus::Active)?;
                activated.push(rule.name.clone());
            }
        }

        let new_version = if create_new_version {
            Some(self.deploy(record_type, "rollback", notes)?.version)
        } else {
            self.refresh(record_type)?;
            None
        };

        tracing::info!(
            record_type,
            target_version,
            deactivated = deactivated.len(),
            activated = activated.len(),
            "historical version activated"
        );
        Ok(ActivationReport {
            deactivated,
            activated,
            not_found,
            new_version,
        })
    }

    fn catalog(&self, record_type: &str) -> Result<&FieldCatalog> {
        self.catalogs
            .get(record_type)
            .ok_or_else(|| EngineError::UnknownRecordType {
                record_type: record_type.to_string(),
            })
    }

    /// Assemble and compile one module; a runtime rejection aborts the
    /// build before any swap, carrying the structured diagnostics
    fn build_module(
        &self,
        record_type: &str,
        rules: &[RuleRecord],
        attempted_version: i64,
    ) -> Result<Box<dyn CompiledModule>> {
        let catalog = self.catalog(record_type)?;
        let source = assemble_source(catalog, rules);
        self.runtime
            .compile(&source)
            .map_err(|diagnostics| EngineError::Compilation {
                record_type: record_type.to_string(),
                attempted_version,
                rule_count: rules.len(),
                diagnostics: diagnostics.text(),
                source_preview: source.chars().take(SOURCE_PREVIEW_CHARS).collect(),
            })
    }

    /// The single mutation point of the record-type map, always under the
    /// write lock; the replaced module is disposed only after the swap
    fn install(
        &self,
        containers: &mut HashMap<String, ContainerInfo>,
        record_type: &str,
        info: ContainerInfo,
    ) {
        if let Some(previous) = containers.insert(record_type.to_string(), info) {
            if let Err(e) = previous.module.dispose() {
                tracing::warn!(record_type, error = %e, "failed to dispose replaced module");
            }
        }
    }

    /// Diff the new rule set against the prior version by logical identity
    fn diff_against(
        &self,
        record_type: &str,
        prior: Option<&ContainerVersion>,
        new_rules: &[RuleRecord],
    ) -> Result<ContainerDiff> {
        let (old_rules, old_snapshots) = match prior {
            Some(version) => (
                self.rules.find_by_ids(&version.rule_ids)?,
                self.snapshots.find(record_type, version.version)?,
            ),
            None => (Vec::new(), Vec::new()),
        };

        let snapshot_by_rule: HashMap<i64, &DeploymentSnapshot> =
            old_snapshots.iter().map(|s| (s.rule_id, s)).collect();
        let old_by_logical: HashMap<i64, &RuleRecord> =
            old_rules.iter().map(|r| (r.logical_id(), r)).collect();
        let new_by_logical: HashMap<i64, &RuleRecord> =
            new_rules.iter().map(|r| (r.logical_id(), r)).collect();

        let mut diff = ContainerDiff::default();
        for (logical_id, new) in &new_by_logical {
            match old_by_logical.get(logical_id) {
                None => diff.added.push(delta(new)),
                Some(old) => {
                    // An edit-version swaps the record id; an in-place edit
                    // shows up against the snapshot's captured state
                    let changed = old.id != new.id
                        || snapshot_by_rule.get(&old.id).is_some_and(|snapshot| {
                            snapshot.rule_version != new.version
                                || snapshot.priority != new.priority
                        });
                    if changed {
                        diff.updated.push(delta(new));
                    }
                }
            }
        }
        for (logical_id, old) in &old_by_logical {
            if !new_by_logical.contains_key(logical_id) {
                diff.removed.push(delta(old));
            }
        }

        diff.added.sort_by_key(|d| d.logical_id);
        diff.removed.sort_by_key(|d| d.logical_id);
        diff.updated.sort_by_key(|d| d.logical_id);
        Ok(diff)
    }
}

fn delta(rule: &RuleRecord) -> RuleDelta {
    RuleDelta {
        logical_id: rule.logical_id(),
        rule_id: rule.id,
        name: rule.name.clone(),
    }
}

fn status_of(info: Option<&ContainerInfo>) -> ContainerStatus {
    match info {
        None => ContainerStatus {
            exists: false,
            version: None,
            content_hash: None,
            release_id: None,
        },
        Some(info) => ContainerStatus {
            exists: true,
            version: Some(info.version),
            content_hash: Some(info.content_hash.clone()),
            release_id: Some(info.release_id.clone()),
        },
    }
}

/// Content hash of a rule set, derived from each included rule's id,
/// compiled source, priority, and active flag
fn content_fingerprint(rules: &[RuleRecord]) -> String {
    let mut hasher = Sha256::new();
    for rule in rules {
        hasher.update(rule.id.to_le_bytes());
        hasher.update(rule.compiled_source.as_deref().unwrap_or("").as_bytes());
        hasher.update(rule.priority.to_le_bytes());
        hasher.update([(rule.status == RuleStatus::Active) as u8]);
        hasher.update([0xff]);
    }
    format!("{:x}", hasher.finalize())
}

/// Module release id: timestamp plus random suffix
/// Format: rel_<type>_YYYYMMDDHHmmss_xxxxxx
fn generate_release_id(record_type: &str) -> String {
    use rand::Rng;

    let datetime = Utc::now().format("%Y%m%d%H%M%S");
    let random: u32 = rand::thread_rng().gen_range(0..0xFFFFFF);
    format!("rel_{}_{}_{:06x}", record_type, datetime, random)
}
