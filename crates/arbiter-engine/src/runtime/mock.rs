//! Scriptable in-process match runtime
//!
//! Stands in for the embedded runtime in tests and demos: it does not
//! parse the generated source, it records it, and emits pre-scripted hits
//! for modules whose source contains a given marker. Compilation failures
//! and execution failures can be injected the same way.

use super::{CompileDiagnostics, CompiledModule, Hit, HitAccumulator, MatchRuntime, MatchSession};
use crate::error::{EngineError, Result};
use arbiter_core::Value;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct MockState {
    reject_marker: Mutex<Option<String>>,
    fail_execution_marker: Mutex<Option<String>>,
    scripts: Mutex<Vec<(String, Vec<Hit>)>>,
    compiled_sources: Mutex<Vec<String>>,
    sessions_opened: AtomicUsize,
    disposed: AtomicUsize,
}

/// Scriptable runtime implementation
#[derive(Clone, Default)]
pub struct MockRuntime {
    state: Arc<MockState>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any source containing the marker at compile time
    pub fn reject_sources_containing(&self, marker: impl Into<String>) {
        *self.state.reject_marker.lock() = Some(marker.into());
    }

    /// Stop rejecting sources
    pub fn clear_rejection(&self) {
        *self.state.reject_marker.lock() = None;
    }

    /// Make sessions of modules whose source contains the marker fail on execute
    pub fn fail_execution_for(&self, marker: impl Into<String>) {
        *self.state.fail_execution_marker.lock() = Some(marker.into());
    }

    /// Modules compiled from source containing the marker emit these hits
    /// on every execution
    pub fn script_hits(&self, source_marker: impl Into<String>, hits: Vec<Hit>) {
        self.state.scripts.lock().push((source_marker.into(), hits));
    }

    /// Every source unit compiled so far, oldest first
    pub fn compiled_sources(&self) -> Vec<String> {
        self.state.compiled_sources.lock().clone()
    }

    pub fn sessions_opened(&self) -> usize {
        self.state.sessions_opened.load(Ordering::SeqCst)
    }

    pub fn disposed_count(&self) -> usize {
        self.state.disposed.load(Ordering::SeqCst)
    }
}

impl MatchRuntime for MockRuntime {
    fn compile(
        &self,
        source: &str,
    ) -> std::result::Result<Box<dyn CompiledModule>, CompileDiagnostics> {
        if let Some(marker) = self.state.reject_marker.lock().as_deref() {
            if source.contains(marker) {
                return Err(CompileDiagnostics::new(format!(
                    "unexpected token near '{}'",
                    marker
                )));
            }
        }

        self.state.compiled_sources.lock().push(source.to_string());

        let hits = self
            .state
            .scripts
            .lock()
            .iter()
            .filter(|(marker, _)| source.contains(marker))
            .flat_map(|(_, hits)| hits.iter().cloned())
            .collect();

        let fail_execution = self
            .state
            .fail_execution_marker
            .lock()
            .as_deref()
            .is_some_and(|marker| source.contains(marker));

        Ok(Box::new(MockModule {
            hits,
            fail_execution,
            disposed: AtomicBool::new(false),
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockModule {
    hits: Vec<Hit>,
    fail_execution: bool,
    disposed: AtomicBool,
    state: Arc<MockState>,
}

impl CompiledModule for MockModule {
    fn open_session(&self) -> Result<Box<dyn MatchSession>> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(EngineError::Runtime("module already disposed".to_string()));
        }
        self.state.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            hits: self.hits.clone(),
            fail_execution: self.fail_execution,
            accumulator: None,
        }))
    }

    fn dispose(&self) -> Result<()> {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            self.state.disposed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

struct MockSession {
    hits: Vec<Hit>,
    fail_execution: bool,
    accumulator: Option<HitAccumulator>,
}

impl MatchSession for MockSession {
    fn set_accumulator(&mut self, accumulator: HitAccumulator) {
        self.accumulator = Some(accumulator);
    }

    fn execute(&mut self, _fact: &Value) -> Result<()> {
        if self.fail_execution {
            return Err(EngineError::Runtime("scripted execution failure".to_string()));
        }
        if let Some(accumulator) = &self.accumulator {
            for hit in &self.hits {
                accumulator.add(hit.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact() -> Value {
        Value::Object(Default::default())
    }

    #[test]
    fn test_scripted_hits_reach_the_accumulator() {
        let runtime = MockRuntime::new();
        runtime.script_hits("package rules.loan", vec![Hit::new("FLAG", "matched")]);

        let module = runtime.compile("package rules.loan\n").unwrap();
        let mut session = module.open_session().unwrap();
        let accumulator = HitAccumulator::new();
        session.set_accumulator(accumulator.clone());
        session.execute(&fact()).unwrap();

        assert_eq!(accumulator.len(), 1);
        assert_eq!(runtime.sessions_opened(), 1);
        assert_eq!(runtime.compiled_sources().len(), 1);
    }

    #[test]
    fn test_rejection() {
        let runtime = MockRuntime::new();
        runtime.reject_sources_containing("bad_token");

        assert!(runtime.compile("rule with bad_token inside").is_err());
        runtime.clear_rejection();
        assert!(runtime.compile("rule with bad_token inside").is_ok());
    }

    #[test]
    fn test_dispose_blocks_new_sessions() {
        let runtime = MockRuntime::new();
        let module = runtime.compile("unit").unwrap();

        module.dispose().unwrap();
        assert!(module.open_session().is_err());
        assert_eq!(runtime.disposed_count(), 1);

        // Dispose is idempotent
        module.dispose().unwrap();
        assert_eq!(runtime.disposed_count(), 1);
    }

    #[test]
    fn test_scripted_execution_failure() {
        let runtime = MockRuntime::new();
        runtime.fail_execution_for("loan");

        let module = runtime.compile("package rules.loan").unwrap();
        let mut session = module.open_session().unwrap();
        assert!(session.execute(&fact()).is_err());
    }
}
