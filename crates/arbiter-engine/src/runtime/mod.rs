//! The pattern-matching runtime boundary
//!
//! The embedded runtime is external to this engine and treated as a black
//! box with four operations: compile a source unit into a module, open an
//! evaluation session from a module, execute a fact in a session, and
//! dispose a module. Hits produced during execution land in a shared
//! per-evaluation accumulator installed as the session's global.

pub mod mock;

pub use mock::MockRuntime;

use crate::error::Result;
use arbiter_core::Value;
use bigdecimal::BigDecimal;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Diagnostics returned when the runtime rejects a compilation unit
#[derive(Debug, Clone, Default)]
pub struct CompileDiagnostics {
    pub messages: Vec<String>,
}

impl CompileDiagnostics {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    /// All diagnostic messages as one text block
    pub fn text(&self) -> String {
        self.messages.join("\n")
    }
}

impl fmt::Display for CompileDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// The external pattern-matching runtime
pub trait MatchRuntime: Send + Sync {
    /// Compile a source unit into an executable module
    fn compile(
        &self,
        source: &str,
    ) -> std::result::Result<Box<dyn CompiledModule>, CompileDiagnostics>;
}

/// A compiled rule module held by a container
pub trait CompiledModule: Send + Sync {
    /// Open a fresh evaluation session
    fn open_session(&self) -> Result<Box<dyn MatchSession>>;

    /// Release the module's resources
    ///
    /// Callers log and swallow failures: disposal must never block a swap
    /// that has already installed a replacement.
    fn dispose(&self) -> Result<()>;
}

/// One evaluation session
pub trait MatchSession: Send {
    /// Install the shared hit accumulator as the session's global
    fn set_accumulator(&mut self, accumulator: HitAccumulator);

    /// Execute one fact against the session's rules
    fn execute(&mut self, fact: &Value) -> Result<()>;
}

/// One fired rule's output during an evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Hit {
    /// Action tag, conventionally APPROVE/REJECT/FLAG/REVIEW/HOLD
    pub action: String,

    /// Human-readable result text
    pub result_text: String,

    /// Score contribution
    pub score: BigDecimal,

    /// Flag/category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,

    /// Referenced document type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,

    /// Referenced document id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,

    /// Description, carrying the hidden rule-identity marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Hit {
    /// Create a hit with the given action and result text
    pub fn new(action: impl Into<String>, result_text: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            result_text: result_text.into(),
            ..Self::default()
        }
    }

    /// Set the score
    pub fn with_score(mut self, score: impl Into<BigDecimal>) -> Self {
        self.score = score.into();
        self
    }

    /// Set the flag
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Shared per-evaluation hit accumulator
///
/// A cloneable handle over one locked hit list: the engine installs a
/// fresh accumulator into each session and drains it after execution.
#[derive(Debug, Clone, Default)]
pub struct HitAccumulator {
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl HitAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fired rule's hit
    pub fn add(&self, hit: Hit) {
        self.hits.lock().push(hit);
    }

    /// Take all accumulated hits, leaving the accumulator empty
    pub fn drain(&self) -> Vec<Hit> {
        std::mem::take(&mut *self.hits.lock())
    }

    pub fn len(&self) -> usize {
        self.hits.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
