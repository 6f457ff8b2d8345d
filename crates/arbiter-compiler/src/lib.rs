//! ARBITER Compiler - condition/output compilation and rule source assembly
//!
//! Turns structured rule records into compilation units for the embedded
//! pattern-matching runtime:
//! - the condition compiler flattens a condition tree into a predicate IR;
//! - the output compiler produces the emission block for a matched rule;
//! - the renderer is the only component coupled to the runtime's grammar;
//! - the assembler combines a fixed header with one block per rule.

pub mod assemble;
pub mod condition;
pub mod error;
pub mod ir;
pub mod output;
pub mod render;

pub use assemble::{assemble_source, compile_rule};
pub use condition::compile_condition;
pub use error::{CompileError, Result};
pub use ir::{Comparison, Literal, Predicate, SubPattern};
pub use output::compile_output;
pub use render::{MatchDslRenderer, SourceRenderer};
