//! Predicate IR
//!
//! The intermediate form between a flattened condition tree and the
//! runtime's source grammar. Only the renderer knows how this IR is
//! spelled in the target grammar.

use arbiter_core::{Combinator, ComparisonOp};

/// A typed comparison literal
///
/// Numeric variants carry the authored text verbatim: integer and decimal
/// values are emitted unquoted exactly as written.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Integer(String),
    Decimal(String),
    Boolean(bool),
    /// Value list for membership operators
    List(Vec<Literal>),
}

/// One rendered comparison: `attribute operator literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Attribute name on the fact or collection element
    pub attribute: String,
    pub operator: ComparisonOp,
    pub literal: Literal,
    /// How this comparison joins its left neighbor
    pub combinator: Combinator,
}

/// Existential sub-pattern over one collection relationship
///
/// All conditions sharing a collection path collapse into a single
/// "exists an element whose fields satisfy ..." pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct SubPattern {
    /// Relation path from the record root (e.g. "applicants.addresses")
    pub relation_path: String,
    /// Element type of the innermost relation
    pub element_type: String,
    /// Joiner applied between all inner comparisons
    pub joiner: Combinator,
    pub items: Vec<Comparison>,
}

/// Compiled predicate for one rule's when clause
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    /// Comparisons against scalar attributes of the record
    pub direct: Vec<Comparison>,
    /// One sub-pattern per distinct collection path, in first-seen order
    pub collections: Vec<SubPattern>,
}

impl Predicate {
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.collections.is_empty()
    }
}
