//! Comparison operators for rule conditions
//!
//! The condition grammar is deliberately fixed: field comparisons only,
//! no arbitrary expressions. Operators are stored as authored text on the
//! condition leaf and parsed into this enum at validation/compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// String containment
    Contains,
    /// Negated string containment
    NotContains,
    /// Membership in a value list
    In,
    /// Negated membership
    NotIn,
}

impl ComparisonOp {
    /// The token this operator renders to in the match-runtime grammar
    pub fn token(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Contains => "contains",
            ComparisonOp::NotContains => "not contains",
            ComparisonOp::In => "in",
            ComparisonOp::NotIn => "not in",
        }
    }

    /// Returns true for operators whose right-hand side is a value list
    pub fn is_membership(&self) -> bool {
        matches!(self, ComparisonOp::In | ComparisonOp::NotIn)
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ComparisonOp {
    type Err = ();

    /// Parse authored operator text. Both symbolic and word forms are
    /// accepted since rule authoring tools have emitted both over time.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "==" | "=" | "eq" | "equals" => Ok(ComparisonOp::Eq),
            "!=" | "<>" | "ne" | "not_equals" => Ok(ComparisonOp::Ne),
            ">" | "gt" => Ok(ComparisonOp::Gt),
            ">=" | "ge" | "gte" => Ok(ComparisonOp::Ge),
            "<" | "lt" => Ok(ComparisonOp::Lt),
            "<=" | "le" | "lte" => Ok(ComparisonOp::Le),
            "contains" => Ok(ComparisonOp::Contains),
            "not contains" | "not_contains" => Ok(ComparisonOp::NotContains),
            "in" => Ok(ComparisonOp::In),
            "not in" | "not_in" => Ok(ComparisonOp::NotIn),
            _ => Err(()),
        }
    }
}
