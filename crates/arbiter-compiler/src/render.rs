//! Renderer for the match-runtime source grammar
//!
//! The only component coupled to the external runtime's syntax. Everything
//! upstream works on the predicate IR; swapping the target grammar means
//! swapping the renderer.

use crate::ir::{Comparison, Literal, Predicate};
use arbiter_core::Combinator;

/// The binding variable for the matched record in generated patterns
pub const FACT_BINDING: &str = "$rec";

/// Turns predicate IR into when-clause source text
pub trait SourceRenderer {
    /// Render the full when clause for a predicate
    ///
    /// `None` renders the always-true pattern (a bare fact match with no
    /// constraints).
    fn render_when(&self, fact_type: &str, predicate: Option<&Predicate>) -> String;
}

/// Renderer for the embedded runtime's pattern grammar
///
/// Direct conditions become constraints on the fact pattern; a comma is
/// the grammar's native "all true" joiner, `||` its disjunction. Each
/// collection group becomes one existential sub-pattern reached through
/// the relation path.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchDslRenderer;

impl SourceRenderer for MatchDslRenderer {
    fn render_when(&self, fact_type: &str, predicate: Option<&Predicate>) -> String {
        let empty = Predicate::default();
        let predicate = predicate.unwrap_or(&empty);

        let mut lines = Vec::with_capacity(1 + predicate.collections.len());

        let constraints = join_direct(&predicate.direct);
        if constraints.is_empty() {
            lines.push(format!("{} : {}( )", FACT_BINDING, fact_type));
        } else {
            lines.push(format!("{} : {}( {} )", FACT_BINDING, fact_type, constraints));
        }

        for group in &predicate.collections {
            let separator = joiner_separator(group.joiner);
            let inner = group
                .items
                .iter()
                .map(render_comparison)
                .collect::<Vec<_>>()
                .join(separator);
            lines.push(format!(
                "exists {}( {} ) from {}.{}",
                group.element_type, inner, FACT_BINDING, group.relation_path
            ));
        }

        lines.join("\n    ")
    }
}

/// Join direct constraints
///
/// A uniform AND run uses the native comma joiner, a uniform OR run the
/// disjunction operator; mixed runs fall back to explicit `&&`/`||` at
/// each tuple boundary, preserving authored order left to right.
fn join_direct(items: &[Comparison]) -> String {
    if items.len() <= 1 {
        return items.first().map(render_comparison).unwrap_or_default();
    }

    let tail = &items[1..];
    if tail.iter().all(|c| c.combinator == Combinator::And) {
        items.iter().map(render_comparison).collect::<Vec<_>>().join(", ")
    } else if tail.iter().all(|c| c.combinator == Combinator::Or) {
        items.iter().map(render_comparison).collect::<Vec<_>>().join(" || ")
    } else {
        let mut out = render_comparison(&items[0]);
        for item in tail {
            out.push_str(match item.combinator {
                Combinator::And => " && ",
                Combinator::Or => " || ",
            });
            out.push_str(&render_comparison(item));
        }
        out
    }
}

fn joiner_separator(joiner: Combinator) -> &'static str {
    match joiner {
        Combinator::And => ", ",
        Combinator::Or => " || ",
    }
}

fn render_comparison(comparison: &Comparison) -> String {
    format!(
        "{} {} {}",
        comparison.attribute,
        comparison.operator.token(),
        render_literal(&comparison.literal)
    )
}

fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Text(s) => format!("\"{}\"", escape_pattern(s)),
        Literal::Integer(s) | Literal::Decimal(s) => s.clone(),
        Literal::Boolean(b) => b.to_string(),
        Literal::List(items) => {
            let rendered = items.iter().map(render_literal).collect::<Vec<_>>().join(", ");
            format!("( {} )", rendered)
        }
    }
}

/// Escape a string literal for a when-clause pattern
fn escape_pattern(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape a string literal for an emission statement
///
/// Emission blocks additionally need control characters escaped since
/// authored result texts and descriptions may span lines.
pub(crate) fn escape_statement(s: &str) -> String {
    escape_pattern(s)
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::ComparisonOp;

    fn comparison(attribute: &str, operator: ComparisonOp, literal: Literal, combinator: Combinator) -> Comparison {
        Comparison {
            attribute: attribute.to_string(),
            operator,
            literal,
            combinator,
        }
    }

    #[test]
    fn test_single_condition_no_wrapper() {
        let predicate = Predicate {
            direct: vec![comparison(
                "amount",
                ComparisonOp::Gt,
                Literal::Decimal("1000".to_string()),
                Combinator::And,
            )],
            collections: vec![],
        };

        let when = MatchDslRenderer.render_when("Loan", Some(&predicate));
        assert_eq!(when, "$rec : Loan( amount > 1000 )");
    }

    #[test]
    fn test_and_run_uses_comma() {
        let predicate = Predicate {
            direct: vec![
                comparison("amount", ComparisonOp::Gt, Literal::Decimal("1000".into()), Combinator::And),
                comparison("status", ComparisonOp::Eq, Literal::Text("OPEN".into()), Combinator::And),
            ],
            collections: vec![],
        };

        let when = MatchDslRenderer.render_when("Loan", Some(&predicate));
        assert_eq!(when, r#"$rec : Loan( amount > 1000, status == "OPEN" )"#);
    }

    #[test]
    fn test_or_run_uses_disjunction() {
        let predicate = Predicate {
            direct: vec![
                comparison("status", ComparisonOp::Eq, Literal::Text("OPEN".into()), Combinator::Or),
                comparison("status", ComparisonOp::Eq, Literal::Text("REVIEW".into()), Combinator::Or),
            ],
            collections: vec![],
        };

        let when = MatchDslRenderer.render_when("Loan", Some(&predicate));
        assert_eq!(when, r#"$rec : Loan( status == "OPEN" || status == "REVIEW" )"#);
    }

    #[test]
    fn test_mixed_run_uses_explicit_operators() {
        let predicate = Predicate {
            direct: vec![
                comparison("amount", ComparisonOp::Gt, Literal::Decimal("1000".into()), Combinator::And),
                comparison("status", ComparisonOp::Eq, Literal::Text("OPEN".into()), Combinator::Or),
                comparison("term", ComparisonOp::Ge, Literal::Integer("24".into()), Combinator::And),
            ],
            collections: vec![],
        };

        let when = MatchDslRenderer.render_when("Loan", Some(&predicate));
        assert_eq!(
            when,
            r#"$rec : Loan( amount > 1000 || status == "OPEN" && term >= 24 )"#
        );
    }

    #[test]
    fn test_empty_predicate_is_always_true() {
        assert_eq!(MatchDslRenderer.render_when("Loan", None), "$rec : Loan( )");
    }

    #[test]
    fn test_collection_sub_pattern() {
        let predicate = Predicate {
            direct: vec![],
            collections: vec![crate::ir::SubPattern {
                relation_path: "applicants".to_string(),
                element_type: "Applicant".to_string(),
                joiner: Combinator::And,
                items: vec![
                    comparison("age", ComparisonOp::Gt, Literal::Integer("65".into()), Combinator::And),
                    comparison("region", ComparisonOp::Eq, Literal::Text("EU".into()), Combinator::And),
                ],
            }],
        };

        let when = MatchDslRenderer.render_when("Loan", Some(&predicate));
        assert_eq!(
            when,
            "$rec : Loan( )\n    exists Applicant( age > 65, region == \"EU\" ) from $rec.applicants"
        );
    }

    #[test]
    fn test_string_escaping_in_pattern() {
        let predicate = Predicate {
            direct: vec![comparison(
                "status",
                ComparisonOp::Eq,
                Literal::Text(r#"say "hi"\now"#.to_string()),
                Combinator::And,
            )],
            collections: vec![],
        };

        let when = MatchDslRenderer.render_when("Loan", Some(&predicate));
        assert_eq!(when, r#"$rec : Loan( status == "say \"hi\"\\now" )"#);
    }

    #[test]
    fn test_membership_list_rendering() {
        let predicate = Predicate {
            direct: vec![comparison(
                "status",
                ComparisonOp::In,
                Literal::List(vec![
                    Literal::Text("OPEN".into()),
                    Literal::Text("REVIEW".into()),
                ]),
                Combinator::And,
            )],
            collections: vec![],
        };

        let when = MatchDslRenderer.render_when("Loan", Some(&predicate));
        assert_eq!(when, r#"$rec : Loan( status in ( "OPEN", "REVIEW" ) )"#);
    }

    #[test]
    fn test_statement_escaping() {
        assert_eq!(
            escape_statement("line1\nline2\tend"),
            "line1\\nline2\\tend"
        );
    }
}
