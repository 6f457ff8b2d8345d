//! Condition compiler
//!
//! Flattens a condition tree into tuples, partitions them into direct and
//! collection conditions, and builds the predicate IR. Literal typing is
//! directed by the record type's field catalog.

use crate::error::{CompileError, Result};
use crate::ir::{Comparison, Literal, Predicate, SubPattern};
use arbiter_core::{
    Combinator, ComparisonOp, ConditionTree, FieldCatalog, FieldKind, ResolvedField,
};

/// Compile a condition tree into a predicate
///
/// Returns `Ok(None)` for a tree with no usable conditions; the caller
/// must refuse to save or compile such a rule.
pub fn compile_condition(
    tree: &ConditionTree,
    catalog: &FieldCatalog,
) -> Result<Option<Predicate>> {
    let flattened = tree.flatten();
    if flattened.is_empty() {
        return Ok(None);
    }

    let mut predicate = Predicate::default();
    // (relation_path, element_type, comparisons) in first-seen order
    let mut groups: Vec<(String, String, Vec<Comparison>)> = Vec::new();

    for condition in &flattened {
        let operator: ComparisonOp =
            condition
                .operator
                .parse()
                .map_err(|_| CompileError::InvalidOperator {
                    operator: condition.operator.clone(),
                    path: condition.field.clone(),
                })?;

        let resolved =
            catalog
                .resolve(&condition.field)
                .ok_or_else(|| CompileError::UnresolvedField {
                    path: condition.field.clone(),
                    record_type: catalog.record_type.clone(),
                })?;

        match resolved {
            ResolvedField::Direct { attribute, kind } => {
                predicate.direct.push(Comparison {
                    attribute,
                    operator,
                    literal: literal_for(kind, &condition.value, operator),
                    combinator: condition.combinator,
                });
            }
            ResolvedField::Collection {
                relation_path,
                element_type,
                attribute,
                kind,
            } => {
                let comparison = Comparison {
                    attribute,
                    operator,
                    literal: literal_for(kind, &condition.value, operator),
                    combinator: condition.combinator,
                };
                match groups.iter_mut().find(|(path, _, _)| *path == relation_path) {
                    Some((_, _, items)) => items.push(comparison),
                    None => groups.push((relation_path, element_type, vec![comparison])),
                }
            }
        }
    }

    for (relation_path, element_type, items) in groups {
        // Inner joiner for the whole group is the second tuple's
        // combinator; the first tuple's is discarded when the group has
        // two or more members. Singleton groups default to AND.
        let joiner = if items.len() >= 2 {
            let mixed = items.windows(2).any(|w| w[0].combinator != w[1].combinator);
            if mixed {
                tracing::warn!(
                    relation = %relation_path,
                    "collection condition group mixes AND and OR; joining with the second condition's combinator"
                );
            }
            items[1].combinator
        } else {
            Combinator::And
        };

        predicate.collections.push(SubPattern {
            relation_path,
            element_type,
            joiner,
            items,
        });
    }

    Ok(Some(predicate))
}

/// Build a typed literal from authored value text
///
/// Integer and decimal values are carried verbatim and emitted unquoted;
/// booleans are emitted as their literal text; everything else is quoted
/// by the renderer. Membership operators split the value on commas into
/// a list literal.
fn literal_for(kind: FieldKind, value: &str, operator: ComparisonOp) -> Literal {
    if operator.is_membership() {
        return Literal::List(
            value
                .split(',')
                .map(|item| scalar_literal(kind, item.trim()))
                .collect(),
        );
    }
    scalar_literal(kind, value)
}

fn scalar_literal(kind: FieldKind, value: &str) -> Literal {
    match kind {
        FieldKind::Integer => Literal::Integer(value.trim().to_string()),
        FieldKind::Decimal => Literal::Decimal(value.trim().to_string()),
        FieldKind::Boolean => match value.trim().to_ascii_lowercase().as_str() {
            "true" => Literal::Boolean(true),
            "false" => Literal::Boolean(false),
            _ => Literal::Text(value.to_string()),
        },
        FieldKind::Text => Literal::Text(value.to_string()),
    }
}
