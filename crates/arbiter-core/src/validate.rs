//! Rule validation
//!
//! Runs before compilation: a record that fails here is rejected by the
//! caller and never reaches the compiler or the runtime.

use crate::catalog::{FieldCatalog, ResolvedField};
use crate::condition::Combinator;
use crate::error::ValidationError;
use crate::operator::ComparisonOp;
use crate::rule::RuleRecord;

/// Non-fatal findings surfaced at authoring time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// A collection-condition group mixes AND and OR combinators; the
    /// compiler will join the whole group with the second tuple's
    /// combinator for compatibility with deployed rules.
    MixedCombinators { relation_path: String },
}

/// Validate a rule record against its record type's field catalog
///
/// Returns warnings on success. Errors are reported immediately and the
/// rule must not be saved or compiled.
pub fn validate_rule(
    record: &RuleRecord,
    catalog: &FieldCatalog,
) -> Result<Vec<ValidationWarning>, ValidationError> {
    if record.conditions.is_empty() {
        return Err(ValidationError::EmptyConditions {
            rule: record.name.clone(),
        });
    }

    let flattened = record.conditions.flatten();

    // Collect per-relation combinators to detect mixed groups
    let mut relation_combinators: Vec<(String, Vec<Combinator>)> = Vec::new();

    for condition in &flattened {
        if condition.operator.trim().is_empty() {
            return Err(ValidationError::MissingOperator {
                path: condition.field.clone(),
            });
        }
        if condition.operator.parse::<ComparisonOp>().is_err() {
            return Err(ValidationError::UnknownOperator {
                operator: condition.operator.clone(),
                path: condition.field.clone(),
            });
        }
        if condition.value.trim().is_empty() {
            return Err(ValidationError::MissingValue {
                path: condition.field.clone(),
            });
        }

        match catalog.resolve(&condition.field) {
            None => {
                return Err(ValidationError::UnknownField {
                    path: condition.field.clone(),
                    record_type: record.record_type.clone(),
                })
            }
            Some(ResolvedField::Collection { relation_path, .. }) => {
                match relation_combinators.iter_mut().find(|(p, _)| *p == relation_path) {
                    Some((_, combinators)) => combinators.push(condition.combinator),
                    None => relation_combinators.push((relation_path, vec![condition.combinator])),
                }
            }
            Some(ResolvedField::Direct { .. }) => {}
        }
    }

    if record.output.is_none() {
        return Err(ValidationError::EmptyOutput {
            rule: record.name.clone(),
        });
    }

    let warnings = relation_combinators
        .into_iter()
        .filter(|(_, combinators)| {
            combinators.len() > 1 && combinators.windows(2).any(|w| w[0] != w[1])
        })
        .map(|(relation_path, _)| ValidationWarning::MixedCombinators { relation_path })
        .collect();

    Ok(warnings)
}
