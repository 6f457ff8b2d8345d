//! Rule source assembly
//!
//! Produces one compilation unit per record type: a fixed header
//! (namespace, imports derived from the field catalog, the shared
//! accumulator global) followed by one named block per included rule.
//!
//! Rule blocks are produced once at save time by `compile_rule` and
//! stored on the record; the assembler reuses stored source verbatim by
//! extracting just the rule block. A record whose source is missing gets
//! a minimal no-op block so a single bad rule cannot abort the build.

use crate::condition::compile_condition;
use crate::error::{CompileError, Result};
use crate::output::compile_output;
use crate::render::{MatchDslRenderer, SourceRenderer};
use arbiter_core::{FieldCatalog, RuleRecord};

/// Compile one rule record into its complete source block
///
/// This is the save-time producer of `RuleRecord::compiled_source`.
pub fn compile_rule(record: &RuleRecord, catalog: &FieldCatalog) -> Result<String> {
    let predicate = compile_condition(&record.conditions, catalog)?.ok_or_else(|| {
        CompileError::EmptyConditions {
            rule: record.name.clone(),
        }
    })?;

    let when = MatchDslRenderer.render_when(&catalog.fact_type, Some(&predicate));
    let then = compile_output(record.output.as_ref(), record.id, &record.name);

    Ok(format!(
        "rule \"{}\" salience {}\nwhen\n    {}\nthen\n    {}\nend",
        block_name(record),
        record.priority,
        when,
        then
    ))
}

/// Assemble the compilation unit for a record type
pub fn assemble_source(catalog: &FieldCatalog, rules: &[RuleRecord]) -> String {
    let mut unit = header(catalog);

    for rule in rules {
        unit.push('\n');
        match rule.compiled_source.as_deref().and_then(extract_rule_block) {
            Some(block) => unit.push_str(block),
            None => {
                tracing::warn!(
                    rule_id = rule.id,
                    rule_name = %rule.name,
                    "rule has no compiled source; substituting a no-op block"
                );
                unit.push_str(&fallback_block(rule));
            }
        }
        unit.push('\n');
    }

    unit
}

/// The fixed unit header: namespace, imports, accumulator global
fn header(catalog: &FieldCatalog) -> String {
    let mut out = format!("package rules.{}\n\n", catalog.record_type);
    for name in catalog.imports() {
        out.push_str(&format!("import model.{}\n", name));
    }
    out.push_str("import runtime.Hit\nimport runtime.HitList\n\nglobal HitList hits\n");
    out
}

/// Block name for a rule: sanitized name suffixed with the record id
fn block_name(record: &RuleRecord) -> String {
    let sanitized: String = record
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}", sanitized, record.id)
}

/// Extract just the rule block from stored source, stripping any
/// embedded header a legacy save may have written
fn extract_rule_block(source: &str) -> Option<&str> {
    source.find("rule \"").map(|idx| source[idx..].trim_end())
}

/// Minimal block that never matches and emits nothing
fn fallback_block(record: &RuleRecord) -> String {
    format!(
        "rule \"fallback_{}\" salience 0\nwhen\n    eval( false )\nthen\nend",
        record.id
    )
}
