//! Output compiler
//!
//! Produces the emission block of a rule: statements that construct one
//! hit, populate it from the output specification (with defaults), and
//! append it to the shared per-evaluation accumulator. The description
//! always carries a hidden `RULE_ID:<id>` marker so reconciliation can
//! attribute the hit to its source rule without name matching.

use crate::render::escape_statement;
use arbiter_core::OutputSpec;
use bigdecimal::BigDecimal;

/// Default action when the specification names none
pub const DEFAULT_ACTION: &str = "FLAG";

/// Compile an output specification into emission statements
///
/// The returned block's lines are joined with the assembler's statement
/// indentation.
pub fn compile_output(spec: Option<&OutputSpec>, rule_id: i64, rule_name: &str) -> String {
    let empty = OutputSpec::default();
    let spec = spec.unwrap_or(&empty);

    let action = spec.action.as_deref().filter(|a| !a.is_empty()).unwrap_or(DEFAULT_ACTION);
    let result_text = match spec.result_text.as_deref().filter(|t| !t.is_empty()) {
        Some(text) => text.to_string(),
        None => format!("Rule '{}' matched", rule_name),
    };
    let zero = BigDecimal::default();
    let score = spec.score.as_ref().unwrap_or(&zero);

    let marker = format!("RULE_ID:{}", rule_id);
    let description = match spec.description.as_deref().filter(|d| !d.is_empty()) {
        Some(text) => format!("{} {}", text, marker),
        None => marker,
    };

    let mut lines = vec![
        "hit = Hit()".to_string(),
        format!("hit.action = \"{}\"", escape_statement(action)),
        format!("hit.resultText = \"{}\"", escape_statement(&result_text)),
        format!("hit.score = {}", score),
    ];

    if let Some(flag) = spec.flag.as_deref().filter(|f| !f.is_empty()) {
        lines.push(format!("hit.flag = \"{}\"", escape_statement(flag)));
    }
    if let Some(doc_type) = spec.document_type.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("hit.documentType = \"{}\"", escape_statement(doc_type)));
    }
    if let Some(doc_id) = spec.document_id.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("hit.documentId = \"{}\"", escape_statement(doc_id)));
    }

    lines.push(format!("hit.description = \"{}\"", escape_statement(&description)));
    lines.push("hits.add(hit)".to_string());

    lines.join("\n    ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults_for_empty_spec() {
        let block = compile_output(None, 42, "High Value");

        assert!(block.contains("hit.action = \"FLAG\""));
        assert!(block.contains("hit.resultText = \"Rule 'High Value' matched\""));
        assert!(block.contains("hit.score = 0"));
        // Marker stands alone when no description is given
        assert!(block.contains("hit.description = \"RULE_ID:42\""));
        assert!(block.ends_with("hits.add(hit)"));
        // Optional fields are not emitted
        assert!(!block.contains("hit.flag"));
        assert!(!block.contains("hit.documentType"));
    }

    #[test]
    fn test_full_spec() {
        let spec = OutputSpec {
            action: Some("REJECT".to_string()),
            result_text: Some("Amount too high".to_string()),
            score: Some(BigDecimal::from_str("25.50").unwrap()),
            flag: Some("FRAUD".to_string()),
            document_type: Some("policy".to_string()),
            document_id: Some("P-9".to_string()),
            description: Some("exceeds ceiling".to_string()),
        };
        let block = compile_output(Some(&spec), 7, "Ceiling");

        assert!(block.contains("hit.action = \"REJECT\""));
        assert!(block.contains("hit.resultText = \"Amount too high\""));
        assert!(block.contains("hit.score = 25.50"));
        assert!(block.contains("hit.flag = \"FRAUD\""));
        assert!(block.contains("hit.documentType = \"policy\""));
        assert!(block.contains("hit.documentId = \"P-9\""));
        // Marker is appended after the authored description
        assert!(block.contains("hit.description = \"exceeds ceiling RULE_ID:7\""));
    }

    #[test]
    fn test_statement_escaping() {
        let spec = OutputSpec {
            result_text: Some("line1\nline2 \"quoted\"".to_string()),
            ..OutputSpec::default()
        };
        let block = compile_output(Some(&spec), 1, "Rule");

        assert!(block.contains(r#"hit.resultText = "line1\nline2 \"quoted\"""#));
    }
}
