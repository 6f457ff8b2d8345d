//! Field catalogs for record types
//!
//! A catalog declares, per record type, which dotted field paths exist and
//! how they are typed. It replaces runtime introspection of entity classes
//! with an explicit, configuration-loaded mapping, so path resolution is
//! unit-testable in isolation.
//!
//! Path semantics: the first segment names the record type, the second a
//! scalar attribute for a direct field; segments beyond the first two
//! denote a traversal into a repeated/collection relationship, one or two
//! levels deep.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared scalar type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Boolean,
}

/// A repeated/collection relationship of a record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    /// Type name of the collection element in the runtime's model
    pub element_type: String,
    /// For two-level relationships, the intermediate relation traversed first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
}

/// Field catalog for one record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCatalog {
    /// Record-type tag rules target (e.g. "loan")
    pub record_type: String,
    /// Fact type name in the runtime's model (e.g. "Loan")
    pub fact_type: String,
    /// Field path (relative to the record root) to declared type
    #[serde(default)]
    pub fields: HashMap<String, FieldKind>,
    /// Relation path (relative to the record root) to relationship metadata
    #[serde(default)]
    pub relations: HashMap<String, RelationDescriptor>,
}

/// Result of resolving a dotted field path against a catalog
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedField {
    /// Scalar attribute of the record itself
    Direct { attribute: String, kind: FieldKind },
    /// Attribute reached through one or two repeated relationships
    Collection {
        /// Full relation path from the record root (e.g. "applicants.addresses")
        relation_path: String,
        /// Element type of the innermost relation
        element_type: String,
        /// Attribute of the element the comparison targets
        attribute: String,
        kind: FieldKind,
    },
}

impl FieldCatalog {
    /// Create an empty catalog for a record type
    pub fn new(record_type: impl Into<String>, fact_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            fact_type: fact_type.into(),
            fields: HashMap::new(),
            relations: HashMap::new(),
        }
    }

    /// Declare a field
    pub fn with_field(mut self, path: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(path.into(), kind);
        self
    }

    /// Declare a collection relationship
    pub fn with_relation(
        mut self,
        path: impl Into<String>,
        element_type: impl Into<String>,
        via: Option<&str>,
    ) -> Self {
        self.relations.insert(
            path.into(),
            RelationDescriptor {
                element_type: element_type.into(),
                via: via.map(str::to_string),
            },
        );
        self
    }

    /// Resolve a dotted field path
    ///
    /// Returns `None` for paths with no catalog entry; callers treat that
    /// as a validation error, never a compiler failure.
    pub fn resolve(&self, path: &str) -> Option<ResolvedField> {
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return None;
        }

        // The leading record-type segment is optional in authored paths
        let rest: &[&str] = if segments.len() > 1
            && segments[0].eq_ignore_ascii_case(&self.record_type)
        {
            &segments[1..]
        } else {
            &segments[..]
        };

        match rest.len() {
            0 => None,
            1 => {
                let attribute = rest[0];
                self.fields.get(attribute).map(|kind| ResolvedField::Direct {
                    attribute: attribute.to_string(),
                    kind: *kind,
                })
            }
            // One or two relationship hops before the final attribute
            2 | 3 => {
                let relation_path = rest[..rest.len() - 1].join(".");
                let attribute = rest[rest.len() - 1];
                let relation = self.relations.get(&relation_path)?;
                let field_key = format!("{}.{}", relation_path, attribute);
                let kind = *self.fields.get(&field_key)?;
                Some(ResolvedField::Collection {
                    relation_path,
                    element_type: relation.element_type.clone(),
                    attribute: attribute.to_string(),
                    kind,
                })
            }
            _ => None,
        }
    }

    /// Type names the generated source must import: the fact type plus
    /// every relation element type, deduplicated and sorted.
    pub fn imports(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .relations
            .values()
            .map(|r| r.element_type.clone())
            .collect();
        names.push(self.fact_type.clone());
        names.sort();
        names.dedup();
        names
    }
}

/// Per-record-type catalog lookup handed to the engine
#[derive(Debug, Clone, Default)]
pub struct CatalogSet {
    catalogs: HashMap<String, FieldCatalog>,
}

impl CatalogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog, keyed by its record type
    pub fn insert(&mut self, catalog: FieldCatalog) {
        self.catalogs.insert(catalog.record_type.clone(), catalog);
    }

    /// Look up the catalog for a record type
    pub fn get(&self, record_type: &str) -> Option<&FieldCatalog> {
        self.catalogs.get(record_type)
    }

    /// All registered record types, sorted
    pub fn record_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.catalogs.keys().cloned().collect();
        types.sort();
        types
    }

    /// Load catalogs from a YAML document (a list of catalogs)
    pub fn from_yaml(content: &str) -> Result<Self, CoreError> {
        let catalogs: Vec<FieldCatalog> = serde_yaml::from_str(content)
            .map_err(|e| CoreError::InvalidCatalog(e.to_string()))?;
        let mut set = Self::new();
        for catalog in catalogs {
            set.insert(catalog);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan_catalog() -> FieldCatalog {
        FieldCatalog::new("loan", "Loan")
            .with_field("amount", FieldKind::Decimal)
            .with_field("status", FieldKind::Text)
            .with_field("term", FieldKind::Integer)
            .with_field("applicants.age", FieldKind::Integer)
            .with_field("applicants.region", FieldKind::Text)
            .with_field("applicants.addresses.city", FieldKind::Text)
            .with_relation("applicants", "Applicant", None)
            .with_relation("applicants.addresses", "Address", Some("applicants"))
    }

    #[test]
    fn test_resolve_direct_field() {
        let catalog = loan_catalog();

        let resolved = catalog.resolve("loan.amount").unwrap();
        assert_eq!(
            resolved,
            ResolvedField::Direct {
                attribute: "amount".to_string(),
                kind: FieldKind::Decimal,
            }
        );

        // The record-type prefix is optional
        assert_eq!(catalog.resolve("amount"), Some(resolved));
    }

    #[test]
    fn test_resolve_collection_field() {
        let catalog = loan_catalog();

        match catalog.resolve("loan.applicants.age") {
            Some(ResolvedField::Collection {
                relation_path,
                element_type,
                attribute,
                kind,
            }) => {
                assert_eq!(relation_path, "applicants");
                assert_eq!(element_type, "Applicant");
                assert_eq!(attribute, "age");
                assert_eq!(kind, FieldKind::Integer);
            }
            other => panic!("Expected collection resolution, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_nested_collection_field() {
        let catalog = loan_catalog();

        match catalog.resolve("loan.applicants.addresses.city") {
            Some(ResolvedField::Collection {
                relation_path,
                element_type,
                ..
            }) => {
                assert_eq!(relation_path, "applicants.addresses");
                assert_eq!(element_type, "Address");
            }
            other => panic!("Expected nested collection resolution, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_unknown_path() {
        let catalog = loan_catalog();

        assert_eq!(catalog.resolve("loan.nonexistent"), None);
        assert_eq!(catalog.resolve("loan.applicants.nonexistent"), None);
        assert_eq!(catalog.resolve(""), None);
        // Too many hops
        assert_eq!(catalog.resolve("loan.a.b.c.d.e"), None);
    }

    #[test]
    fn test_imports_sorted_and_deduped() {
        let catalog = loan_catalog();
        assert_eq!(catalog.imports(), vec!["Address", "Applicant", "Loan"]);
    }

    #[test]
    fn test_catalog_set_from_yaml() {
        let yaml = r#"
- record_type: loan
  fact_type: Loan
  fields:
    amount: decimal
    status: text
    applicants.age: integer
  relations:
    applicants:
      element_type: Applicant
- record_type: claim
  fact_type: Claim
  fields:
    total: decimal
"#;
        let set = CatalogSet::from_yaml(yaml).unwrap();

        let loan = set.get("loan").unwrap();
        assert_eq!(loan.fact_type, "Loan");
        assert_eq!(loan.fields.get("amount"), Some(&FieldKind::Decimal));
        assert!(loan.relations.contains_key("applicants"));

        assert!(set.get("claim").is_some());
        assert!(set.get("order").is_none());
    }

    #[test]
    fn test_catalog_set_bad_yaml() {
        assert!(CatalogSet::from_yaml("not: [valid").is_err());
    }
}
