//! Condition trees for rule authoring
//!
//! A condition tree holds two optional ordered lists of items keyed
//! "all" (AND) and "any" (OR). An item is either a leaf comparison or a
//! nested tree (one level of grouping recursion). A tree with a single
//! leaf needs no explicit wrapper; compilation flattens the tree into
//! ordered tuples carrying the combinator of their containing list.

use serde::{Deserialize, Serialize};

/// A condition tree with all/any logic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConditionTree {
    /// All conditions must be true (AND logic)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<Vec<ConditionNode>>,
    /// At least one condition must be true (OR logic)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any: Option<Vec<ConditionNode>>,
}

/// An item in a condition tree: a leaf comparison or a nested group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ConditionNode {
    /// Single field comparison
    Leaf(ConditionLeaf),
    /// Nested group
    Group(ConditionTree),
}

/// A single field comparison as authored
///
/// Operator and value are kept as text; typing is catalog-directed at
/// compile time and the operator is parsed against the fixed grammar
/// during validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionLeaf {
    /// Dotted field path (e.g. "loan.amount" or "loan.applicants.age")
    pub field: String,
    /// Comparison operator text (e.g. "==", ">=", "contains")
    pub operator: String,
    /// Comparison value text
    pub value: String,
}

/// How a flattened condition joins its left neighbor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

/// A flattened (field, operator, value, combinator) tuple
///
/// The combinator is that of the list directly containing the leaf:
/// items of an "all" list carry And, items of an "any" list carry Or.
/// Nested groups flatten into their parent run in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatCondition {
    pub field: String,
    pub operator: String,
    pub value: String,
    pub combinator: Combinator,
}

impl ConditionTree {
    /// Create a tree whose top-level items are AND-combined
    pub fn all_of(items: Vec<ConditionNode>) -> Self {
        ConditionTree {
            all: Some(items),
            any: None,
        }
    }

    /// Create a tree whose top-level items are OR-combined
    pub fn any_of(items: Vec<ConditionNode>) -> Self {
        ConditionTree {
            all: None,
            any: Some(items),
        }
    }

    /// Total number of leaf conditions in the tree
    pub fn leaf_count(&self) -> usize {
        fn count(items: &Option<Vec<ConditionNode>>) -> usize {
            items.as_deref().unwrap_or(&[]).iter().map(|node| match node {
                ConditionNode::Leaf(_) => 1,
                ConditionNode::Group(tree) => tree.leaf_count(),
            }).sum()
        }
        count(&self.all) + count(&self.any)
    }

    /// True if the tree holds no usable conditions
    pub fn is_empty(&self) -> bool {
        self.leaf_count() == 0
    }

    /// Flatten the tree into ordered tuples
    ///
    /// The "all" list is walked before the "any" list; within a list,
    /// document order is preserved and nested groups are inlined.
    pub fn flatten(&self) -> Vec<FlatCondition> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<FlatCondition>) {
        let lists = [
            (&self.all, Combinator::And),
            (&self.any, Combinator::Or),
        ];
        for (items, combinator) in lists {
            for node in items.as_deref().unwrap_or(&[]) {
                match node {
                    ConditionNode::Leaf(leaf) => out.push(FlatCondition {
                        field: leaf.field.clone(),
                        operator: leaf.operator.clone(),
                        value: leaf.value.clone(),
                        combinator,
                    }),
                    ConditionNode::Group(tree) => tree.flatten_into(out),
                }
            }
        }
    }
}

impl ConditionNode {
    /// Create a leaf comparison node
    pub fn leaf(field: impl Into<String>, operator: impl Into<String>, value: impl Into<String>) -> Self {
        ConditionNode::Leaf(ConditionLeaf {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_leaf_tree() {
        let tree = ConditionTree::all_of(vec![ConditionNode::leaf("loan.amount", ">", "1000")]);

        assert_eq!(tree.leaf_count(), 1);
        assert!(!tree.is_empty());

        let flat = tree.flatten();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].field, "loan.amount");
        assert_eq!(flat[0].combinator, Combinator::And);
    }

    #[test]
    fn test_empty_tree() {
        assert!(ConditionTree::default().is_empty());
        assert!(ConditionTree::all_of(vec![]).is_empty());
        assert!(ConditionTree::all_of(vec![ConditionNode::Group(ConditionTree::default())]).is_empty());
    }

    #[test]
    fn test_any_combinator() {
        let tree = ConditionTree::any_of(vec![
            ConditionNode::leaf("loan.status", "==", "OPEN"),
            ConditionNode::leaf("loan.status", "==", "REVIEW"),
        ]);

        let flat = tree.flatten();
        assert_eq!(flat.len(), 2);
        assert!(flat.iter().all(|c| c.combinator == Combinator::Or));
    }

    #[test]
    fn test_nested_group_flattens_in_order() {
        let tree = ConditionTree::any_of(vec![
            ConditionNode::leaf("loan.amount", ">", "10000"),
            ConditionNode::Group(ConditionTree::all_of(vec![
                ConditionNode::leaf("loan.region", "==", "EU"),
                ConditionNode::leaf("loan.term", ">=", "24"),
            ])),
        ]);

        let flat = tree.flatten();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0].combinator, Combinator::Or);
        // Leaves of the nested "all" group carry its own combinator
        assert_eq!(flat[1].combinator, Combinator::And);
        assert_eq!(flat[2].combinator, Combinator::And);
        assert_eq!(flat[1].field, "loan.region");
    }

    #[test]
    fn test_condition_serde() {
        let json = r#"{
            "all": [
                {"field": "loan.amount", "operator": ">", "value": "1000"},
                {"any": [
                    {"field": "loan.region", "operator": "==", "value": "EU"},
                    {"field": "loan.region", "operator": "==", "value": "UK"}
                ]}
            ]
        }"#;
        let tree: ConditionTree = serde_json::from_str(json).unwrap();

        assert_eq!(tree.leaf_count(), 3);
        let all = tree.all.as_ref().unwrap();
        assert!(matches!(all[0], ConditionNode::Leaf(_)));
        assert!(matches!(all[1], ConditionNode::Group(_)));

        // Round-trip preserves the shape
        let encoded = serde_json::to_string(&tree).unwrap();
        let decoded: ConditionTree = serde_json::from_str(&encoded).unwrap();
        assert_eq!(tree, decoded);
    }
}
