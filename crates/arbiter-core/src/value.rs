//! Runtime fact values
//!
//! The `Value` enum represents the payload of an incoming business record
//! (a "fact") handed to the pattern-matching runtime, similar to JSON values.
//! Collection relationships appear as `Array` members of an `Object`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fact value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (f64 for simplicity, handles both int and float)
    Number(f64),
    /// String value
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Object (key-value map)
    Object(HashMap<String, Value>),
}

impl Value {
    /// Borrow the string content, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a field of an object value
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_object_lookup() {
        let mut map = HashMap::new();
        map.insert("amount".to_string(), Value::Number(2500.0));
        map.insert("status".to_string(), Value::from("OPEN"));

        let fact = Value::Object(map);
        assert_eq!(fact.get("amount"), Some(&Value::Number(2500.0)));
        assert_eq!(fact.get("status").and_then(Value::as_str), Some("OPEN"));
        assert_eq!(fact.get("missing"), None);
    }

    #[test]
    fn test_value_serde_untagged() {
        let json = r#"{"amount": 100.5, "open": true, "tags": ["a", "b"]}"#;
        let fact: Value = serde_json::from_str(json).unwrap();

        assert_eq!(fact.get("amount"), Some(&Value::Number(100.5)));
        assert_eq!(fact.get("open"), Some(&Value::Bool(true)));
        match fact.get("tags") {
            Some(Value::Array(items)) => assert_eq!(items.len(), 2),
            other => panic!("Expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_value_roundtrip() {
        let mut map = HashMap::new();
        map.insert("nested".to_string(), Value::Array(vec![Value::Null]));
        let original = Value::Object(map);

        let encoded = serde_json::to_string(&original).unwrap();
        let decoded: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(original, decoded);
    }
}
