//! Self-describing node values.
//!
//! Nodes that expose the value accessor capability report their content as
//! a [`NodeValue`]. Definition documents also carry scalar values in this
//! shape before they are flattened to the raw string stored in a
//! definition.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A node value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeValue {
    /// No value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Integer value
    Integer(i64),

    /// Floating-point value
    Float(f64),

    /// String value
    String(String),

    /// List of values
    List(Vec<NodeValue>),

    /// Map of values, ordered by key
    Map(BTreeMap<String, NodeValue>),
}

impl NodeValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get this value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The raw string form stored in a definition.
    ///
    /// Strings are taken verbatim and null becomes the empty string. Every
    /// other value uses its JSON form, so lists and maps stay parseable.
    pub fn to_raw(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl From<bool> for NodeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for NodeValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for NodeValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for NodeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for NodeValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<NodeValue>> From<Vec<T>> for NodeValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// Values display as JSON.
impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_deserialize() {
        let value: NodeValue = serde_json::from_str(r#"{"port": 8080, "hosts": ["a", "b"]}"#).unwrap();
        match value {
            NodeValue::Map(map) => {
                assert_eq!(map["port"], NodeValue::Integer(8080));
                assert_eq!(map["hosts"], NodeValue::from(vec!["a", "b"]));
            }
            other => panic!("expected a map, got {other:?}"),
        }
    }

    #[test]
    fn test_raw_form() {
        assert_eq!(NodeValue::from("plain").to_raw(), "plain");
        assert_eq!(NodeValue::from(42i64).to_raw(), "42");
        assert_eq!(NodeValue::from(true).to_raw(), "true");
        assert_eq!(NodeValue::Null.to_raw(), "");
        assert_eq!(NodeValue::from(vec!["a", "b"]).to_raw(), r#"["a","b"]"#);
    }

    #[test]
    fn test_raw_form_of_quoted_strings_reads_back() {
        let value = NodeValue::from(vec![r#"say "hi""#, "a, b"]);
        let raw = value.to_raw();
        assert_eq!(raw, r#"["say \"hi\"","a, b"]"#);

        let parsed: NodeValue = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_accessors() {
        assert!(NodeValue::default().is_null());
        assert_eq!(NodeValue::from("x").as_str(), Some("x"));
        assert_eq!(NodeValue::from(1i64).as_str(), None);
    }
}
