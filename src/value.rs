//! Tagged value model for the free-form `values` maps of a site.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered map of value names to values, as written in the site file.
pub type Values = IndexMap<String, Value>;

/// A dynamically typed value from a `values` map.
///
/// Deserialized untagged, so any YAML scalar, sequence or mapping is accepted and
/// serialized back in its natural shape for template contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Object(Values),
}

impl Value {
    /// Human readable name of the variant, used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Values> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(_) => write!(f, "{{...}}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

/// Looks up a dot-separated path (e.g. `cloudflare.apiToken`) in a values map.
///
/// Every segment except the last must resolve to an object.
pub fn lookup<'a>(values: &'a Values, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = values.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Values {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_untagged_variants() {
        let values = parse(
            r#"
ip: 192.168.1.150
replicas: 3
ratio: 0.5
enabled: true
empty: ~
pools: [a, b]
letsencrypt:
  email: admin@example.com
"#,
        );
        assert_eq!(values["ip"], Value::from("192.168.1.150"));
        assert_eq!(values["replicas"], Value::Integer(3));
        assert_eq!(values["ratio"], Value::Float(0.5));
        assert_eq!(values["enabled"], Value::Bool(true));
        assert_eq!(values["empty"], Value::Null);
        assert_eq!(values["pools"].type_name(), "list");
        assert_eq!(values["letsencrypt"].type_name(), "object");
    }

    #[test]
    fn test_lookup_nested_path() {
        let values = parse("cloudflare:\n  apiToken: secret\nflat: 1\n");
        assert_eq!(lookup(&values, "cloudflare.apiToken"), Some(&Value::from("secret")));
        assert_eq!(lookup(&values, "flat"), Some(&Value::Integer(1)));
        assert_eq!(lookup(&values, "cloudflare.missing"), None);
        assert_eq!(lookup(&values, "flat.deeper"), None);
    }

    #[test]
    fn test_serializes_to_plain_json() {
        let values = parse("id: 101\nname: cp-1\n");
        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json, serde_json::json!({"id": 101, "name": "cp-1"}));
    }
}
