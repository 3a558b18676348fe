// Query fingerprints.
// A fingerprint is the operation name plus canonical JSON of its variables.

use std::fmt;

use serde_json::Value;

use crate::github::Operation;

/// Deterministic cache key for an operation and its variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(operation: &Operation, variables: &Value) -> Self {
        Self(format!("{}:{}", operation.name, canonical_json(variables)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialize JSON with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::operations::{POST_QUERY, POSTS_QUERY};
    use serde_json::{Map, json};

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let value = json!({ "b": { "y": 1, "x": [ { "d": true, "c": null } ] }, "a": "s\"q" });
        assert_eq!(
            canonical_json(&value),
            r#"{"a":"s\"q","b":{"x":[{"c":null,"d":true}],"y":1}}"#
        );
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let mut first = Map::new();
        first.insert("issueNumber".to_string(), json!(4));
        first.insert("after".to_string(), json!("c1"));

        let mut second = Map::new();
        second.insert("after".to_string(), json!("c1"));
        second.insert("issueNumber".to_string(), json!(4));

        assert_eq!(
            Fingerprint::new(&POST_QUERY, &Value::Object(first)),
            Fingerprint::new(&POST_QUERY, &Value::Object(second))
        );
    }

    #[test]
    fn test_operation_is_part_of_fingerprint() {
        let vars = json!({});
        assert_ne!(
            Fingerprint::new(&POST_QUERY, &vars),
            Fingerprint::new(&POSTS_QUERY, &vars)
        );
        assert_eq!(Fingerprint::new(&POSTS_QUERY, &vars).as_str(), "PostsQuery:{}");
    }

    #[test]
    fn test_different_values_differ() {
        assert_ne!(
            Fingerprint::new(&POST_QUERY, &json!({ "issueNumber": 1 })),
            Fingerprint::new(&POST_QUERY, &json!({ "issueNumber": 2 }))
        );
    }
}
