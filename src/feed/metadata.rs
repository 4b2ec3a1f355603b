//! Post metadata as stored, and the fixed record the assembler reads from it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata in whatever shape the store handed it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMetadata {
    Structured(Map<String, Value>),
    /// The object serialized to a JSON string.
    Serialized(String),
    Opaque(Value),
}

impl Default for RawMetadata {
    fn default() -> Self {
        RawMetadata::Structured(Map::new())
    }
}

impl From<Value> for RawMetadata {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => RawMetadata::Structured(map),
            Value::String(raw) => RawMetadata::Serialized(raw),
            other => RawMetadata::Opaque(other),
        }
    }
}

/// Parsed metadata. Only the keys this crate acts on are lifted out; the rest
/// is passed through to the client untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostMetadata {
    /// True only when `isAnonymous` is literally the boolean `true`.
    pub is_anonymous: bool,
    fields: Map<String, Value>,
}

impl PostMetadata {
    /// Malformed input yields empty metadata instead of an error.
    pub fn parse(raw: &RawMetadata) -> Self {
        let fields = match raw {
            RawMetadata::Structured(map) => map.clone(),
            RawMetadata::Serialized(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => map,
                Ok(_) => Map::new(),
                Err(e) => {
                    tracing::debug!("Ignoring unparsable post metadata: {}", e);
                    Map::new()
                }
            },
            RawMetadata::Opaque(_) => Map::new(),
        };

        Self {
            is_anonymous: matches!(fields.get("isAnonymous"), Some(Value::Bool(true))),
            fields,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_and_serialized_agree() {
        let structured = RawMetadata::from(json!({"isAnonymous": true, "location": "Hall"}));
        let serialized = RawMetadata::from(json!(r#"{"isAnonymous":true,"location":"Hall"}"#));

        assert_eq!(PostMetadata::parse(&structured), PostMetadata::parse(&serialized));
        assert!(PostMetadata::parse(&structured).is_anonymous);
    }

    #[test]
    fn only_boolean_true_is_anonymous() {
        for value in [json!({"isAnonymous": "true"}), json!({"isAnonymous": 1}), json!({})] {
            assert!(!PostMetadata::parse(&RawMetadata::from(value)).is_anonymous);
        }
    }

    #[test]
    fn malformed_metadata_is_empty() {
        let parsed = PostMetadata::parse(&RawMetadata::from(json!("{not json")));
        assert!(!parsed.is_anonymous);
        assert_eq!(parsed.into_value(), json!({}));

        let parsed = PostMetadata::parse(&RawMetadata::from(json!([1, 2])));
        assert_eq!(parsed.into_value(), json!({}));
    }
}
