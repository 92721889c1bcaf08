use serde::Serialize;
use serde_json::{Map, Value};

use super::extract_json_from_completion;

/// Output of the retrieval stage, resolved once into one of the shapes the
/// agent may produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RetrievedContext {
    /// Label → passage pairs, in the order the agent emitted them.
    Mapping(Map<String, Value>),
    /// Ordered documents, usually objects with `title`/`content` fields.
    Documents(Vec<Value>),
    /// Anything else, kept verbatim.
    Text(String),
}

impl RetrievedContext {
    /// Classify a retrieval completion.
    ///
    /// JSON objects and arrays (bare or inside a code fence) become structured
    /// context; everything else is kept as the original text.
    pub fn from_completion(completion: &str) -> Self {
        extract_json_from_completion(completion)
            .ok()
            .and_then(|json| serde_json::from_str::<Value>(json).ok())
            .and_then(|value| match value {
                Value::Object(map) => Some(Self::Mapping(map)),
                Value::Array(items) => Some(Self::Documents(items)),
                _ => None,
            })
            .unwrap_or_else(|| Self::Text(completion.to_string()))
    }

    /// Classify an already-decoded JSON value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Mapping(map),
            Value::Array(items) => Self::Documents(items),
            Value::String(text) => Self::Text(text),
            other => Self::Text(other.to_string()),
        }
    }

    /// Whether retrieval produced nothing usable.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Mapping(map) => map.is_empty(),
            Self::Documents(items) => items.is_empty(),
            Self::Text(text) => text.trim().is_empty(),
        }
    }

    /// Pretty JSON for structured context, the raw text otherwise.
    pub fn to_debug_string(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            structured => serde_json::to_string_pretty(structured)
                .unwrap_or_else(|_| format!("{:?}", structured)),
        }
    }
}

/// The text handed to the formulation agent.
impl std::fmt::Display for RetrievedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_completion_documents() {
        let context = RetrievedContext::from_completion(
            r#"[{"title": "Case X", "content": "Held that..."}]"#,
        );
        match context {
            RetrievedContext::Documents(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0]["title"], "Case X");
            }
            other => panic!("expected documents, got {:?}", other),
        }
    }

    #[test]
    fn test_from_completion_mapping_keeps_order() {
        let context = RetrievedContext::from_completion(
            "```json\n{\"zeta\": \"first\", \"alpha\": \"second\"}\n```",
        );
        match context {
            RetrievedContext::Mapping(map) => {
                let keys: Vec<&String> = map.keys().collect();
                assert_eq!(keys, vec!["zeta", "alpha"]);
            }
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_from_completion_plain_text() {
        let text = "Passage 1: The court held...";
        assert_eq!(
            RetrievedContext::from_completion(text),
            RetrievedContext::Text(text.to_string())
        );
    }

    #[test]
    fn test_from_completion_invalid_json_kept_as_text() {
        let text = "{not json at all";
        assert_eq!(
            RetrievedContext::from_completion(text),
            RetrievedContext::Text(text.to_string())
        );
    }

    #[test]
    fn test_from_value_scalars_become_text() {
        assert_eq!(
            RetrievedContext::from_value(json!(42)),
            RetrievedContext::Text("42".to_string())
        );
        assert_eq!(
            RetrievedContext::from_value(json!("plain")),
            RetrievedContext::Text("plain".to_string())
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(RetrievedContext::Text("  ".to_string()).is_empty());
        assert!(RetrievedContext::Documents(vec![]).is_empty());
        assert!(!RetrievedContext::from_value(json!({"a": "b"})).is_empty());
    }

    #[test]
    fn test_serializes_as_raw_value() {
        let context = RetrievedContext::from_value(json!([{"title": "T"}]));
        assert_eq!(serde_json::to_value(&context).unwrap(), json!([{"title": "T"}]));
    }

    #[test]
    fn test_display_text_is_verbatim() {
        let context = RetrievedContext::Text("raw passages".to_string());
        assert_eq!(context.to_string(), "raw passages");
    }
}
