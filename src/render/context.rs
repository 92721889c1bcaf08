use serde_json::Value;

use super::truthy_text;
use crate::research::RetrievedContext;

/// Header line of every structured context block.
pub const CONTEXT_HEADER: &str = "**Source documents:**";

/// Render retrieved context as Markdown.
///
/// Mappings become one bullet per key, documents become numbered quoted
/// blocks, and opaque text is returned unchanged. Missing document fields
/// fall back to `source`/`text` and finally to a synthesized title or the
/// element's JSON.
pub fn format_retrieved_context(context: &RetrievedContext) -> String {
    match context {
        RetrievedContext::Mapping(map) => {
            let mut lines = vec![CONTEXT_HEADER.to_string()];
            for (key, value) in map {
                lines.push(format!("- **{}:** {}", key, value_text(value)));
            }
            lines.join("\n")
        }
        RetrievedContext::Documents(items) => {
            let mut lines = vec![CONTEXT_HEADER.to_string()];
            for (i, item) in items.iter().enumerate() {
                lines.push(document_block(i + 1, item));
            }
            lines.join("\n")
        }
        RetrievedContext::Text(text) => text.clone(),
    }
}

fn document_block(index: usize, item: &Value) -> String {
    let Value::Object(map) = item else {
        return format!("\n**{}.**\n> {}", index, value_text(item));
    };

    let title = truthy_text(map.get("title"))
        .or_else(|| truthy_text(map.get("source")))
        .map(|t| t.into_owned())
        .unwrap_or_else(|| format!("Document {}", index));
    let content = truthy_text(map.get("content"))
        .or_else(|| truthy_text(map.get("text")))
        .map(|c| c.into_owned())
        .unwrap_or_else(|| item.to_string());

    format!("\n**{}. {}**\n> {}", index, title, content)
}

/// Strings verbatim, everything else as JSON text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
