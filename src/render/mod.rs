//! Markdown rendering for pipeline results.
//!
//! Both formatters are pure and never fail: absent or oddly-shaped fields
//! degrade to empty sections or fallback labels.

mod answer;
mod context;

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;

pub use answer::*;
pub use context::*;

use std::borrow::Cow;

use serde_json::Value;

/// Text of a JSON field, or `None` when it is missing or empty-like
/// (null, `false`, zero, empty string, array or object).
pub(crate) fn truthy_text(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(Cow::Owned(other.to_string())),
    }
}
