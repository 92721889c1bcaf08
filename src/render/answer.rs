use std::borrow::Cow;

use serde_json::{Map, Value};

use super::truthy_text;
use crate::research::LegalResearchAnswer;

/// Rendered when the input is neither an answer record nor a mapping.
pub const UNRENDERABLE_ANSWER: &str = "``````";

/// Separator between metadata clauses.
pub const CLAUSE_SEPARATOR: &str = " • ";

/// Marker appended to citations reported in the Supreme Court Cases reporter.
pub const SCC_MARKER: &str = "⭐ SCC";

const RULE: &str = "---";

/// Input accepted by the answer formatter, resolved once at the boundary.
#[derive(Debug, Clone, Copy)]
pub enum AnswerView<'a> {
    /// A decoded schema record.
    Record(&'a LegalResearchAnswer),
    /// A generic JSON object with answer-shaped keys.
    Mapping(&'a Map<String, Value>),
    /// Anything that cannot be read field by field.
    Opaque(&'a Value),
}

impl<'a> AnswerView<'a> {
    pub fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Self::Mapping(map),
            other => Self::Opaque(other),
        }
    }
}

impl<'a> From<&'a LegalResearchAnswer> for AnswerView<'a> {
    fn from(answer: &'a LegalResearchAnswer) -> Self {
        Self::Record(answer)
    }
}

/// Confidence band shown next to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// High at or above 0.8, medium from 0.5, low otherwise.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "🟢",
            ConfidenceLevel::Medium => "🟡",
            ConfidenceLevel::Low => "🔴",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

/// Field access shared by both readable views.
struct AnswerFields<'a> {
    issue: Cow<'a, str>,
    short_answer: Cow<'a, str>,
    rule: Cow<'a, str>,
    analysis: Cow<'a, str>,
    conclusion: Cow<'a, str>,
    citations: Vec<CitationFields<'a>>,
    judgement: Option<Cow<'a, str>>,
    confidence: Option<f64>,
}

struct CitationFields<'a> {
    title: Cow<'a, str>,
    citation: Cow<'a, str>,
    jurisdiction: Cow<'a, str>,
    link: Cow<'a, str>,
    is_supreme_court: bool,
}

impl<'a> AnswerFields<'a> {
    fn from_record(answer: &'a LegalResearchAnswer) -> Self {
        Self {
            issue: Cow::Borrowed(answer.issue.as_str()),
            short_answer: Cow::Borrowed(answer.short_answer.as_str()),
            rule: Cow::Borrowed(answer.rule.as_str()),
            analysis: Cow::Borrowed(answer.analysis.as_str()),
            conclusion: Cow::Borrowed(answer.conclusion.as_str()),
            citations: answer
                .citations
                .iter()
                .map(|c| CitationFields {
                    title: Cow::Borrowed(c.title.as_str()),
                    citation: Cow::Borrowed(c.citation.as_str()),
                    jurisdiction: Cow::Borrowed(c.jurisdiction.as_deref().unwrap_or_default()),
                    link: Cow::Borrowed(c.link.as_deref().unwrap_or_default()),
                    is_supreme_court: c.is_supreme_court,
                })
                .collect(),
            judgement: answer.judgement.as_deref().map(Cow::Borrowed),
            confidence: Some(answer.confidence_score),
        }
    }

    fn from_mapping(map: &'a Map<String, Value>) -> Self {
        let text = |key: &str| truthy_text(map.get(key)).unwrap_or_default();
        let citations = match map.get("citations") {
            Some(Value::Array(items)) => items.iter().map(CitationFields::from_value).collect(),
            _ => Vec::new(),
        };

        Self {
            issue: text("issue"),
            short_answer: text("short_answer"),
            rule: text("rule"),
            analysis: text("analysis"),
            conclusion: text("conclusion"),
            citations,
            judgement: truthy_text(map.get("judgement")),
            confidence: map.get("confidence_score").and_then(score_value),
        }
    }
}

impl<'a> CitationFields<'a> {
    fn from_value(value: &'a Value) -> Self {
        let Value::Object(map) = value else {
            return Self {
                title: truthy_text(Some(value)).unwrap_or_default(),
                citation: Cow::Borrowed(""),
                jurisdiction: Cow::Borrowed(""),
                link: Cow::Borrowed(""),
                is_supreme_court: false,
            };
        };
        let text = |key: &str| truthy_text(map.get(key)).unwrap_or_default();
        let is_supreme_court = ["SCC_citation", "is_supreme_court"]
            .iter()
            .any(|key| truthy_text(map.get(*key)).is_some());

        Self {
            title: text("title"),
            citation: text("citation"),
            jurisdiction: text("jurisdiction"),
            link: text("link"),
            is_supreme_court,
        }
    }
}

/// Numbers, or strings holding a number.
fn score_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render a research answer as Markdown.
///
/// Sections appear in fixed order; absent fields render as empty bodies and
/// never cause an error.
pub fn render_answer<'a>(view: impl Into<AnswerView<'a>>) -> String {
    let fields = match view.into() {
        AnswerView::Record(answer) => AnswerFields::from_record(answer),
        AnswerView::Mapping(map) => AnswerFields::from_mapping(map),
        AnswerView::Opaque(_) => return UNRENDERABLE_ANSWER.to_string(),
    };

    let mut md = vec![
        section("📋 Issue", &fields.issue),
        RULE.to_string(),
        section("💡 Short Answer", &fields.short_answer),
        RULE.to_string(),
        section("⚖️ Legal Rule", &fields.rule),
        RULE.to_string(),
        section("🔍 Analysis", &fields.analysis),
        RULE.to_string(),
        section("✅ Conclusion", &fields.conclusion),
    ];

    if !fields.citations.is_empty() {
        md.push(RULE.to_string());
        md.push("#### 📚 Citations".to_string());
        let lines: Vec<String> = fields.citations.iter().map(citation_line).collect();
        md.push(lines.join("\n"));
    }

    if let Some(meta) = metadata_line(fields.confidence, fields.judgement.as_deref()) {
        md.push(RULE.to_string());
        md.push(meta);
    }

    md.join("\n\n")
}

/// Render a generic JSON value as an answer.
pub fn render_answer_value(value: &Value) -> String {
    render_answer(AnswerView::from_value(value))
}

fn section(heading: &str, body: &str) -> String {
    format!("#### {}\n{}", heading, body.trim())
}

fn citation_line(citation: &CitationFields<'_>) -> String {
    let title: &str = if citation.title.is_empty() {
        "Source"
    } else {
        &citation.title
    };
    let label = if citation.link.is_empty() {
        title.to_string()
    } else {
        format!("[{}]({})", title, citation.link)
    };

    let scc = if citation.is_supreme_court { SCC_MARKER } else { "" };
    let meta = [&*citation.citation, &*citation.jurisdiction, scc]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(CLAUSE_SEPARATOR);

    if meta.is_empty() {
        format!("- {}", label)
    } else {
        format!("- {} — {}", label, meta)
    }
}

fn metadata_line(confidence: Option<f64>, judgement: Option<&str>) -> Option<String> {
    let mut items = Vec::new();
    if let Some(score) = confidence {
        let level = ConfidenceLevel::from_score(score);
        items.push(format!("{} **Confidence:** {:.2}", level.marker(), score));
    }
    if let Some(judgement) = judgement.filter(|j| !j.is_empty()) {
        items.push(format!("⚖️ **Status:** {}", judgement));
    }

    if items.is_empty() {
        None
    } else {
        Some(items.join(CLAUSE_SEPARATOR))
    }
}
