use serde::{Deserialize, Deserializer, Serialize};

use super::extract_json_from_completion;

/// Kind of legal authority a citation points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Case,
    Statute,
    Regulation,
    Treatise,
    Article,
    #[serde(other)]
    Other,
}

impl SourceType {
    /// Get the source type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Case => "case",
            SourceType::Statute => "statute",
            SourceType::Regulation => "regulation",
            SourceType::Treatise => "treatise",
            SourceType::Article => "article",
            SourceType::Other => "other",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One evidentiary reference backing a research answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub source_type: SourceType,
    pub title: String,
    /// Formal cite string, e.g. `[2020] 1 SCC 1`.
    pub citation: String,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub citation_summary: String,
    /// Reported in the Supreme Court Cases reporter.
    #[serde(rename = "SCC_citation", alias = "is_supreme_court", default)]
    pub is_supreme_court: bool,
}

/// Structured IRAC answer produced by the formulation stage and optionally
/// replaced by the verification stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalResearchAnswer {
    pub issue: String,
    pub short_answer: String,
    pub rule: String,
    pub analysis: String,
    pub conclusion: String,
    /// Ordered by relevance as produced by the agent.
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Subsequent history, e.g. overruled, affirmed, distinguished.
    #[serde(default)]
    pub judgement: Option<String>,
    #[serde(deserialize_with = "clamped_confidence")]
    pub confidence_score: f64,
}

/// Confidence scores outside [0.0, 1.0] are clamped into range.
fn clamped_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let score = f64::deserialize(deserializer)?;
    if !score.is_finite() {
        return Err(serde::de::Error::custom("confidence_score must be finite"));
    }
    Ok(score.clamp(0.0, 1.0))
}

impl Citation {
    /// Create a citation with the required fields
    pub fn new(
        source_type: SourceType,
        title: impl Into<String>,
        citation: impl Into<String>,
    ) -> Self {
        Self {
            source_type,
            title: title.into(),
            citation: citation.into(),
            jurisdiction: None,
            link: None,
            citation_summary: String::new(),
            is_supreme_court: false,
        }
    }

    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = Some(jurisdiction.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.citation_summary = summary.into();
        self
    }

    pub fn supreme_court(mut self, is_supreme_court: bool) -> Self {
        self.is_supreme_court = is_supreme_court;
        self
    }
}

impl LegalResearchAnswer {
    /// Decode an answer from a pipe completion, tolerating Markdown code fences.
    pub fn from_completion(completion: &str) -> Result<Self, String> {
        let json = extract_json_from_completion(completion)?;
        serde_json::from_str(json).map_err(|e| format!("Invalid LegalResearchAnswer: {}", e))
    }

    /// Pretty JSON rendering used as input to the verification stage.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}
