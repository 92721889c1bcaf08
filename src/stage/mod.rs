//! Stage runner: one agent invocation.
//!
//! [`StageRunner`] is the seam between the orchestrator and the hosted
//! agents. [`PipeStageRunner`] implements it over Langbase pipes and an MCP
//! fact-check server.

mod pipe_runner;

pub use pipe_runner::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{StageError, StageResult};
use crate::research::LegalResearchAnswer;

/// The three pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Retrieval,
    Formulation,
    Verification,
}

impl Stage {
    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Retrieval => "retrieval",
            Stage::Formulation => "formulation",
            Stage::Verification => "verification",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured output an agent can be constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSchema {
    LegalResearchAnswer,
}

/// Tools an agent is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolSet {
    None,
    /// Search a knowledge source (Langbase memory), returning at most
    /// `max_results` passages.
    KnowledgeSource { id: String, max_results: u32 },
    /// Web fact-check via the MCP tool server; used at least once per run.
    FactCheck,
}

/// Identity of one agent: what it is told and what it may return.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSpec {
    pub stage: Stage,
    /// Display name, e.g. "Retrieval Agent".
    pub name: String,
    /// Hosted pipe the agent runs on.
    pub pipe: String,
    pub instructions: String,
    pub output: Option<OutputSchema>,
    pub tools: ToolSet,
}

/// What a stage produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    Text(String),
    Answer(LegalResearchAnswer),
}

impl StageOutput {
    fn kind(&self) -> &'static str {
        match self {
            StageOutput::Text(_) => "text",
            StageOutput::Answer(_) => "structured",
        }
    }

    /// Free text of an unconstrained stage.
    pub fn into_text(self, stage: Stage) -> StageResult<String> {
        match self {
            StageOutput::Text(text) => Ok(text),
            other => Err(StageError::UnexpectedOutput {
                stage: stage.to_string(),
                expected: "text".to_string(),
                actual: other.kind().to_string(),
            }),
        }
    }

    /// Answer of a schema-constrained stage.
    pub fn into_answer(self, stage: Stage) -> StageResult<LegalResearchAnswer> {
        match self {
            StageOutput::Answer(answer) => Ok(answer),
            other => Err(StageError::UnexpectedOutput {
                stage: stage.to_string(),
                expected: "structured".to_string(),
                actual: other.kind().to_string(),
            }),
        }
    }
}

/// Runs one agent against a textual input.
///
/// Returns [`StageOutput::Text`] when the agent has no output schema and
/// [`StageOutput::Answer`] when it does. Retries and request timeouts belong
/// to the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StageRunner: Send + Sync {
    async fn run(&self, agent: &AgentSpec, input: &str) -> StageResult<StageOutput>;
}
