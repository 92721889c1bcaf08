use crate::config::{PipeConfig, PipelineConfig};
use crate::prompts::{FORMULATION_PROMPT, RETRIEVAL_PROMPT, VERIFICATION_PROMPT};
use crate::stage::{AgentSpec, OutputSchema, Stage, ToolSet};

/// The three agents a research run uses.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchAgents {
    pub retrieval: AgentSpec,
    pub formulation: AgentSpec,
    pub verification: AgentSpec,
}

impl ResearchAgents {
    pub fn new(pipes: &PipeConfig, pipeline: &PipelineConfig) -> Self {
        Self {
            retrieval: retrieval_agent(pipes, pipeline),
            formulation: formulation_agent(pipes),
            verification: verification_agent(pipes),
        }
    }
}

/// Searches the configured knowledge source; free-text output.
pub fn retrieval_agent(pipes: &PipeConfig, pipeline: &PipelineConfig) -> AgentSpec {
    AgentSpec {
        stage: Stage::Retrieval,
        name: "Retrieval Agent".to_string(),
        pipe: pipes.retrieval.clone(),
        instructions: RETRIEVAL_PROMPT.to_string(),
        output: None,
        tools: ToolSet::KnowledgeSource {
            id: pipeline.knowledge_source_id.clone(),
            max_results: pipeline.max_results,
        },
    }
}

pub fn formulation_agent(pipes: &PipeConfig) -> AgentSpec {
    AgentSpec {
        stage: Stage::Formulation,
        name: "Formulation Agent".to_string(),
        pipe: pipes.formulation.clone(),
        instructions: FORMULATION_PROMPT.to_string(),
        output: Some(OutputSchema::LegalResearchAnswer),
        tools: ToolSet::None,
    }
}

/// Must exercise the fact-check tool.
pub fn verification_agent(pipes: &PipeConfig) -> AgentSpec {
    AgentSpec {
        stage: Stage::Verification,
        name: "Verification Agent".to_string(),
        pipe: pipes.verification.clone(),
        instructions: VERIFICATION_PROMPT.to_string(),
        output: Some(OutputSchema::LegalResearchAnswer),
        tools: ToolSet::FactCheck,
    }
}
