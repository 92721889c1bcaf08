use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{AgentSpec, OutputSchema, StageOutput, StageRunner, ToolSet};
use crate::config::{FactCheckConfig, PipelineConfig};
use crate::error::{McpError, StageError, StageResult};
use crate::langbase::{LangbaseClient, Message, PipeRequest};
use crate::mcp::{McpServerParams, McpSession, DEFAULT_CLOSE_GRACE};
use crate::prompts::MAX_RESULTS_VARIABLE;
use crate::research::LegalResearchAnswer;

/// Fact-check tool reachable through an MCP server.
#[derive(Debug, Clone)]
pub struct FactCheckTool {
    pub server: McpServerParams,
    /// Tool name on the server.
    pub tool: String,
    /// Bound on the handshake and on each tool call.
    pub timeout: Duration,
    /// Time the server gets to exit after the session is closed.
    pub close_grace: Duration,
}

impl FactCheckTool {
    /// Build the tool from configuration; `None` without a credential.
    pub fn from_config(fact_check: &FactCheckConfig, pipeline: &PipelineConfig) -> Option<Self> {
        let credential = pipeline.verification_credential.as_ref()?;
        Some(Self {
            server: McpServerParams::new(&fact_check.command, fact_check.args.clone())
                .with_env(&fact_check.credential_env, credential),
            tool: fact_check.tool.clone(),
            timeout: Duration::from_millis(fact_check.timeout_ms),
            close_grace: DEFAULT_CLOSE_GRACE,
        })
    }

    /// Arguments in the chat-message shape perplexity-style ask tools take.
    fn arguments(&self, question: &str) -> Value {
        json!({ "messages": [{ "role": "user", "content": question }] })
    }
}

/// [`StageRunner`] backed by Langbase pipes.
#[derive(Clone)]
pub struct PipeStageRunner {
    langbase: LangbaseClient,
    fact_check: Option<FactCheckTool>,
}

impl PipeStageRunner {
    pub fn new(langbase: LangbaseClient, fact_check: Option<FactCheckTool>) -> Self {
        Self {
            langbase,
            fact_check,
        }
    }

    /// Run the agent's pipe once and decode the completion.
    async fn call_pipe(&self, agent: &AgentSpec, input: &str) -> StageResult<StageOutput> {
        let messages = vec![
            Message::system(agent.instructions.as_str()),
            Message::user(input),
        ];
        let mut request = PipeRequest::new(&agent.pipe, messages);
        if let ToolSet::KnowledgeSource { id, max_results } = &agent.tools {
            request = request
                .with_memory(id.as_str())
                .with_variable(MAX_RESULTS_VARIABLE, max_results.to_string());
        }
        if agent.output.is_some() {
            request = request.with_json_output(true);
        }

        let response = self
            .langbase
            .call_pipe(request)
            .await
            .map_err(|source| StageError::Langbase {
                stage: agent.stage.to_string(),
                source,
            })?;

        match agent.output {
            None => Ok(StageOutput::Text(response.completion)),
            Some(OutputSchema::LegalResearchAnswer) => {
                LegalResearchAnswer::from_completion(&response.completion)
                    .map(StageOutput::Answer)
                    .map_err(|message| StageError::MalformedOutput {
                        stage: agent.stage.to_string(),
                        message,
                    })
            }
        }
    }

    /// Open a scoped tool session, gather evidence, then run the pipe with it.
    ///
    /// The session is closed on every path. Once the evidence is in, it is
    /// shut down concurrently with the pipe call, so cleanup costs at most
    /// the close grace beyond the pipe's own latency.
    async fn call_with_fact_check(&self, agent: &AgentSpec, input: &str) -> StageResult<StageOutput> {
        let tool_error = |source: McpError| StageError::Tool {
            stage: agent.stage.to_string(),
            source,
        };
        let fact_check = self
            .fact_check
            .as_ref()
            .ok_or_else(|| tool_error(McpError::NotConfigured))?;

        let mut session = McpSession::connect(&fact_check.server, fact_check.timeout)
            .await
            .map_err(tool_error)?;

        let start = Instant::now();
        let evidence = match session
            .call_tool(&fact_check.tool, fact_check.arguments(&fact_check_question(input)))
            .await
        {
            Ok(evidence) => evidence,
            Err(e) => {
                close_session(session, fact_check.close_grace).await;
                return Err(tool_error(e));
            }
        };
        info!(
            stage = %agent.stage,
            tool = %fact_check.tool,
            latency_ms = start.elapsed().as_millis(),
            "Fact-check tool returned evidence"
        );

        let augmented = format!(
            "{}\n\nWeb evidence ({}):\n{}",
            input, fact_check.tool, evidence
        );
        let (result, ()) = tokio::join!(
            self.call_pipe(agent, &augmented),
            close_session(session, fact_check.close_grace)
        );
        result
    }
}

#[async_trait]
impl StageRunner for PipeStageRunner {
    async fn run(&self, agent: &AgentSpec, input: &str) -> StageResult<StageOutput> {
        debug!(stage = %agent.stage, pipe = %agent.pipe, "Running agent");
        match agent.tools {
            ToolSet::FactCheck => self.call_with_fact_check(agent, input).await,
            ToolSet::None | ToolSet::KnowledgeSource { .. } => self.call_pipe(agent, input).await,
        }
    }
}

async fn close_session(session: McpSession, grace: Duration) {
    if let Err(e) = session.close(grace).await {
        warn!(error = %e, "Failed to close fact-check tool server cleanly");
    }
}

/// Question sent to the fact-check tool for a verification input.
pub fn fact_check_question(input: &str) -> String {
    format!(
        "Check the current status of the cases and statutes in this legal analysis: \
         whether any were overruled, stayed, appealed or amended, recent Supreme Court \
         rulings on the issue, and whether the citations are accurate. Cite sources with URLs.\n\n{}",
        input
    )
}
