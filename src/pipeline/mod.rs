//! Research pipeline orchestrator.
//!
//! Runs Retrieve → Formulate → Verify strictly in sequence. Retrieval and
//! formulation failures are hard errors. Any verification failure falls back
//! to the formulation answer, so a run that got that far always completes.

mod agents;
mod outcome;

pub use agents::*;
pub use outcome::*;

use std::future::Future;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{PipeConfig, PipelineConfig};
use crate::error::{AppError, AppResult, StageError, StageResult, VerificationError};
use crate::research::{LegalResearchAnswer, RetrievedContext};
use crate::stage::{Stage, StageOutput, StageRunner};

/// Sequences the three research agents over a [`StageRunner`].
pub struct ResearchPipeline<R> {
    runner: R,
    agents: ResearchAgents,
    config: PipelineConfig,
}

impl<R: StageRunner> ResearchPipeline<R> {
    /// Create a pipeline; fails when the configuration names no knowledge source.
    pub fn new(runner: R, pipes: &PipeConfig, config: PipelineConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            runner,
            agents: ResearchAgents::new(pipes, &config),
            config,
        })
    }

    pub fn agents(&self) -> &ResearchAgents {
        &self.agents
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Answer one research query.
    pub async fn run(&self, query: &str) -> AppResult<PipelineOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation {
                field: "query".to_string(),
                reason: "Query cannot be empty".to_string(),
            });
        }

        let run_id = Uuid::new_v4();
        self.run_stages(run_id, query)
            .instrument(info_span!("pipeline", run_id = %run_id))
            .await
    }

    async fn run_stages(&self, run_id: Uuid, query: &str) -> AppResult<PipelineOutcome> {
        let started_at = Utc::now();
        let start = Instant::now();

        let context = self.retrieve(query).await?;
        if context.is_empty() {
            warn!("Retrieval returned no passages");
        }

        let candidate = self.formulate(query, &context).await?;

        let answer = match self.verify(query, &candidate).await {
            Ok(verified) => ResearchAnswer::Verified { answer: verified },
            Err(VerificationError::Disabled { reason }) => {
                info!(reason = %reason, "Verification skipped, returning unverified answer");
                ResearchAnswer::Unverified {
                    answer: candidate,
                    reason,
                }
            }
            Err(e) => {
                warn!(error = %e, "Verification failed, returning unverified answer");
                ResearchAnswer::Unverified {
                    answer: candidate,
                    reason: e.to_string(),
                }
            }
        };

        info!(
            verified = answer.is_verified(),
            citations = answer.answer().citations.len(),
            latency_ms = start.elapsed().as_millis(),
            "Research pipeline completed"
        );

        Ok(PipelineOutcome {
            run_id,
            query: query.to_string(),
            context,
            answer,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Stage 1: search the knowledge source with the raw query.
    pub async fn retrieve(&self, query: &str) -> StageResult<RetrievedContext> {
        let agent = &self.agents.retrieval;
        let output = bounded(
            agent.stage,
            self.config.stage_timeouts.retrieval(),
            self.runner.run(agent, query),
        )
        .instrument(info_span!("stage", name = %agent.stage))
        .await?;

        Ok(RetrievedContext::from_completion(
            &output.into_text(agent.stage)?,
        ))
    }

    /// Stage 2: synthesize a candidate answer from the query and context.
    pub async fn formulate(
        &self,
        query: &str,
        context: &RetrievedContext,
    ) -> StageResult<LegalResearchAnswer> {
        let agent = &self.agents.formulation;
        let input = formulation_input(query, context);
        let output = bounded(
            agent.stage,
            self.config.stage_timeouts.formulation(),
            self.runner.run(agent, &input),
        )
        .instrument(info_span!("stage", name = %agent.stage))
        .await?;

        output.into_answer(agent.stage)
    }

    /// Stage 3: fact-check the candidate.
    ///
    /// Bounded by the verification timeout. The returned answer replaces the
    /// candidate wholesale.
    pub async fn verify(
        &self,
        query: &str,
        candidate: &LegalResearchAnswer,
    ) -> Result<LegalResearchAnswer, VerificationError> {
        if self.config.verification_credential.is_none() {
            return Err(VerificationError::Disabled {
                reason: "no verification credential configured".to_string(),
            });
        }

        let agent = &self.agents.verification;
        let input = verification_input(query, candidate);
        let limit = self.config.stage_timeouts.verification();

        let output = tokio::time::timeout(limit, self.runner.run(agent, &input))
            .instrument(info_span!("stage", name = %agent.stage))
            .await
            .map_err(|_| VerificationError::Timeout {
                timeout_ms: limit.as_millis() as u64,
            })??;

        Ok(output.into_answer(agent.stage)?)
    }
}

/// Apply an optional caller-defined bound to a stage call.
async fn bounded<F>(stage: Stage, limit: Option<Duration>, call: F) -> StageResult<StageOutput>
where
    F: Future<Output = StageResult<StageOutput>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| StageError::Timeout {
                stage: stage.to_string(),
                timeout_ms: limit.as_millis() as u64,
            })?,
        None => call.await,
    }
}

/// Input for the formulation agent.
pub fn formulation_input(query: &str, context: &RetrievedContext) -> String {
    format!(
        "Query: {}\n\nContext:\n{}\n\nSynthesize LegalResearchAnswer per schema.",
        query, context
    )
}

/// Input for the verification agent; carries the full candidate as JSON.
pub fn verification_input(query: &str, candidate: &LegalResearchAnswer) -> String {
    format!(
        "Query: {}\n\nAnalysis:\n{}\n\nTask: Web-verify via MCP; update if needed; return LegalResearchAnswer.",
        query,
        candidate.to_pretty_json()
    )
}
