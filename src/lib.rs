//! # Legal Research Pipeline
//!
//! Answers legal research questions with three hosted agents run in sequence
//! over Langbase Pipes:
//!
//! - **Retrieval**: searches a legal knowledge source (Langbase memory) and
//!   returns verbatim passages
//! - **Formulation**: synthesizes an IRAC-structured [`LegalResearchAnswer`]
//!   from the query and the passages
//! - **Verification**: fact-checks the answer with a web search tool served
//!   over MCP, falling back to the formulation answer when it fails
//!
//! ## Architecture
//!
//! ```text
//! query → ResearchPipeline → StageRunner → Langbase Pipes (HTTP)
//!                                 ↓
//!                     MCP fact-check server (stdio)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use legal_research_pipeline::{Config, ResearchPipeline};
//! use legal_research_pipeline::langbase::LangbaseClient;
//! use legal_research_pipeline::render::render_answer;
//! use legal_research_pipeline::stage::{FactCheckTool, PipeStageRunner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let langbase = LangbaseClient::new(&config.langbase, config.request.clone())?;
//!     let fact_check = FactCheckTool::from_config(&config.fact_check, &config.pipeline);
//!     let runner = PipeStageRunner::new(langbase, fact_check);
//!     let pipeline = ResearchPipeline::new(runner, &config.pipes, config.pipeline)?;
//!
//!     let outcome = pipeline.run("Is a blanket internet shutdown constitutional?").await?;
//!     println!("{}", render_answer(outcome.answer.answer()));
//!     Ok(())
//! }
//! ```

/// Configuration loaded from environment variables.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// Langbase API client and types for pipe communication.
pub mod langbase;
/// Minimal MCP client for stdio tool servers.
pub mod mcp;
/// Research pipeline orchestrator.
pub mod pipeline;
/// System prompts for the research pipes.
pub mod prompts;
/// Markdown rendering of retrieved context and answers.
pub mod render;
/// Legal research data model.
pub mod research;
/// Stage runner seam and its Langbase-backed implementation.
pub mod stage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use pipeline::{PipelineOutcome, ResearchAnswer, ResearchPipeline};
pub use research::{Citation, LegalResearchAnswer, RetrievedContext, SourceType};
