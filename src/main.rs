use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use legal_research_pipeline::{
    config::{Config, LogFormat},
    langbase::LangbaseClient,
    render::{format_retrieved_context, render_answer},
    stage::{FactCheckTool, PipeStageRunner},
    PipelineOutcome, ResearchPipeline,
};

/// Answer a legal research question with the retrieval, formulation and
/// verification agents.
#[derive(Parser, Debug)]
#[command(name = "legal-research", version, about)]
struct Args {
    /// Research query
    #[arg(conflicts_with = "query_flag")]
    query: Option<String>,

    /// Research query (alternative to the positional argument)
    #[arg(long = "query", value_name = "QUERY")]
    query_flag: Option<String>,

    /// Knowledge source to search, overriding KNOWLEDGE_SOURCE_ID
    #[arg(long, value_name = "ID")]
    knowledge_source: Option<String>,

    /// Also print the retrieved context and final answer as JSON
    #[arg(long)]
    raw: bool,

    /// Create or update the three research pipes before running
    #[arg(long)]
    ensure_pipes: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load configuration
    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(id) = args.knowledge_source.clone() {
        config.pipeline.knowledge_source_id = id;
    }

    init_logging(&config);

    if let Err(e) = run(args, config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let query = args
        .query
        .or(args.query_flag)
        .ok_or_else(|| anyhow::anyhow!("a research query is required"))?;

    let langbase = LangbaseClient::new(&config.langbase, config.request.clone())?;
    info!(base_url = %config.langbase.base_url, "Langbase client initialized");

    if args.ensure_pipes {
        info!("Ensuring research pipes exist...");
        langbase
            .ensure_research_pipes(&config.pipes, &config.pipeline.knowledge_source_id)
            .await?;
    }

    let fact_check = FactCheckTool::from_config(&config.fact_check, &config.pipeline);
    if fact_check.is_none() {
        info!("PERPLEXITY_API_KEY not set, answers will be unverified");
    }

    let runner = PipeStageRunner::new(langbase, fact_check);
    let pipeline = ResearchPipeline::new(runner, &config.pipes, config.pipeline)?;

    let outcome = pipeline.run(&query).await?;
    info!(
        run_id = %outcome.run_id,
        elapsed_ms = outcome.elapsed_ms(),
        "Research complete"
    );

    print_outcome(&outcome, args.raw)?;
    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome, raw: bool) -> anyhow::Result<()> {
    println!("{}", format_retrieved_context(&outcome.context));
    println!();
    println!("{}", render_answer(outcome.answer.answer()));

    if let Some(reason) = outcome.answer.unverified_reason() {
        println!();
        println!("> _Unverified answer: {}_", reason);
    }

    if raw {
        println!();
        println!("```json\n{}\n```", outcome.context.to_debug_string());
        println!();
        println!(
            "```json\n{}\n```",
            serde_json::to_string_pretty(&outcome.answer)?
        );
    }
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
