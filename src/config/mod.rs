use std::env;
use std::time::Duration;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub langbase: LangbaseConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub pipes: PipeConfig,
    pub pipeline: PipelineConfig,
    pub fact_check: FactCheckConfig,
}

/// Langbase API configuration
#[derive(Debug, Clone)]
pub struct LangbaseConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Langbase pipe names for the three research agents
#[derive(Debug, Clone)]
pub struct PipeConfig {
    pub retrieval: String,
    pub formulation: String,
    pub verification: String,
    /// Model used when upserting the pipes.
    pub model: String,
}

/// Options the pipeline orchestrator is constructed with.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Knowledge source (Langbase memory) the retrieval agent searches.
    pub knowledge_source_id: String,
    /// Maximum number of passages the retrieval agent may return.
    pub max_results: u32,
    /// Credential handed to the fact-check tool server. Verification is
    /// skipped when absent.
    pub verification_credential: Option<String>,
    pub stage_timeouts: StageTimeouts,
}

/// Upper bounds for the blocking stage calls, in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct StageTimeouts {
    pub retrieval_ms: Option<u64>,
    pub formulation_ms: Option<u64>,
    pub verification_ms: u64,
}

/// How to spawn the MCP fact-check server for the verification stage
#[derive(Debug, Clone)]
pub struct FactCheckConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Name of the tool called on the server.
    pub tool: String,
    /// Environment variable the credential is exported as in the child.
    pub credential_env: String,
    /// Bound on the server handshake and on the tool call, in milliseconds.
    pub timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let langbase = LangbaseConfig {
            api_key: env::var("LANGBASE_API_KEY").map_err(|_| AppError::Config {
                message: "LANGBASE_API_KEY is required".to_string(),
            })?,
            base_url: env::var("LANGBASE_BASE_URL")
                .unwrap_or_else(|_| "https://api.langbase.com".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: parse_env("REQUEST_TIMEOUT_MS").unwrap_or(30000),
            max_retries: parse_env("MAX_RETRIES").unwrap_or(3),
            retry_delay_ms: parse_env("RETRY_DELAY_MS").unwrap_or(1000),
        };

        let pipes = PipeConfig {
            retrieval: env::var("PIPE_RETRIEVAL")
                .unwrap_or_else(|_| "legal-retrieval-v1".to_string()),
            formulation: env::var("PIPE_FORMULATION")
                .unwrap_or_else(|_| "legal-formulation-v1".to_string()),
            verification: env::var("PIPE_VERIFICATION")
                .unwrap_or_else(|_| "legal-verification-v1".to_string()),
            model: env::var("PIPE_MODEL").unwrap_or_else(|_| "openai:gpt-4o-mini".to_string()),
        };

        let pipeline = PipelineConfig {
            knowledge_source_id: env::var("KNOWLEDGE_SOURCE_ID").unwrap_or_default(),
            max_results: parse_env("RETRIEVAL_MAX_RESULTS").unwrap_or(5),
            verification_credential: env::var("PERPLEXITY_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            stage_timeouts: StageTimeouts {
                retrieval_ms: parse_env("RETRIEVAL_TIMEOUT_MS"),
                formulation_ms: parse_env("FORMULATION_TIMEOUT_MS"),
                verification_ms: parse_env("VERIFICATION_TIMEOUT_MS").unwrap_or(90000),
            },
        };

        let defaults = FactCheckConfig::default();
        let fact_check = FactCheckConfig {
            command: env::var("FACT_CHECK_COMMAND").unwrap_or(defaults.command),
            args: env::var("FACT_CHECK_ARGS")
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or(defaults.args),
            tool: env::var("FACT_CHECK_TOOL").unwrap_or(defaults.tool),
            credential_env: defaults.credential_env,
            timeout_ms: parse_env("FACT_CHECK_TIMEOUT_MS").unwrap_or(defaults.timeout_ms),
        };

        Ok(Config {
            langbase,
            logging,
            request,
            pipes,
            pipeline,
            fact_check,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

impl PipelineConfig {
    /// Reject configurations the orchestrator cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.knowledge_source_id.trim().is_empty() {
            return Err(AppError::Config {
                message: "KNOWLEDGE_SOURCE_ID must name a knowledge source".to_string(),
            });
        }
        if self.max_results == 0 {
            return Err(AppError::Config {
                message: "RETRIEVAL_MAX_RESULTS must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl StageTimeouts {
    pub fn retrieval(&self) -> Option<Duration> {
        self.retrieval_ms.map(Duration::from_millis)
    }

    pub fn formulation(&self) -> Option<Duration> {
        self.formulation_ms.map(Duration::from_millis)
    }

    pub fn verification(&self) -> Duration {
        Duration::from_millis(self.verification_ms)
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            retrieval_ms: None,
            formulation_ms: None,
            verification_ms: 90000,
        }
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            retrieval: "legal-retrieval-v1".to_string(),
            formulation: "legal-formulation-v1".to_string(),
            verification: "legal-verification-v1".to_string(),
            model: "openai:gpt-4o-mini".to_string(),
        }
    }
}

impl Default for FactCheckConfig {
    fn default() -> Self {
        Self {
            command: "npx".to_string(),
            args: vec!["-y".to_string(), "server-perplexity-ask".to_string()],
            tool: "perplexity_ask".to_string(),
            credential_env: "PERPLEXITY_API_KEY".to_string(),
            timeout_ms: 30000,
        }
    }
}
