use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Langbase error: {0}")]
    Langbase(#[from] LangbaseError),

    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    #[error("Validation failed: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Langbase API errors
#[derive(Debug, Error)]
pub enum LangbaseError {
    #[error("Langbase unavailable: {message} (retries: {retries})")]
    Unavailable { message: String, retries: u32 },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors talking to an MCP tool server over stdio
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Failed to spawn tool server '{command}': {message}")]
    Spawn { command: String, message: String },

    #[error("Tool server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("Tool {tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Tool server closed the connection")]
    Closed,

    #[error("No fact-check tool server configured")]
    NotConfigured,

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from a single agent stage
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{stage} stage call failed: {source}")]
    Langbase {
        stage: String,
        #[source]
        source: LangbaseError,
    },

    #[error("{stage} stage tool failure: {source}")]
    Tool {
        stage: String,
        #[source]
        source: McpError,
    },

    #[error("{stage} stage timed out after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    #[error("{stage} stage returned malformed output: {message}")]
    MalformedOutput { stage: String, message: String },

    #[error("{stage} stage returned {actual} output, expected {expected}")]
    UnexpectedOutput {
        stage: String,
        expected: String,
        actual: String,
    },
}

/// Reasons the verification stage did not produce an answer.
///
/// Never surfaced as a pipeline failure; the orchestrator falls back to the
/// unverified answer.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Verification disabled: {reason}")]
    Disabled { reason: String },

    #[error("Verification timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Verification failed: {0}")]
    Stage(#[from] StageError),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for Langbase operations
pub type LangbaseResult<T> = Result<T, LangbaseError>;

/// Result type alias for MCP tool server operations
pub type McpResult<T> = Result<T, McpError>;

/// Result type alias for stage runs
pub type StageResult<T> = Result<T, StageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing key");

        let err = AppError::Validation {
            field: "query".to_string(),
            reason: "cannot be empty".to_string(),
        };
        assert_eq!(err.to_string(), "Validation failed: query - cannot be empty");
    }

    #[test]
    fn test_langbase_error_display() {
        let err = LangbaseError::Unavailable {
            message: "server down".to_string(),
            retries: 3,
        };
        assert_eq!(err.to_string(), "Langbase unavailable: server down (retries: 3)");

        let err = LangbaseError::Api {
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 401 - unauthorized");

        let err = LangbaseError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Request timeout after 5000ms");
    }

    #[test]
    fn test_mcp_error_display() {
        let err = McpError::Timeout {
            operation: "initialize".to_string(),
            timeout_ms: 30000,
        };
        assert_eq!(err.to_string(), "initialize timed out after 30000ms");

        let err = McpError::Tool {
            tool: "perplexity_ask".to_string(),
            message: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "Tool perplexity_ask failed: rate limited");
    }

    #[test]
    fn test_stage_error_display() {
        let err = StageError::MalformedOutput {
            stage: "formulation".to_string(),
            message: "missing field `issue`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "formulation stage returned malformed output: missing field `issue`"
        );

        let err = StageError::Timeout {
            stage: "retrieval".to_string(),
            timeout_ms: 100,
        };
        assert_eq!(err.to_string(), "retrieval stage timed out after 100ms");
    }

    #[test]
    fn test_stage_error_conversion_to_app_error() {
        let stage_err = StageError::Timeout {
            stage: "retrieval".to_string(),
            timeout_ms: 10,
        };
        let app_err: AppError = stage_err.into();
        assert!(matches!(app_err, AppError::Stage(_)));
    }

    #[test]
    fn test_stage_error_conversion_to_verification_error() {
        let stage_err = StageError::Tool {
            stage: "verification".to_string(),
            source: McpError::Closed,
        };
        let err: VerificationError = stage_err.into();
        assert!(matches!(err, VerificationError::Stage(_)));
        assert!(err.to_string().contains("connection"));
    }
}
