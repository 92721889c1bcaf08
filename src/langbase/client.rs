use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::types::{CreatePipeRequest, CreatePipeResponse, Message, PipeRequest, PipeResponse};
use crate::config::{LangbaseConfig, PipeConfig, RequestConfig};
use crate::error::{LangbaseError, LangbaseResult};
use crate::prompts::{FORMULATION_PROMPT, RETRIEVAL_PROMPT, VERIFICATION_PROMPT};

/// Client for interacting with Langbase Pipes API
#[derive(Clone)]
pub struct LangbaseClient {
    client: Client,
    base_url: String,
    api_key: String,
    request_config: RequestConfig,
}

impl LangbaseClient {
    /// Create a new Langbase client
    pub fn new(config: &LangbaseConfig, request_config: RequestConfig) -> LangbaseResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(LangbaseError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Call a Langbase pipe with the given request
    pub async fn call_pipe(&self, request: PipeRequest) -> LangbaseResult<PipeResponse> {
        let url = format!("{}/v1/pipes/run", self.base_url);
        let pipe_name = request.name.clone();

        let mut last_error = None;
        let mut retries = 0;

        while retries <= self.request_config.max_retries {
            if retries > 0 {
                let delay = Duration::from_millis(
                    self.request_config.retry_delay_ms * (2_u64.pow(retries - 1)),
                );
                warn!(
                    pipe = %pipe_name,
                    retry = retries,
                    delay_ms = delay.as_millis(),
                    "Retrying Langbase request"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();

            match self.execute_request(&url, &request).await {
                Ok(response) => {
                    info!(
                        pipe = %pipe_name,
                        latency_ms = start.elapsed().as_millis(),
                        "Langbase pipe call succeeded"
                    );
                    return Ok(response);
                }
                Err(e) if is_permanent(&e) => {
                    error!(pipe = %pipe_name, error = %e, "Langbase rejected pipe call");
                    return Err(e);
                }
                Err(e) => {
                    error!(
                        pipe = %pipe_name,
                        error = %e,
                        latency_ms = start.elapsed().as_millis(),
                        retry = retries,
                        "Langbase pipe call failed"
                    );
                    last_error = Some(e);
                    retries += 1;
                }
            }
        }

        Err(LangbaseError::Unavailable {
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
            retries,
        })
    }

    /// Execute a single request (internal)
    async fn execute_request(
        &self,
        url: &str,
        request: &PipeRequest,
    ) -> LangbaseResult<PipeResponse> {
        debug!(
            pipe = %request.name,
            messages = request.messages.len(),
            memory = request.memory.as_ref().map_or(0, Vec::len),
            "Calling Langbase pipe"
        );

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LangbaseError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    LangbaseError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LangbaseError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let pipe_response: PipeResponse =
            response
                .json()
                .await
                .map_err(|e| LangbaseError::InvalidResponse {
                    message: format!("Failed to parse response: {}", e),
                })?;

        if !pipe_response.success {
            return Err(LangbaseError::InvalidResponse {
                message: format!("Pipe {} reported an unsuccessful run", request.name),
            });
        }

        Ok(pipe_response)
    }

    /// Create a new pipe
    pub async fn create_pipe(
        &self,
        request: CreatePipeRequest,
    ) -> LangbaseResult<CreatePipeResponse> {
        let url = format!("{}/v1/pipes", self.base_url);

        info!(pipe = %request.name, "Creating Langbase pipe");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(LangbaseError::Http)?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LangbaseError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let pipe_response: CreatePipeResponse =
            response
                .json()
                .await
                .map_err(|e| LangbaseError::InvalidResponse {
                    message: format!("Failed to parse create pipe response: {}", e),
                })?;

        info!(
            pipe = %pipe_response.name,
            url = %pipe_response.url,
            "Pipe created successfully"
        );

        Ok(pipe_response)
    }

    /// Upsert a pipe, treating "already exists" as success
    pub async fn ensure_pipe(&self, request: CreatePipeRequest) -> LangbaseResult<()> {
        let pipe_name = request.name.clone();
        match self.create_pipe(request).await {
            Ok(_) => {
                info!(pipe = %pipe_name, "Pipe ready");
                Ok(())
            }
            Err(LangbaseError::Api { status: 409, .. }) => {
                info!(pipe = %pipe_name, "Pipe already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Ensure the retrieval, formulation and verification pipes exist.
    ///
    /// The retrieval pipe is bound to `knowledge_source_id`; the other two
    /// run in JSON output mode.
    pub async fn ensure_research_pipes(
        &self,
        pipes: &PipeConfig,
        knowledge_source_id: &str,
    ) -> LangbaseResult<()> {
        let retrieval = CreatePipeRequest::new(&pipes.retrieval)
            .with_description("Retrieves verbatim passages from the legal corpus")
            .with_model(&pipes.model)
            .with_upsert(true)
            .with_temperature(0.0)
            .with_messages(vec![Message::system(RETRIEVAL_PROMPT)])
            .with_memory(knowledge_source_id);

        let formulation = CreatePipeRequest::new(&pipes.formulation)
            .with_description("Synthesizes an IRAC legal research answer from context")
            .with_model(&pipes.model)
            .with_upsert(true)
            .with_json_output(true)
            .with_temperature(0.2)
            .with_max_tokens(3000)
            .with_messages(vec![Message::system(FORMULATION_PROMPT)]);

        let verification = CreatePipeRequest::new(&pipes.verification)
            .with_description("Verifies a legal research answer against web sources")
            .with_model(&pipes.model)
            .with_upsert(true)
            .with_json_output(true)
            .with_temperature(0.2)
            .with_max_tokens(3000)
            .with_messages(vec![Message::system(VERIFICATION_PROMPT)]);

        for request in [retrieval, formulation, verification] {
            self.ensure_pipe(request).await?;
        }
        Ok(())
    }
}

/// Client errors other than rate limiting will not improve on retry.
fn is_permanent(error: &LangbaseError) -> bool {
    matches!(error, LangbaseError::Api { status, .. } if (400..500).contains(status) && *status != 429)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = LangbaseConfig {
            api_key: "test_key".to_string(),
            base_url: "https://api.langbase.com".to_string(),
        };

        let client = LangbaseClient::new(&config, RequestConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_is_permanent() {
        let api = |status| LangbaseError::Api {
            status,
            message: String::new(),
        };
        assert!(is_permanent(&api(401)));
        assert!(is_permanent(&api(404)));
        assert!(!is_permanent(&api(429)));
        assert!(!is_permanent(&api(503)));
        assert!(!is_permanent(&LangbaseError::Timeout { timeout_ms: 10 }));
    }
}
