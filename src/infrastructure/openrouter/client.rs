use async_trait::async_trait;
use reqwest::{header, Client as ReqwestClient, Response};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::errors::ModelApiError;
use super::rate_limiter::TokenBucketRateLimiter;
use super::retry::RetryPolicy;
use super::types::{CompletionRequest, CompletionResponse};
use crate::domain::errors::DomainResult;
use crate::domain::models::{ChatRequest, Config};
use crate::domain::ports::ModelBackend;
use crate::infrastructure::credentials::ApiKey;
use crate::infrastructure::logging::SecretScrubber;

/// Configuration for the OpenRouter HTTP client
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Bearer credential
    pub api_key: ApiKey,

    /// Base URL of the API, without the `/chat/completions` suffix
    pub base_url: String,

    /// Application name sent in the `X-Title` attribution header
    pub app_title: String,

    /// Rate limit in requests per second
    pub rate_limit_rps: f64,

    /// Maximum retry attempts for transient errors
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    pub max_backoff_ms: u64,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenRouterConfig {
    /// Build the client configuration from the loaded application config
    pub fn from_config(config: &Config, api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: config.backend.base_url.clone(),
            app_title: config.backend.app_title.clone(),
            rate_limit_rps: config.rate_limit.requests_per_second,
            max_retries: config.retry.max_retries,
            initial_backoff_ms: config.retry.initial_backoff_ms,
            max_backoff_ms: config.retry.max_backoff_ms,
            timeout_secs: config.backend.timeout_secs,
        }
    }
}

/// HTTP client for OpenRouter's OpenAI-compatible chat completions API
///
/// Provides:
/// - Connection pooling and reuse
/// - Rate limiting via token bucket algorithm
/// - Optional exponential backoff for transient errors
/// - Structured error classification
pub struct OpenRouterClient {
    http_client: ReqwestClient,
    base_url: String,
    rate_limiter: TokenBucketRateLimiter,
    retry_policy: RetryPolicy,
    scrubber: SecretScrubber,
}

impl OpenRouterClient {
    /// Create a new client
    pub fn new(config: OpenRouterConfig) -> Result<Self, ModelApiError> {
        info!(
            base_url = %config.base_url,
            rate_limit_rps = config.rate_limit_rps,
            timeout_secs = config.timeout_secs,
            max_retries = config.max_retries,
            api_key = %config.api_key.redacted(),
            "initializing OpenRouter client"
        );

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!(
            "Bearer {}",
            config.api_key.expose()
        ))
        .map_err(|e| ModelApiError::InvalidRequest(format!("Invalid API key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if let Ok(title) = header::HeaderValue::from_str(&config.app_title) {
            headers.insert("X-Title", title);
        }

        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .tcp_nodelay(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter: TokenBucketRateLimiter::new(config.rate_limit_rps),
            retry_policy: RetryPolicy::new(
                config.max_retries,
                config.initial_backoff_ms,
                config.max_backoff_ms,
            ),
            scrubber: SecretScrubber::new(),
        })
    }

    /// Send a chat completion request
    #[instrument(skip(self, request), fields(model = %request.model, structured = request.response_format.is_some()))]
    pub async fn send_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ModelApiError> {
        let response = self
            .retry_policy
            .execute(|| self.execute_request(&request))
            .await?;

        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion succeeded"
            );
        }

        Ok(response)
    }

    /// Single request attempt (called by retry logic). Every attempt,
    /// retries included, takes a rate-limit token.
    async fn execute_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ModelApiError> {
        self.rate_limiter.acquire().await;

        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {}", url);

        let response = self.http_client.post(&url).json(request).send().await?;
        self.handle_response(response).await
    }

    /// Convert an HTTP response into a typed result
    async fn handle_response(&self, response: Response) -> Result<CompletionResponse, ModelApiError> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            let body = self.scrubber.scrub_message(&body);
            warn!(status = %status, body = %body, "model API error");
            return Err(ModelApiError::from_status(status, body));
        }

        let body = response.text().await?;
        let completion: CompletionResponse = serde_json::from_str(&body)?;

        if let Some(error) = completion.error {
            let message = self.scrubber.scrub_message(&error.message);
            warn!(code = error.code, message = %message, "provider error in response body");
            return Err(ModelApiError::ProviderError {
                code: error.code,
                message,
            });
        }

        Ok(completion)
    }
}

#[async_trait]
impl ModelBackend for OpenRouterClient {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    async fn complete(&self, request: ChatRequest) -> DomainResult<Option<String>> {
        let response = self.send_completion(request.into()).await?;
        Ok(response.into_content())
    }
}
