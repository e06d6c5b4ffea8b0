//! Chat completions client.

use crate::{ChatCompletionRequest, ChatCompletionResponse, OpenAiConfig};
use async_trait::async_trait;
use questmaster_error::{OracleError, OracleErrorKind, QuestResult};
use questmaster_interface::{Oracle, OracleRequest};
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::instrument;

/// Oracle backed by an OpenAI-compatible chat completions endpoint.
///
/// Transient failures (transport errors, 429, 5xx) are retried with
/// exponential backoff; anything else fails on the first attempt.
#[derive(Clone)]
pub struct OpenAiOracle {
    config: OpenAiConfig,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiOracle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAiOracle {
    /// Creates a client, resolving the API key up front.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no API key is available or the HTTP
    /// client cannot be built.
    #[instrument(skip(config), fields(base_url = %config.base_url(), model = %config.model()))]
    pub fn new(config: OpenAiConfig) -> Result<Self, OracleError> {
        let api_key = config.resolve_api_key()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("questmaster/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OracleError::new(OracleErrorKind::Configuration(e.to_string())))?;
        tracing::debug!("Created OpenAI-compatible oracle");
        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Client configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Sends one chat completion request without retrying.
    ///
    /// # Errors
    ///
    /// Returns an oracle error describing the transport, status or decoding
    /// failure.
    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OracleError> {
        let url = self.config.completions_url();
        tracing::debug!(url = %url, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Request failed");
                OracleError::new(OracleErrorKind::Http(e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Oracle returned error status");
            let kind = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                OracleErrorKind::RateLimited(body)
            } else {
                OracleErrorKind::Api {
                    status: status.as_u16(),
                    message: body,
                }
            };
            return Err(OracleError::new(kind));
        }

        response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse response");
            OracleError::new(OracleErrorKind::Deserialization(e.to_string()))
        })
    }

    async fn complete_with_retry(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OracleError> {
        let strategy = ExponentialBackoff::from_millis(*self.config.initial_backoff_ms())
            .factor(2)
            .max_delay(Duration::from_secs(*self.config.max_delay_secs()))
            .map(jitter)
            .take(*self.config.max_retries());

        Retry::spawn(strategy, || async move {
            match self.chat_completion(request).await {
                Ok(response) => Ok(response),
                Err(e) if e.kind.is_retryable() => {
                    tracing::warn!(error = %e, "Oracle call failed, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Permanent oracle error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    #[instrument(skip(self, req), fields(model = %self.config.model()))]
    async fn generate(&self, req: &OracleRequest) -> QuestResult<String> {
        let request = ChatCompletionRequest::from_oracle(
            req,
            self.config.model(),
            *self.config.temperature(),
            *self.config.max_tokens(),
        );
        let response = self.complete_with_retry(&request).await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Oracle usage"
            );
        }

        match response.first_text() {
            Some(text) => Ok(text.to_string()),
            None => Err(OracleError::new(OracleErrorKind::EmptyResponse(
                self.config.model().clone(),
            ))
            .into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        self.config.model()
    }
}
