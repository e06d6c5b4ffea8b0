//! Oracle client configuration.

use derive_getters::Getters;
use questmaster_error::{BuilderError, OracleError, OracleErrorKind};
use serde::{Deserialize, Serialize};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Environment variable the API key is read from by default.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Settings for [`OpenAiOracle`](crate::OpenAiOracle).
///
/// Works against any server speaking the OpenAI chat completions protocol;
/// point `base_url` at it.
///
/// # Examples
///
/// ```
/// use questmaster_models::OpenAiConfigBuilder;
///
/// let config = OpenAiConfigBuilder::default()
///     .base_url("http://localhost:8080/v1")
///     .api_key("sk-local")
///     .build()
///     .unwrap();
/// assert_eq!(config.model(), "gpt-4o");
/// assert_eq!(*config.temperature(), 0.0);
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct OpenAiConfig {
    /// API root, without the `/chat/completions` suffix
    #[builder(default = "DEFAULT_BASE_URL.to_string()")]
    base_url: String,
    /// Model identifier
    #[builder(default = "DEFAULT_MODEL.to_string()")]
    model: String,
    /// Sampling temperature used when a request does not set one
    #[builder(default = "0.0")]
    temperature: f32,
    /// Token cap used when a request does not set one
    #[builder(default, setter(strip_option))]
    max_tokens: Option<u32>,
    /// Explicit API key; takes precedence over `api_key_env`
    #[builder(default, setter(strip_option))]
    #[getter(skip)]
    api_key: Option<String>,
    /// Environment variable holding the API key
    #[builder(default = "DEFAULT_API_KEY_ENV.to_string()")]
    api_key_env: String,
    /// Retries after the first attempt for transient failures
    #[builder(default = "3")]
    max_retries: usize,
    /// First backoff delay in milliseconds
    #[builder(default = "500")]
    initial_backoff_ms: u64,
    /// Upper bound on a single backoff delay in seconds
    #[builder(default = "30")]
    max_delay_secs: u64,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_tokens: None,
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            max_retries: 3,
            initial_backoff_ms: 500,
            max_delay_secs: 30,
        }
    }
}

impl OpenAiConfigBuilder {
    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if a field fails to build.
    pub fn build(&self) -> Result<OpenAiConfig, BuilderError> {
        self.build_internal()
            .map_err(|e| BuilderError::from(e.to_string()))
    }
}

impl OpenAiConfig {
    /// Resolves the API key from the explicit value or the environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if neither source yields a non-empty key.
    pub fn resolve_api_key(&self) -> Result<String, OracleError> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(OracleError::new(OracleErrorKind::Configuration(format!(
                "no API key configured and {} is not set",
                self.api_key_env
            )))),
        }
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
