//! Layered application configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (`questmaster.toml` shipped with the crate)
//! 2. `~/.config/questmaster/questmaster.toml`
//! 3. `./questmaster.toml`
//! 4. `QUESTMASTER_<SECTION>__<KEY>` environment variables

use config::{Config, Environment, File, FileFormat};
use questmaster_error::{BuilderError, ConfigError, QuestResult};
use questmaster_models::{OpenAiConfig, OpenAiConfigBuilder};
use questmaster_planning::{FastDownward, FastDownwardBuilder, LoopConfig, LoopConfigBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../questmaster.toml");

/// Oracle endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleSettings {
    /// API root of an OpenAI-compatible server
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Token cap per completion
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Retries for transient failures
    #[serde(default)]
    pub max_retries: usize,
}

impl OracleSettings {
    /// Client configuration for these settings.
    ///
    /// # Errors
    ///
    /// Returns error if the client configuration fails to build.
    pub fn to_openai(&self) -> Result<OpenAiConfig, BuilderError> {
        let mut builder = OpenAiConfigBuilder::default();
        builder
            .base_url(self.base_url.as_str())
            .model(self.model.as_str())
            .temperature(self.temperature)
            .api_key_env(self.api_key_env.as_str())
            .max_retries(self.max_retries);
        if let Some(max_tokens) = self.max_tokens {
            builder.max_tokens(max_tokens);
        }
        builder.build()
    }
}

/// Fast Downward settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// Planner executable
    pub command: String,
    /// Extra arguments placed before the planner's own options
    #[serde(default)]
    pub args: Vec<String>,
    /// Search configuration
    pub search: String,
    /// Plan file name
    pub plan_file: String,
    /// Wall-clock limit in seconds
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
}

impl PlannerSettings {
    /// Planner adapter running in `work_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if the adapter fails to build.
    pub fn to_fast_downward(
        &self,
        work_dir: impl Into<PathBuf>,
    ) -> Result<FastDownward, BuilderError> {
        let mut builder = FastDownwardBuilder::default();
        builder
            .command(self.command.as_str())
            .args(self.args.clone())
            .search(self.search.as_str())
            .plan_file(self.plan_file.as_str())
            .work_dir(work_dir.into());
        if let Some(secs) = self.time_limit_secs {
            builder.time_limit_secs(secs);
        }
        builder.build()
    }
}

/// Reflection loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopSettings {
    /// Model repairs before giving up
    pub max_model_repairs: u32,
    /// Narrative rewrites before giving up
    pub max_narrative_repairs: u32,
    /// Start from a stored story instead of generating one from lore
    #[serde(default)]
    pub skip_story_generation: bool,
}

impl LoopSettings {
    /// Repair budgets for the controller.
    ///
    /// # Errors
    ///
    /// Returns error if the loop configuration fails to build.
    pub fn to_loop_config(&self) -> Result<LoopConfig, BuilderError> {
        LoopConfigBuilder::default()
            .max_model_repairs(self.max_model_repairs)
            .max_narrative_repairs(self.max_narrative_repairs)
            .build()
    }
}

/// Artifact store location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Directory holding all sessions
    pub root: PathBuf,
    /// Session name
    pub session: String,
}

/// Graph server binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

/// Top-level QuestMaster configuration.
///
/// # Example
///
/// ```no_run
/// use questmaster::QuestConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = QuestConfig::load()?;
/// println!("Planning with {}", config.planner.command);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestConfig {
    /// Oracle endpoint
    pub oracle: OracleSettings,
    /// Planner process
    pub planner: PlannerSettings,
    /// Repair budgets
    #[serde(rename = "loop")]
    pub reflection: LoopSettings,
    /// Artifact store
    pub store: StoreSettings,
    /// Graph server
    pub server: ServerSettings,
}

impl QuestConfig {
    /// Load configuration from the default locations and the environment.
    ///
    /// # Errors
    ///
    /// Returns error if a source cannot be read or the result is invalid.
    #[instrument]
    pub fn load() -> QuestResult<Self> {
        let mut files = Vec::new();
        if let Some(home) = dirs::home_dir() {
            files.push(home.join(".config/questmaster/questmaster.toml"));
        }
        files.push(PathBuf::from("questmaster.toml"));
        Self::load_with(&files, None)
    }

    /// Load the bundled defaults overlaid with one explicit file and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing, cannot be parsed, or the result
    /// is invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> QuestResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::new(format!(
                "Configuration file {} does not exist",
                path.display()
            ))
            .into());
        }
        Self::load_with(&[path.to_path_buf()], None)
    }

    /// Layers the bundled defaults, each of `files` in order (missing files
    /// are skipped), then environment overrides.
    ///
    /// `env` replaces the process environment as the override source when
    /// given; keys use the same `QUESTMASTER_<SECTION>__<KEY>` form.
    ///
    /// # Errors
    ///
    /// Returns error if a source cannot be parsed or the result is invalid.
    pub fn load_with(
        files: &[PathBuf],
        env: Option<HashMap<String, String>>,
    ) -> QuestResult<Self> {
        debug!(files = files.len(), "Loading configuration");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));
        for file in files {
            builder = builder.add_source(File::from(file.as_path()).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("QUESTMASTER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system does not.
    ///
    /// # Errors
    ///
    /// Returns error naming the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oracle.model.trim().is_empty() {
            return Err(ConfigError::new("oracle.model is empty"));
        }
        if self.planner.command.trim().is_empty() {
            return Err(ConfigError::new("planner.command is empty"));
        }
        if self.planner.search.trim().is_empty() {
            return Err(ConfigError::new("planner.search is empty"));
        }
        let session = &self.store.session;
        if session.is_empty() || session.contains(['/', '\\']) || session.starts_with('.') {
            return Err(ConfigError::new(format!(
                "store.session '{}' is not a plain directory name",
                session
            )));
        }
        Ok(())
    }

    /// Directory of the configured session.
    pub fn session_dir(&self) -> PathBuf {
        self.store.root.join(&self.store.session)
    }
}
