//! Oracle backends for QuestMaster.
//!
//! [`OpenAiOracle`] talks to any endpoint that speaks the OpenAI chat
//! completions protocol, which covers OpenAI itself and most local inference
//! servers.
//!
//! ```no_run
//! use questmaster_interface::{Oracle, OracleRequest};
//! use questmaster_models::{OpenAiConfig, OpenAiOracle};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let oracle = OpenAiOracle::new(OpenAiConfig::default())?;
//! let reply = oracle
//!     .generate(&OracleRequest::new("You are a storyteller.", "Begin."))
//!     .await?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod request;
mod response;

pub use client::OpenAiOracle;
pub use config::{
    DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiConfig, OpenAiConfigBuilder,
};
pub use request::{ChatCompletionRequest, ChatMessage};
pub use response::{ChatCompletionResponse, Choice, ChoiceMessage, Usage};
