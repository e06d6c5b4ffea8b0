//! Chat completion request body.

use questmaster_interface::{OracleMessage, OracleRequest};
use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChatMessage {
    /// Role of the sender (system, user, assistant)
    pub role: String,
    /// Message text
    pub content: String,
}

impl From<&OracleMessage> for ChatMessage {
    fn from(message: &OracleMessage) -> Self {
        Self {
            role: message.role.to_string(),
            content: message.content.clone(),
        }
    }
}

impl ChatCompletionRequest {
    /// Builds the wire request, letting `req` override the client defaults.
    pub fn from_oracle(
        req: &OracleRequest,
        model: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Self {
        Self {
            model: model.to_string(),
            messages: req.messages.iter().map(ChatMessage::from).collect(),
            max_tokens: req.max_tokens.or(max_tokens),
            temperature: Some(req.temperature.unwrap_or(temperature)),
        }
    }
}
