//! Request and outcome types exchanged with collaborators.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Conversation roles understood by chat-style oracles.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions and context
    #[display("system")]
    System,
    /// Human-side content
    #[display("user")]
    User,
    /// Model-side content
    #[display("assistant")]
    Assistant,
}

/// A single message sent to the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleMessage {
    /// Sender role
    pub role: Role,
    /// Message text
    pub content: String,
}

impl OracleMessage {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A generation request.
///
/// # Examples
///
/// ```
/// use questmaster_interface::{OracleRequest, Role};
///
/// let request = OracleRequest::new("You are a PDDL expert.", "Model this story.");
/// assert_eq!(request.messages.len(), 2);
/// assert_eq!(request.messages[0].role, Role::System);
/// assert_eq!(request.temperature, None);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OracleRequest {
    /// Conversation messages in order
    pub messages: Vec<OracleMessage>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl OracleRequest {
    /// Creates a system + user request with backend defaults.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![OracleMessage::system(system), OracleMessage::user(user)],
            max_tokens: None,
            temperature: None,
        }
    }

    /// Text of the last user message, if any.
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Result of one planner run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
pub struct PlannerOutcome {
    /// Whether a plan was produced
    #[getter(skip)]
    solved: bool,
    /// Plan file contents when solved
    plan: Option<String>,
    /// Captured planner output (stdout then stderr)
    log: String,
    /// Process exit code, if the process exited normally
    exit_code: Option<i32>,
}

impl PlannerOutcome {
    /// A successful run that produced `plan`.
    pub fn solved(plan: impl Into<String>, log: impl Into<String>) -> Self {
        Self {
            solved: true,
            plan: Some(plan.into()),
            log: log.into(),
            exit_code: Some(0),
        }
    }

    /// A run that produced no plan.
    pub fn failed(log: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            solved: false,
            plan: None,
            log: log.into(),
            exit_code,
        }
    }

    /// Whether a plan was produced.
    pub fn is_solved(&self) -> bool {
        self.solved
    }
}

/// A narrative-level change suggested after an unsolvable model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct NarrativeProposal {
    /// Story version the proposal applies to
    story: String,
    /// Suggested changes, as prose
    suggestion: String,
    /// Planner log that motivated the proposal
    planner_log: String,
}

impl NarrativeProposal {
    /// Creates a proposal.
    pub fn new(
        story: impl Into<String>,
        suggestion: impl Into<String>,
        planner_log: impl Into<String>,
    ) -> Self {
        Self {
            story: story.into(),
            suggestion: suggestion.into(),
            planner_log: planner_log.into(),
        }
    }
}
