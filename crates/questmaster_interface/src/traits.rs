//! Collaborator traits.

use crate::{NarrativeProposal, OracleRequest, PlannerOutcome};
use async_trait::async_trait;
use questmaster_error::QuestResult;
use std::path::Path;

/// A language model that drafts narratives, models and repairs.
///
/// Output is raw text with no contract on content; callers validate
/// everything structured before trusting it.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Generate a completion for the request.
    async fn generate(&self, req: &OracleRequest) -> QuestResult<String>;

    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "gpt-4o").
    fn model_name(&self) -> &str;
}

/// An external classical planner.
///
/// Running the planner and not finding a plan is a normal
/// [`PlannerOutcome`]; only failing to run it at all is an error.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Search for a plan for the given domain and problem files.
    async fn solve(&self, domain: &Path, problem: &Path) -> QuestResult<PlannerOutcome>;

    /// Planner name for logging.
    fn name(&self) -> &str;
}

/// A human decision point for narrative rewrites.
#[async_trait]
pub trait ApprovalGate: Send + Sync {
    /// Returns `true` to apply the proposal, `false` to stop.
    async fn approve(&self, proposal: &NarrativeProposal) -> QuestResult<bool>;
}
