//! Trait definitions for QuestMaster collaborators.
//!
//! The reflection loop talks to three external parties, each behind a trait:
//!
//! - [`Oracle`]: a language model, prompt in and unvalidated text out
//! - [`Planner`]: a classical planner run over domain and problem files
//! - [`ApprovalGate`]: a human who accepts or rejects narrative rewrites
//!
//! Concrete implementations live in `questmaster_models` (oracle) and
//! `questmaster_planning` (planner); tests supply scripted ones.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{ApprovalGate, Oracle, Planner};
pub use types::{NarrativeProposal, OracleMessage, OracleRequest, PlannerOutcome, Role};
