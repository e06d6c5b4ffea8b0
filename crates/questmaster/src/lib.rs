//! QuestMaster: interactive fiction kept honest by a classical planner.
//!
//! A language model drafts a branching story and a PDDL model of it; Fast
//! Downward checks that the quest can actually be won. When it cannot, a
//! reflection loop classifies the planner's complaint and either repairs the
//! model on its own or proposes a story change for a human to approve.
//!
//! # Architecture
//!
//! - `questmaster_error` - error types
//! - `questmaster_core` - PDDL domain, problem, facts and plan traces
//! - `questmaster_interface` - oracle, planner and approval traits
//! - `questmaster_storage` - versioned per-session artifact store
//! - `questmaster_narrative` - story graph parser, graph export, prompts
//! - `questmaster_planning` - effect simulator, Fast Downward adapter, reflection loop
//! - `questmaster_models` - OpenAI-compatible oracle
//! - `questmaster_server` - read-only graph HTTP endpoint
//!
//! This crate re-exports the public surface and adds layered configuration
//! and a console approval gate.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use questmaster::{
//!     ConsoleApproval, FileSystemStore, OpenAiOracle, QuestConfig, ReflectionController,
//!     StartMode,
//! };
//! use questmaster::ArtifactStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = QuestConfig::load()?;
//! let store = FileSystemStore::open(&config.store.root, &config.store.session).await?;
//! let oracle = OpenAiOracle::new(config.oracle.to_openai()?)?;
//! let planner = config.planner.to_fast_downward(store.workspace())?;
//! let approval = ConsoleApproval::stdin();
//!
//! let outcome = ReflectionController::new(&oracle, &planner, &approval, &store)
//!     .with_config(config.reflection.to_loop_config()?)
//!     .run(StartMode::FromLore)
//!     .await?;
//! println!("{}", outcome.state());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod approval;
mod config;

pub use approval::{ConsoleApproval, is_affirmative};
pub use config::{
    LoopSettings, OracleSettings, PlannerSettings, QuestConfig, ServerSettings, StoreSettings,
};

pub use questmaster_core::*;
pub use questmaster_error::*;
pub use questmaster_interface::*;
pub use questmaster_models::{OpenAiConfig, OpenAiConfigBuilder, OpenAiOracle};
pub use questmaster_narrative::{
    Choice, ExportedNode, GraphExport, StoryGraph, StoryNode, TerminalOutcome, export_graph,
    external_id, extract_json, extract_options, extract_pddl, parse_story, prompts,
    strip_code_fences,
};
pub use questmaster_planning::*;
pub use questmaster_server::{create_router, serve, serve_on};
pub use questmaster_storage::*;
