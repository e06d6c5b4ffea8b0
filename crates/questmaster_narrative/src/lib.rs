//! Narrative handling for QuestMaster.
//!
//! - [`parse_story`] turns numbered-section story text into a [`StoryGraph`]
//! - [`export_graph`] maps a graph onto the external `node_<id>` document
//!   served to the game client
//! - [`prompts`] holds the oracle prompt catalogue
//! - [`extract_json`], [`extract_pddl`] and [`extract_options`] pull
//!   structured content out of chatty oracle replies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod export;
mod extraction;
mod parser;
pub mod prompts;
mod story;

pub use export::{ExportedNode, GraphExport, export_graph, external_id};
pub use extraction::{extract_json, extract_options, extract_pddl, strip_code_fences};
pub use parser::parse_story;
pub use story::{Choice, StoryGraph, StoryNode, TerminalOutcome};
