//! Story graph types.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marker glyph for a winning ending.
pub const SUCCESS_GLYPH: char = '✅';
/// Marker glyph for a losing ending.
pub const FAILURE_GLYPH: char = '❌';

/// How a terminal node ends the story.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum TerminalOutcome {
    /// The quest is won
    #[display("success")]
    Success,
    /// The quest is lost
    #[display("failure")]
    Failure,
}

impl TerminalOutcome {
    /// Outcome marked in `text`, if any. Failure wins when both glyphs appear.
    pub fn detect(text: &str) -> Option<Self> {
        if text.contains(FAILURE_GLYPH) {
            Some(TerminalOutcome::Failure)
        } else if text.contains(SUCCESS_GLYPH) {
            Some(TerminalOutcome::Success)
        } else {
            None
        }
    }
}

/// A labelled edge to another section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct Choice {
    /// Text shown to the player
    label: String,
    /// Destination section id
    target: u32,
}

impl Choice {
    /// Creates a choice.
    pub fn new(label: impl Into<String>, target: u32) -> Self {
        Self {
            label: label.into(),
            target,
        }
    }
}

/// One numbered section of the story.
///
/// A terminal node never has choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct StoryNode {
    /// Section number
    id: u32,
    /// Section text without choice lines
    description: String,
    /// Outgoing choices in source order
    choices: Vec<Choice>,
    /// Ending, if this section is terminal
    outcome: Option<TerminalOutcome>,
}

impl StoryNode {
    /// Creates a node, dropping choices if the description marks an ending.
    pub fn new(id: u32, description: impl Into<String>, choices: Vec<Choice>) -> Self {
        let description = description.into();
        let outcome = TerminalOutcome::detect(&description);
        let choices = if outcome.is_some() { Vec::new() } else { choices };
        Self {
            id,
            description,
            choices,
            outcome,
        }
    }

    /// Whether the node ends the story.
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Story sections keyed by raw section number.
///
/// Built once per story version and replaced wholesale when the story
/// changes. Choices may point at sections that do not exist; [`get`]
/// returns `None` for them and [`dangling_references`] lists them.
///
/// [`get`]: StoryGraph::get
/// [`dangling_references`]: StoryGraph::dangling_references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryGraph {
    nodes: BTreeMap<u32, StoryNode>,
}

impl StoryGraph {
    pub(crate) fn from_nodes(nodes: BTreeMap<u32, StoryNode>) -> Self {
        Self { nodes }
    }

    /// Node by id.
    pub fn get(&self, id: u32) -> Option<&StoryNode> {
        self.nodes.get(&id)
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.values()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The lowest-numbered node, where play begins.
    pub fn start(&self) -> Option<&StoryNode> {
        self.nodes.values().next()
    }

    /// `(from, to)` pairs whose destination has no section.
    pub fn dangling_references(&self) -> Vec<(u32, u32)> {
        self.nodes
            .values()
            .flat_map(|node| {
                node.choices
                    .iter()
                    .filter(|c| !self.nodes.contains_key(&c.target))
                    .map(move |c| (node.id, c.target))
            })
            .collect()
    }

    /// Terminal nodes with the given outcome.
    pub fn endings(&self, outcome: TerminalOutcome) -> Vec<&StoryNode> {
        self.nodes
            .values()
            .filter(|n| n.outcome == Some(outcome))
            .collect()
    }
}
