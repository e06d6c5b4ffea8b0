//! External graph export.
//!
//! The game client addresses nodes as `node_<id>` and options as
//! `option_<i>`. That naming lives only here; the internal graph keys on raw
//! section numbers.

use crate::StoryGraph;
use derive_getters::Getters;
use indexmap::IndexMap;
use questmaster_error::{NarrativeError, NarrativeErrorKind};
use serde::{Deserialize, Serialize};

/// External identifier for a raw section number.
///
/// # Examples
///
/// ```
/// use questmaster_narrative::external_id;
///
/// assert_eq!(external_id(7), "node_7");
/// ```
pub fn external_id(raw: u32) -> String {
    format!("node_{}", raw)
}

fn option_key(index: usize) -> String {
    format!("option_{}", index)
}

/// One node in the exported document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ExportedNode {
    /// Section text
    description: String,
    /// `option_<i>` to `node_<target>`; empty for endings
    options: IndexMap<String, String>,
}

/// The exported graph document, nodes in ascending section order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphExport(IndexMap<String, ExportedNode>);

impl GraphExport {
    /// Node by external id.
    pub fn get(&self, external: &str) -> Option<&ExportedNode> {
        self.0.get(external)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the export has no nodes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// External ids in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Pretty JSON document.
    pub fn to_json_pretty(&self) -> Result<String, NarrativeError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| NarrativeError::new(NarrativeErrorKind::Serialization(e.to_string())))
    }

    /// Reads a previously written document.
    pub fn from_json(text: &str) -> Result<Self, NarrativeError> {
        serde_json::from_str(text)
            .map_err(|e| NarrativeError::new(NarrativeErrorKind::Serialization(e.to_string())))
    }
}

/// Maps a story graph onto the external document.
pub fn export_graph(graph: &StoryGraph) -> GraphExport {
    let nodes = graph
        .nodes()
        .map(|node| {
            let options = node
                .choices()
                .iter()
                .enumerate()
                .map(|(i, choice)| (option_key(i), external_id(*choice.target())))
                .collect();
            (
                external_id(*node.id()),
                ExportedNode {
                    description: node.description().clone(),
                    options,
                },
            )
        })
        .collect();
    GraphExport(nodes)
}
