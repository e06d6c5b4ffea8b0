//! Numbered-section story parser.

use crate::{Choice, StoryGraph, StoryNode};
use questmaster_error::{NarrativeError, NarrativeErrorKind};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// `12`, `12.`, `12)`, `## 12.`, `**12.**`, followed by whitespace or end of line.
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(?:#{1,6}[ \t]*)?(?:\*\*)?(\d+)[.):]?(?:\*\*)?(?:[ \t]+|$)")
        .expect("Valid header regex")
});

/// `<label> [go to <id>]`, optionally with an outcome glyph by the id.
static CHOICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)\s*\[\s*go\s+to\s+(\d+)\s*[✅❌]?\s*\]").expect("Valid choice regex")
});

const ARROWS: [&str; 2] = ["→", "->"];

struct Section {
    id: u32,
    description: Vec<String>,
    choices: Vec<Choice>,
}

impl Section {
    fn into_node(self) -> StoryNode {
        let description = self.description.join("\n").trim().to_string();
        StoryNode::new(self.id, description, self.choices)
    }
}

/// Parses story text into a graph.
///
/// Sections start at numbered lines. Lines starting with `→` (or `->`) are
/// choices of the form `label [go to N]`; every other line belongs to the
/// section description. Text before the first section is ignored. A line
/// numbered 0, or past `u32::MAX`, is prose rather than a header.
///
/// # Errors
///
/// Fails if the text is blank or has no numbered section.
///
/// # Examples
///
/// ```
/// use questmaster_narrative::parse_story;
///
/// let graph = parse_story("1 Start\n→ Go [go to 2]\n2 The End ✅\n").unwrap();
/// assert_eq!(graph.len(), 2);
/// assert_eq!(graph.get(1).unwrap().choices()[0].target(), &2);
/// assert!(graph.get(2).unwrap().is_terminal());
/// ```
#[tracing::instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_story(text: &str) -> Result<StoryGraph, NarrativeError> {
    if text.trim().is_empty() {
        return Err(NarrativeError::new(NarrativeErrorKind::EmptyNarrative));
    }

    let mut nodes = BTreeMap::new();
    let mut current: Option<Section> = None;

    for line in text.lines() {
        if let Some((id, rest)) = section_header(line) {
            if let Some(section) = current.take() {
                insert_section(&mut nodes, section);
            }
            current = Some(Section {
                id,
                description: vec![rest.to_string()],
                choices: Vec::new(),
            });
            continue;
        }

        let Some(section) = current.as_mut() else {
            if !line.trim().is_empty() {
                tracing::debug!(line, "Skipping text before first section");
            }
            continue;
        };

        match choice_body(line) {
            Some(body) => match parse_choice(body) {
                Some(choice) => section.choices.push(choice),
                None => tracing::debug!(section = section.id, line, "Skipping unmatched choice line"),
            },
            None => section.description.push(line.to_string()),
        }
    }

    if let Some(section) = current.take() {
        insert_section(&mut nodes, section);
    }

    if nodes.is_empty() {
        return Err(NarrativeError::new(NarrativeErrorKind::NoSections(text.len())));
    }

    let graph = StoryGraph::from_nodes(nodes);
    let dangling = graph.dangling_references();
    if !dangling.is_empty() {
        tracing::warn!(count = dangling.len(), ?dangling, "Story has choices to missing sections");
    }
    tracing::debug!(nodes = graph.len(), "Parsed story graph");
    Ok(graph)
}

/// Section id and the text after the header, if `line` opens a section.
fn section_header(line: &str) -> Option<(u32, &str)> {
    let header = HEADER.captures(line)?;
    let number = &header[1];
    match number.parse::<u32>() {
        Ok(id) if id > 0 => {
            let end = header.get(0).map_or(0, |m| m.end());
            Some((id, line[end..].trim()))
        }
        _ => {
            tracing::debug!(number, "Numbered line is not a section header");
            None
        }
    }
}

fn insert_section(nodes: &mut BTreeMap<u32, StoryNode>, section: Section) {
    if nodes.contains_key(&section.id) {
        tracing::warn!(section = section.id, "Duplicate section number, keeping the first");
        return;
    }
    nodes.insert(section.id, section.into_node());
}

fn choice_body(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    ARROWS
        .iter()
        .find_map(|arrow| trimmed.strip_prefix(arrow))
        .map(str::trim)
}

fn parse_choice(body: &str) -> Option<Choice> {
    let caps = CHOICE.captures(body)?;
    let target = caps[2].parse().ok()?;
    Some(Choice::new(caps[1].trim(), target))
}
