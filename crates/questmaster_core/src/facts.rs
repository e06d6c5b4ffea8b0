//! Ground fact sets.

use crate::Literal;
use questmaster_error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of ground facts in canonical text form.
///
/// Facts are stored as `(pred a b)` with lower-case names and single spaces,
/// so iteration order is deterministic and membership is textual.
///
/// # Examples
///
/// ```
/// use questmaster_core::{FactSet, Literal};
///
/// let mut facts = FactSet::new();
/// facts.insert_raw("(At Hero  Cave)").unwrap();
/// assert!(facts.contains_raw("(at hero cave)").unwrap());
/// assert_eq!(facts.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactSet(BTreeSet<String>);

/// Difference between two fact sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactDelta {
    /// Facts present only in the newer set
    pub added: Vec<String>,
    /// Facts present only in the older set
    pub removed: Vec<String>,
}

impl FactDelta {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl FactSet {
    /// Creates an empty fact set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fact set from literals, ignoring negation.
    pub fn from_literals<'a>(literals: impl IntoIterator<Item = &'a Literal>) -> Self {
        let mut set = Self::new();
        for literal in literals {
            set.insert(literal);
        }
        set
    }

    fn canonical(literal: &Literal) -> String {
        literal.positive().to_string()
    }

    /// Adds a fact. Returns `true` if it was not already present.
    pub fn insert(&mut self, literal: &Literal) -> bool {
        self.0.insert(Self::canonical(literal))
    }

    /// Removes a fact. Returns `true` if it was present.
    pub fn remove(&mut self, literal: &Literal) -> bool {
        self.0.remove(&Self::canonical(literal))
    }

    /// Whether the fact is in the set.
    pub fn contains(&self, literal: &Literal) -> bool {
        self.0.contains(&Self::canonical(literal))
    }

    /// Parses and adds a fact given as text.
    pub fn insert_raw(&mut self, text: &str) -> Result<bool, ModelError> {
        let literal = Literal::parse(text, "fact")?;
        Ok(self.insert(&literal))
    }

    /// Parses a fact given as text and checks membership.
    pub fn contains_raw(&self, text: &str) -> Result<bool, ModelError> {
        let literal = Literal::parse(text, "fact")?;
        Ok(self.contains(&literal))
    }

    /// Number of facts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates facts in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Facts added and removed going from `self` to `newer`.
    pub fn diff(&self, newer: &FactSet) -> FactDelta {
        FactDelta {
            added: newer.0.difference(&self.0).cloned().collect(),
            removed: self.0.difference(&newer.0).cloned().collect(),
        }
    }
}

impl std::fmt::Display for FactSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, fact) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", fact)?;
        }
        Ok(())
    }
}
