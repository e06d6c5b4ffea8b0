//! Plan traces produced by the planner.

use crate::SExpr;
use derive_getters::Getters;
use questmaster_error::{SimulationError, SimulationErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One grounded action invocation, e.g. `(move hero cave forest)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct PlanStep {
    /// Action name as reported by the planner
    action: String,
    /// Grounded arguments in order
    args: Vec<String>,
}

impl PlanStep {
    /// Creates a plan step.
    pub fn new(action: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            action: action.into().to_lowercase(),
            args: args.into_iter().map(|a| a.to_lowercase()).collect(),
        }
    }

    /// Parses a single plan line.
    pub fn parse(line: &str) -> Result<Self, SimulationError> {
        let invalid = || SimulationError::new(SimulationErrorKind::InvalidStep(line.to_string()));
        let expr = SExpr::parse_one(line.trim()).map_err(|_| invalid())?;
        let items = expr.as_list().ok_or_else(invalid)?;
        let atoms = items
            .iter()
            .map(|item| item.as_atom().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;
        let (action, args) = atoms.split_first().ok_or_else(invalid)?;
        Ok(Self {
            action: action.clone(),
            args: args.to_vec(),
        })
    }
}

impl std::fmt::Display for PlanStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.action)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(f, ")")
    }
}

/// An ordered plan, consumed front to back.
///
/// # Examples
///
/// ```
/// use questmaster_core::PlanTrace;
///
/// let mut plan = PlanTrace::parse("(move hero cave forest)\n(take hero sword forest)\n; cost = 2 (unit cost)\n").unwrap();
/// assert_eq!(plan.len(), 2);
/// assert_eq!(plan.cost(), Some(2));
/// assert_eq!(plan.next_step().unwrap().action(), "move");
/// assert_eq!(plan.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTrace {
    steps: VecDeque<PlanStep>,
    cost: Option<u32>,
}

impl PlanTrace {
    /// Builds a trace from steps.
    pub fn new(steps: impl IntoIterator<Item = PlanStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            cost: None,
        }
    }

    /// Parses the planner's plan file.
    ///
    /// Blank lines and `;` comments are skipped; a `; cost = N` comment sets
    /// the cost.
    pub fn parse(text: &str) -> Result<Self, SimulationError> {
        let mut trace = Self::default();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(comment) = line.strip_prefix(';') {
                if let Some(value) = comment.trim().strip_prefix("cost =") {
                    trace.cost = value
                        .split_whitespace()
                        .next()
                        .and_then(|n| n.parse().ok());
                }
                continue;
            }
            trace.steps.push_back(PlanStep::parse(line)?);
        }
        Ok(trace)
    }

    /// Removes and returns the next step.
    pub fn next_step(&mut self) -> Option<PlanStep> {
        self.steps.pop_front()
    }

    /// The next step without consuming it.
    pub fn peek(&self) -> Option<&PlanStep> {
        self.steps.front()
    }

    /// Remaining steps.
    pub fn steps(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps.iter()
    }

    /// Cost reported by the planner, if any.
    pub fn cost(&self) -> Option<u32> {
        self.cost
    }

    /// Number of remaining steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no steps remain.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Renders the remaining steps in plan-file format.
    pub fn render(&self) -> String {
        let mut out: String = self.steps.iter().map(|s| format!("{}\n", s)).collect();
        if let Some(cost) = self.cost {
            out.push_str(&format!("; cost = {} (unit cost)\n", cost));
        }
        out
    }
}
