//! Test utilities for planning tests.
//!
//! Scripted collaborators and a small cave-and-sword model.

#![allow(dead_code)]

use async_trait::async_trait;
use questmaster_core::{Domain, Problem};
use questmaster_error::{OracleError, OracleErrorKind, QuestResult};
use questmaster_interface::{
    ApprovalGate, NarrativeProposal, Oracle, OracleRequest, Planner, PlannerOutcome,
};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const DOMAIN_JSON: &str = r#"{
    "domain_name": "cave",
    "requirements": ["strips", "typing"],
    "types": ["hero", "location", "item"],
    "predicates": [
        "(at ?h - hero ?l - location)",
        "(connected ?from - location ?to - location)",
        "(item-at ?i - item ?l - location)",
        "(has ?h - hero ?i - item)",
        "(lit ?l - location)"
    ],
    "actions": [
        {
            "name": "move",
            "parameters": ["?h - hero", "?from - location", "?to - location"],
            "preconditions": ["(at ?h ?from)", "(connected ?from ?to)"],
            "effects": ["(at ?h ?to)", "(not (at ?h ?from))"]
        },
        {
            "name": "take",
            "parameters": ["?h - hero", "?i - item", "?l - location"],
            "preconditions": ["(at ?h ?l)", "(item-at ?i ?l)"],
            "effects": ["(has ?h ?i)", "(not (item-at ?i ?l))"]
        },
        {
            "name": "rest",
            "parameters": ["?h - hero", "?l - location"],
            "preconditions": ["(at ?h ?l)"],
            "effects": ["(not (lit ?l))", "(lit ?l)"]
        }
    ]
}"#;

pub const PROBLEM_JSON: &str = r#"{
    "problem_name": "find-the-sword",
    "domain_name": "cave",
    "objects": {"arin": "hero", "cave": "location", "forest": "location", "sword": "item"},
    "init": ["(at arin cave)", "(connected cave forest)", "(item-at sword forest)"],
    "goal": ["(has arin sword)"]
}"#;

pub const STORY: &str = "1 Arin wakes in a cave.\n\
→ Walk to the forest [go to 2]\n\
2 A sword glints between the roots.\n\
→ Take the sword [go to 3]\n\
3 Arin holds the sword ✅\n";

pub const PLAN: &str = "(move arin cave forest)\n(take arin sword forest)\n; cost = 2 (unit cost)\n";

pub fn domain() -> Domain {
    Domain::from_json(DOMAIN_JSON).unwrap()
}

pub fn problem() -> Problem {
    Problem::from_json(PROBLEM_JSON, &domain()).unwrap()
}

/// Domain PDDL as an oracle would return it from a repair prompt.
pub fn repaired_domain_reply() -> String {
    format!("Here is the fixed domain:\n```pddl\n{}```\n", domain().render())
}

/// Problem PDDL as an oracle would return it from a repair prompt.
pub fn repaired_problem_reply() -> String {
    format!("```\n{}```", problem().render())
}

/// Oracle that answers from a script, in order.
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<OracleRequest>>,
}

impl ScriptedOracle {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn generate(&self, req: &OracleRequest) -> QuestResult<String> {
        self.requests.lock().unwrap().push(req.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        reply.ok_or_else(|| {
            OracleError::new(OracleErrorKind::EmptyResponse("script exhausted".to_string())).into()
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Planner that returns scripted outcomes and records the files it saw.
pub struct ScriptedPlanner {
    outcomes: Mutex<VecDeque<PlannerOutcome>>,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl ScriptedPlanner {
    pub fn new(outcomes: impl IntoIterator<Item = PlannerOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A planner the test expects never to be called.
    pub fn unused() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn solve(&self, domain: &Path, problem: &Path) -> QuestResult<PlannerOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push((domain.to_path_buf(), problem.to_path_buf()));
        let outcome = self.outcomes.lock().unwrap().pop_front();
        Ok(outcome.unwrap_or_else(|| PlannerOutcome::failed("script exhausted", Some(99))))
    }

    fn name(&self) -> &str {
        "scripted-planner"
    }
}

/// Approval gate with a fixed answer.
pub struct FixedApproval {
    answer: bool,
    seen: Mutex<Vec<NarrativeProposal>>,
}

impl FixedApproval {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<NarrativeProposal> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApprovalGate for FixedApproval {
    async fn approve(&self, proposal: &NarrativeProposal) -> QuestResult<bool> {
        self.seen.lock().unwrap().push(proposal.clone());
        Ok(self.answer)
    }
}

pub fn solved() -> PlannerOutcome {
    PlannerOutcome::solved(PLAN, "Solution found.")
}

pub fn unsolvable() -> PlannerOutcome {
    PlannerOutcome::failed(
        "STDOUT:\nCompletely explored state space -- no solution!\nSearch stopped without finding a solution.\nSTDERR:\n",
        Some(12),
    )
}

pub fn undefined_predicate() -> PlannerOutcome {
    PlannerOutcome::failed(
        "STDOUT:\nUndefined predicate: (hass arin sword)\nSTDERR:\n",
        Some(31),
    )
}

pub fn parse_failure() -> PlannerOutcome {
    PlannerOutcome::failed("STDOUT:\nCould not parse domain file\nSTDERR:\n", Some(31))
}
