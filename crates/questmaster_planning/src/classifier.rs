//! Planner failure classification.
//!
//! Failures are matched against an ordered list of rules; the first rule
//! that matches wins and anything unmatched is [`FailureClass::Unknown`].
//! The default rules target Fast Downward's exit codes and log messages.

use serde::{Deserialize, Serialize};

/// Why a planner run produced no plan.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureClass {
    /// The model is well formed but the goal is unreachable
    NoSolution,
    /// The PDDL could not be parsed
    SyntaxError,
    /// A predicate, type, object or action is referenced but not declared
    UndefinedSymbol,
    /// An argument or object has the wrong type
    TypeError,
    /// The planner itself failed (out of memory, internal error, signal)
    PlannerCrash,
    /// Nothing matched
    Unknown,
}

impl FailureClass {
    /// Whether the failure calls for changing the story rather than the model.
    pub fn needs_narrative_repair(&self) -> bool {
        matches!(self, FailureClass::NoSolution)
    }
}

/// One classification rule.
///
/// A rule matches when the exit code is one of `exit_codes` or the log
/// contains one of `patterns` (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierRule {
    class: FailureClass,
    exit_codes: Vec<i32>,
    patterns: Vec<String>,
}

impl ClassifierRule {
    /// A rule with no triggers.
    pub fn new(class: FailureClass) -> Self {
        Self {
            class,
            exit_codes: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Adds exit codes that trigger the rule.
    pub fn exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.exit_codes.extend(codes);
        self
    }

    /// Adds log substrings that trigger the rule.
    pub fn patterns<S: AsRef<str>>(mut self, patterns: impl IntoIterator<Item = S>) -> Self {
        self.patterns
            .extend(patterns.into_iter().map(|p| p.as_ref().to_lowercase()));
        self
    }

    /// Class assigned when the rule matches.
    pub fn class(&self) -> FailureClass {
        self.class
    }

    fn matches(&self, log: &str, exit_code: Option<i32>) -> bool {
        exit_code.is_some_and(|code| self.exit_codes.contains(&code))
            || self.patterns.iter().any(|p| log.contains(p.as_str()))
    }
}

/// Maps planner output to a [`FailureClass`].
///
/// # Examples
///
/// ```
/// use questmaster_planning::{FailureClass, FailureClassifier};
///
/// let classifier = FailureClassifier::default();
/// let log = "Completely explored state space -- no solution!";
/// assert_eq!(classifier.classify(log, Some(12)), FailureClass::NoSolution);
/// assert_eq!(classifier.classify("", None), FailureClass::Unknown);
/// ```
#[derive(Debug, Clone)]
pub struct FailureClassifier {
    rules: Vec<ClassifierRule>,
}

impl FailureClassifier {
    /// A classifier with no rules; everything is [`FailureClass::Unknown`].
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule that is consulted before all existing rules.
    pub fn with_rule(mut self, rule: ClassifierRule) -> Self {
        self.rules.insert(0, rule);
        self
    }

    /// Adds a rule that is consulted after all existing rules.
    pub fn push_rule(&mut self, rule: ClassifierRule) {
        self.rules.push(rule);
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[ClassifierRule] {
        &self.rules
    }

    /// Classifies a failed run from its log and exit code.
    #[tracing::instrument(skip(self, log), fields(log_bytes = log.len()))]
    pub fn classify(&self, log: &str, exit_code: Option<i32>) -> FailureClass {
        let log = log.to_lowercase();
        let class = self
            .rules
            .iter()
            .find(|rule| rule.matches(&log, exit_code))
            .map(ClassifierRule::class)
            .unwrap_or(FailureClass::Unknown);
        tracing::debug!(class = %class, "Classified planner failure");
        class
    }
}

impl Default for FailureClassifier {
    /// Rules for Fast Downward.
    ///
    /// Exit codes 10-12 report an unsolvable or exhausted search, 20-24
    /// resource limits, 30/32/35 critical errors and 31/33/36 input errors.
    fn default() -> Self {
        let rules = vec![
            ClassifierRule::new(FailureClass::NoSolution)
                .exit_codes([10, 11, 12])
                .patterns([
                    "search stopped without finding a solution",
                    "completely explored state space",
                    "goal can be simplified to false",
                    "task is provably unsolvable",
                    "no solution",
                ]),
            ClassifierRule::new(FailureClass::UndefinedSymbol).patterns([
                "undefined",
                "undeclared",
                "not defined",
                "unknown predicate",
                "unknown type",
                "unknown constant",
                "unknown object",
                "keyerror",
            ]),
            ClassifierRule::new(FailureClass::TypeError).patterns([
                "type mismatch",
                "wrong type",
                "typing error",
                "is not of type",
                "typeerror",
            ]),
            ClassifierRule::new(FailureClass::SyntaxError)
                .exit_codes([31, 33, 36])
                .patterns([
                    "syntax error",
                    "parse error",
                    "could not parse",
                    "parseerror",
                    "unbalanced parentheses",
                    "expected",
                ]),
            ClassifierRule::new(FailureClass::PlannerCrash)
                .exit_codes([20, 21, 22, 23, 24, 30, 32, 34, 35, 37])
                .patterns([
                    "traceback",
                    "segmentation fault",
                    "out of memory",
                    "memoryerror",
                    "critical error",
                    "killed",
                ]),
        ];
        Self { rules }
    }
}
