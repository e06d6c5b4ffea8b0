//! Planning problem instances.

use crate::{Domain, FactSet, Literal, TypedName, json, pddl};
use derive_getters::Getters;
use questmaster_error::{ModelError, ModelErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A concrete planning problem for a domain.
///
/// Objects keep declaration order. Every fact in `init` and `goal` is ground
/// and refers only to declared objects or domain constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Problem {
    /// Problem name
    name: String,
    /// Name of the domain this problem references
    domain_name: String,
    /// Objects and their types
    objects: Vec<TypedName>,
    /// Initial facts
    init: Vec<Literal>,
    /// Goal literals
    goal: Vec<Literal>,
}

impl Problem {
    /// Assembles a problem and validates it against `domain`.
    ///
    /// An empty `domain_name` takes the name of `domain`.
    pub fn new(
        name: impl Into<String>,
        domain_name: impl Into<String>,
        objects: Vec<TypedName>,
        init: Vec<Literal>,
        goal: Vec<Literal>,
        domain: &Domain,
    ) -> Result<Self, ModelError> {
        let mut domain_name = domain_name.into().to_lowercase();
        if domain_name.is_empty() {
            tracing::debug!(domain = %domain.name(), "Problem names no domain, using the given one");
            domain_name = domain.name().clone();
        }
        let problem = Self {
            name: name.into().to_lowercase(),
            domain_name,
            objects,
            init,
            goal,
        };
        problem.validate_against(domain)?;
        Ok(problem)
    }

    /// Parses oracle JSON and validates it against `domain`.
    #[tracing::instrument(skip(text, domain), fields(bytes = text.len(), domain = %domain.name()))]
    pub fn from_json(text: &str, domain: &Domain) -> Result<Self, ModelError> {
        json::problem_from_json(text, domain)
    }

    /// Parses PDDL text and validates it against `domain`.
    #[tracing::instrument(skip(text, domain), fields(bytes = text.len(), domain = %domain.name()))]
    pub fn from_pddl(text: &str, domain: &Domain) -> Result<Self, ModelError> {
        pddl::parse_problem(text, domain)
    }

    /// Renders the problem as PDDL.
    pub fn render(&self) -> String {
        pddl::render_problem(self)
    }

    /// Type of a declared object.
    pub fn object_type(&self, name: &str) -> Option<&str> {
        self.objects
            .iter()
            .find(|o| o.name() == name)
            .map(|o| o.type_name().as_str())
    }

    /// The initial state as a fact set.
    pub fn initial_facts(&self) -> FactSet {
        FactSet::from_literals(&self.init)
    }

    /// Returns a copy whose initial state is `facts`.
    ///
    /// Used to hand the planner the current state of a running story.
    pub fn with_init(&self, facts: &FactSet) -> Result<Self, ModelError> {
        let init = facts
            .iter()
            .enumerate()
            .map(|(j, fact)| Literal::parse(fact, &format!("init[{}]", j)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            init,
            ..self.clone()
        })
    }

    /// Checks the problem against the domain it is meant for.
    pub fn validate_against(&self, domain: &Domain) -> Result<(), ModelError> {
        if self.name.is_empty() {
            return Err(ModelError::new(ModelErrorKind::MissingField(
                "problem_name".to_string(),
            )));
        }
        if self.goal.is_empty() {
            return Err(ModelError::new(ModelErrorKind::MissingField(
                "goal".to_string(),
            )));
        }
        if !self.domain_name.is_empty() && &self.domain_name != domain.name() {
            tracing::warn!(
                referenced = %self.domain_name,
                domain = %domain.name(),
                "Problem references a different domain name"
            );
        }

        let mut names = HashSet::new();
        for object in &self.objects {
            if !names.insert(object.name().as_str()) {
                return Err(ModelError::new(ModelErrorKind::DuplicateObject(
                    object.name().clone(),
                )));
            }
        }

        for (j, fact) in self.init.iter().enumerate() {
            let field = format!("init[{}]", j);
            if fact.negated() {
                return Err(ModelError::new(ModelErrorKind::UnsupportedExpression {
                    field,
                    expression: fact.to_string(),
                }));
            }
            self.check_ground(fact, &field, &names, domain)?;
        }

        for (j, fact) in self.goal.iter().enumerate() {
            self.check_ground(fact, &format!("goal[{}]", j), &names, domain)?;
        }

        Ok(())
    }

    fn check_ground(
        &self,
        fact: &Literal,
        field: &str,
        objects: &HashSet<&str>,
        domain: &Domain,
    ) -> Result<(), ModelError> {
        if let Some(variable) = fact.variables().next() {
            return Err(ModelError::new(ModelErrorKind::NonGroundFact {
                field: field.to_string(),
                variable: variable.to_string(),
            }));
        }
        domain.check_literal(fact, field)?;
        for arg in fact.args() {
            if !objects.contains(arg.as_str()) && domain.constant_type(arg).is_none() {
                return Err(ModelError::new(ModelErrorKind::UndeclaredObject {
                    field: field.to_string(),
                    object: arg.clone(),
                }));
            }
        }
        Ok(())
    }
}
