//! Effect simulation for grounded plan steps.
//!
//! Preconditions are not checked: the planner already proved the plan valid
//! against the same model, and the adventure replays it step by step.

use questmaster_core::{Domain, FactSet, PlanStep, Problem};
use questmaster_error::{SimulationError, SimulationErrorKind};
use std::collections::HashMap;

/// Applies action effects to fact sets.
///
/// When a [`Problem`] is attached, grounded arguments are also type-checked
/// against the action's parameter types. Arguments whose type is unknown
/// (neither a problem object nor a domain constant) are accepted as-is.
///
/// # Examples
///
/// ```
/// use questmaster_core::{Domain, FactSet};
/// use questmaster_planning::EffectSimulator;
///
/// let domain = Domain::from_json(r#"{
///     "domain_name": "cave",
///     "types": ["hero", "location"],
///     "predicates": ["(at ?h - hero ?l - location)"],
///     "actions": [{
///         "name": "move",
///         "parameters": ["?h - hero", "?from - location", "?to - location"],
///         "preconditions": ["(at ?h ?from)"],
///         "effects": ["(at ?h ?to)", "(not (at ?h ?from))"]
///     }]
/// }"#).unwrap();
///
/// let mut facts = FactSet::new();
/// facts.insert_raw("(at hero cave)").unwrap();
///
/// let sim = EffectSimulator::new(&domain);
/// let next = sim.apply("move", &["hero", "cave", "forest"], &facts).unwrap();
/// assert!(next.contains_raw("(at hero forest)").unwrap());
/// assert!(!next.contains_raw("(at hero cave)").unwrap());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EffectSimulator<'a> {
    domain: &'a Domain,
    problem: Option<&'a Problem>,
}

impl<'a> EffectSimulator<'a> {
    /// Simulator over `domain` without argument type checks.
    pub fn new(domain: &'a Domain) -> Self {
        Self {
            domain,
            problem: None,
        }
    }

    /// Enables type checks against the objects of `problem`.
    pub fn with_problem(mut self, problem: &'a Problem) -> Self {
        self.problem = Some(problem);
        self
    }

    /// Applies the effects of `action_name` grounded with `args` to `facts`.
    ///
    /// Negated effects are removed first, then positive effects are added, so
    /// an action that deletes and re-adds the same fact keeps it. Removing a
    /// fact that is not present is not an error. An action the domain does
    /// not declare leaves the facts unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationErrorKind::ArityMismatch`] if the argument count
    /// differs from the declared parameters, and
    /// [`SimulationErrorKind::TypeMismatch`] if a typed argument does not fit
    /// its parameter.
    #[tracing::instrument(skip(self, args, facts), fields(domain = %self.domain.name(), facts = facts.len()))]
    pub fn apply<S: AsRef<str>>(
        &self,
        action_name: &str,
        args: &[S],
        facts: &FactSet,
    ) -> Result<FactSet, SimulationError> {
        let Some(action) = self.domain.action(action_name) else {
            tracing::warn!(action = action_name, "Action not declared in domain, state unchanged");
            return Ok(facts.clone());
        };

        let params = action.parameters();
        if params.len() != args.len() {
            return Err(SimulationError::new(SimulationErrorKind::ArityMismatch {
                action: action.name().clone(),
                expected: params.len(),
                found: args.len(),
            }));
        }

        let mut bindings: HashMap<String, String> = HashMap::with_capacity(params.len());
        for (param, arg) in params.iter().zip(args) {
            let arg = arg.as_ref().trim().to_lowercase();
            self.check_type(action.name(), param.name(), param.type_name(), &arg)?;
            bindings.insert(param.variable(), arg);
        }

        let mut next = facts.clone();
        let grounded: Vec<_> = action
            .effects()
            .iter()
            .map(|effect| effect.substitute(|var| bindings.get(var).map(String::as_str)))
            .collect();

        for effect in grounded.iter().filter(|e| e.negated()) {
            next.remove(effect);
        }
        for effect in grounded.iter().filter(|e| !e.negated()) {
            next.insert(effect);
        }

        tracing::debug!(
            action = %action.name(),
            before = facts.len(),
            after = next.len(),
            "Applied action effects"
        );
        Ok(next)
    }

    /// Applies a parsed plan step.
    pub fn apply_step(&self, step: &PlanStep, facts: &FactSet) -> Result<FactSet, SimulationError> {
        self.apply(step.action(), step.args().as_slice(), facts)
    }

    fn check_type(
        &self,
        action: &str,
        parameter: &str,
        parameter_type: &str,
        argument: &str,
    ) -> Result<(), SimulationError> {
        let argument_type = self
            .problem
            .and_then(|p| p.object_type(argument))
            .or_else(|| self.domain.constant_type(argument));

        match argument_type {
            Some(argument_type) if !self.domain.is_subtype(argument_type, parameter_type) => {
                Err(SimulationError::new(SimulationErrorKind::TypeMismatch {
                    action: action.to_string(),
                    parameter: parameter.to_string(),
                    parameter_type: parameter_type.to_string(),
                    argument: argument.to_string(),
                    argument_type: argument_type.to_string(),
                }))
            }
            _ => Ok(()),
        }
    }
}

/// Applies `action_name` with `args` to `facts` without type checks.
///
/// Shorthand for [`EffectSimulator::new`] followed by
/// [`EffectSimulator::apply`].
pub fn apply<S: AsRef<str>>(
    action_name: &str,
    args: &[S],
    domain: &Domain,
    facts: &FactSet,
) -> Result<FactSet, SimulationError> {
    EffectSimulator::new(domain).apply(action_name, args, facts)
}
