//! Planning domain types and validation.

use crate::{Literal, identifiers_match, json, pddl};
use derive_getters::Getters;
use questmaster_error::{ModelError, ModelErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Root of every type hierarchy.
pub(crate) const OBJECT_TYPE: &str = "object";

/// Built-in equality predicate, admitted without declaration.
pub(crate) const EQUALITY: &str = "=";

/// A declared type with an optional parent.
///
/// A missing parent means the type derives directly from `object`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Getters)]
pub struct TypeDecl {
    /// Type name
    name: String,
    /// Parent type, if not `object`
    parent: Option<String>,
}

impl TypeDecl {
    /// Creates a type declaration, folding an explicit `object` parent to `None`.
    pub fn new(name: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            parent: parent
                .map(|p| p.to_lowercase())
                .filter(|p| p != OBJECT_TYPE),
        }
    }
}

/// A typed name, used for constants and problem objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Getters)]
pub struct TypedName {
    /// Object name
    name: String,
    /// Object type
    type_name: String,
}

impl TypedName {
    /// Creates a typed name.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            type_name: type_name.into().to_lowercase(),
        }
    }
}

/// A typed parameter variable.
///
/// The name is stored without its leading `?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Getters)]
pub struct Parameter {
    /// Variable name without `?`
    name: String,
    /// Declared type
    type_name: String,
}

impl Parameter {
    /// Creates a parameter, stripping a leading `?` from `name`.
    pub fn new(name: impl AsRef<str>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.as_ref().trim_start_matches('?').to_lowercase(),
            type_name: type_name.into().to_lowercase(),
        }
    }

    /// The variable as it appears in literals, e.g. `?who`.
    pub fn variable(&self) -> String {
        format!("?{}", self.name)
    }
}

/// A predicate declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Getters)]
pub struct PredicateSignature {
    /// Predicate name
    name: String,
    /// Typed parameters
    params: Vec<Parameter>,
}

impl PredicateSignature {
    /// Creates a predicate signature.
    pub fn new(name: impl Into<String>, params: Vec<Parameter>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            params,
        }
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A parameterised action schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct Action {
    /// Action name, unique within the domain
    name: String,
    /// Parameters in declaration order
    parameters: Vec<Parameter>,
    /// Precondition literals
    preconditions: Vec<Literal>,
    /// Effect literals, positive or negated
    effects: Vec<Literal>,
}

impl Action {
    /// Creates an action schema.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        preconditions: Vec<Literal>,
        effects: Vec<Literal>,
    ) -> Self {
        Self {
            name: name.into().to_lowercase(),
            parameters,
            preconditions,
            effects,
        }
    }
}

/// A PDDL planning domain.
///
/// Construct through [`Domain::from_json`] or [`Domain::from_pddl`]; both
/// validate before returning.
///
/// # Examples
///
/// ```
/// use questmaster_core::Domain;
///
/// let json = r#"{
///     "domain_name": "cave",
///     "requirements": ["strips", "typing"],
///     "types": ["hero", "location"],
///     "predicates": ["(at ?h - hero ?l - location)"],
///     "actions": [{
///         "name": "move",
///         "parameters": ["?h - hero", "?from - location", "?to - location"],
///         "preconditions": ["(at ?h ?from)"],
///         "effects": ["(at ?h ?to)", "(not (at ?h ?from))"]
///     }]
/// }"#;
///
/// let domain = Domain::from_json(json).unwrap();
/// assert_eq!(domain.name(), "cave");
/// assert!(domain.action("MOVE").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Domain {
    /// Domain name
    name: String,
    /// Requirement flags without the leading `:`
    requirements: Vec<String>,
    /// Declared types
    types: Vec<TypeDecl>,
    /// Domain constants
    constants: Vec<TypedName>,
    /// Predicate declarations
    predicates: Vec<PredicateSignature>,
    /// Action schemas
    actions: Vec<Action>,
}

impl Domain {
    /// Assembles and validates a domain.
    pub fn new(
        name: impl Into<String>,
        requirements: Vec<String>,
        types: Vec<TypeDecl>,
        constants: Vec<TypedName>,
        predicates: Vec<PredicateSignature>,
        actions: Vec<Action>,
    ) -> Result<Self, ModelError> {
        let domain = Self {
            name: name.into().trim().to_lowercase(),
            requirements: requirements
                .into_iter()
                .map(|r| r.trim().trim_start_matches(':').to_lowercase())
                .filter(|r| !r.is_empty())
                .collect(),
            types,
            constants,
            predicates,
            actions,
        };
        domain.validate()?;
        Ok(domain)
    }

    /// Parses and validates a domain from oracle JSON.
    #[tracing::instrument(skip(text), fields(bytes = text.len()))]
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        json::domain_from_json(text)
    }

    /// Parses and validates a domain from PDDL text.
    #[tracing::instrument(skip(text), fields(bytes = text.len()))]
    pub fn from_pddl(text: &str) -> Result<Self, ModelError> {
        pddl::parse_domain(text)
    }

    /// Renders the domain as PDDL.
    pub fn render(&self) -> String {
        pddl::render_domain(self)
    }

    /// Finds an action by name, tolerating `_`/`-` and case differences.
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions
            .iter()
            .find(|a| identifiers_match(&a.name, name))
    }

    /// Arities declared for a predicate name.
    pub fn predicate_arities(&self, name: &str) -> Vec<usize> {
        self.predicates
            .iter()
            .filter(|p| p.name == name)
            .map(PredicateSignature::arity)
            .collect()
    }

    /// Type of a domain constant.
    pub fn constant_type(&self, name: &str) -> Option<&str> {
        self.constants
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.type_name.as_str())
    }

    /// Whether `child` is `ancestor` or derives from it.
    ///
    /// Every type derives from `object`. Unknown types have no parents.
    pub fn is_subtype(&self, child: &str, ancestor: &str) -> bool {
        if ancestor == OBJECT_TYPE || child == ancestor {
            return true;
        }
        let parents: HashMap<&str, &str> = self
            .types
            .iter()
            .filter_map(|t| t.parent.as_deref().map(|p| (t.name.as_str(), p)))
            .collect();

        let mut seen = HashSet::new();
        let mut current = child;
        while let Some(&parent) = parents.get(current) {
            if parent == ancestor {
                return true;
            }
            if !seen.insert(parent) {
                break;
            }
            current = parent;
        }
        false
    }

    /// Checks the structural invariants of the domain.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.is_empty() {
            return Err(ModelError::new(ModelErrorKind::MissingField(
                "domain_name".to_string(),
            )));
        }

        let mut signatures = HashSet::new();
        for predicate in &self.predicates {
            if !signatures.insert((predicate.name.as_str(), predicate.arity())) {
                return Err(ModelError::new(ModelErrorKind::DuplicatePredicate {
                    name: predicate.name.clone(),
                    arity: predicate.arity(),
                }));
            }
        }

        let mut action_names = HashSet::new();
        for (i, action) in self.actions.iter().enumerate() {
            if action.name.is_empty() {
                return Err(ModelError::new(ModelErrorKind::MissingField(format!(
                    "actions[{}].name",
                    i
                ))));
            }
            if !action_names.insert(action.name.as_str()) {
                return Err(ModelError::new(ModelErrorKind::DuplicateAction(
                    action.name.clone(),
                )));
            }

            let bound: HashSet<String> = action.parameters.iter().map(Parameter::variable).collect();
            let sections = [
                ("preconditions", &action.preconditions),
                ("effects", &action.effects),
            ];
            for (section, literals) in sections {
                for (j, literal) in literals.iter().enumerate() {
                    let field = format!("actions[{}].{}[{}]", i, section, j);
                    self.check_literal(literal, &field)?;
                    if let Some(variable) = literal.variables().find(|v| !bound.contains(*v)) {
                        return Err(ModelError::new(ModelErrorKind::UnboundVariable {
                            field,
                            variable: variable.to_string(),
                        }));
                    }
                }
            }
        }

        Ok(())
    }

    /// Checks that a literal names a declared predicate with a declared arity.
    pub(crate) fn check_literal(&self, literal: &Literal, field: &str) -> Result<(), ModelError> {
        if literal.predicate() == EQUALITY {
            return if literal.arity() == 2 {
                Ok(())
            } else {
                Err(ModelError::new(ModelErrorKind::PredicateArity {
                    field: field.to_string(),
                    predicate: EQUALITY.to_string(),
                    found: literal.arity(),
                    declared: vec![2],
                }))
            };
        }

        let declared = self.predicate_arities(literal.predicate());
        if declared.is_empty() {
            return Err(ModelError::new(ModelErrorKind::UndeclaredPredicate {
                field: field.to_string(),
                predicate: literal.predicate().clone(),
            }));
        }
        if !declared.contains(&literal.arity()) {
            return Err(ModelError::new(ModelErrorKind::PredicateArity {
                field: field.to_string(),
                predicate: literal.predicate().clone(),
                found: literal.arity(),
                declared,
            }));
        }
        Ok(())
    }
}

/// Splits a PDDL typed list (`a b - t c`) into `(name, type)` pairs.
///
/// Names without a type annotation get `object`.
pub(crate) fn typed_list(atoms: &[String], field: &str) -> Result<Vec<(String, String)>, ModelError> {
    let mut out = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    let mut iter = atoms.iter();

    while let Some(atom) = iter.next() {
        if atom == "-" {
            let type_name = iter.next().ok_or_else(|| {
                ModelError::new(ModelErrorKind::MalformedPddl {
                    field: field.to_string(),
                    message: "'-' without a type".to_string(),
                })
            })?;
            if pending.is_empty() {
                return Err(ModelError::new(ModelErrorKind::MalformedPddl {
                    field: field.to_string(),
                    message: format!("type '{}' annotates nothing", type_name),
                }));
            }
            out.extend(pending.drain(..).map(|name| (name, type_name.clone())));
        } else {
            pending.push(atom.clone());
        }
    }
    out.extend(pending.into_iter().map(|name| (name, OBJECT_TYPE.to_string())));
    Ok(out)
}
