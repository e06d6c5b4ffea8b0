//! PDDL rendering and parsing.
//!
//! Rendering is deterministic: sections appear in a fixed order and every
//! list keeps declaration order. Parsing accepts the STRIPS + typing subset
//! the renderer produces, plus constants and `=`.

use crate::domain::{OBJECT_TYPE, typed_list};
use crate::{
    Action, Domain, Literal, Parameter, PredicateSignature, Problem, SExpr, TypeDecl, TypedName,
};
use questmaster_error::{ModelError, ModelErrorKind};
use std::fmt::Write;

const INDENT: &str = "    ";

/// Renders a domain as PDDL text.
///
/// # Examples
///
/// ```
/// use questmaster_core::{Domain, render_domain};
///
/// let domain = Domain::from_json(r#"{
///     "domain_name": "d",
///     "requirements": ["strips"],
///     "types": [],
///     "predicates": ["(lit)"],
///     "actions": []
/// }"#).unwrap();
/// assert!(render_domain(&domain).starts_with("(define (domain d)"));
/// ```
pub fn render_domain(domain: &Domain) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "(define (domain {})", domain.name());

    if !domain.requirements().is_empty() {
        let flags: Vec<String> = domain
            .requirements()
            .iter()
            .map(|r| format!(":{}", r))
            .collect();
        let _ = writeln!(out, "(:requirements {})", flags.join(" "));
    }

    if !domain.types().is_empty() {
        let _ = writeln!(out, "(:types {})", render_types(domain.types()));
    }

    if !domain.constants().is_empty() {
        out.push_str("(:constants");
        for constant in domain.constants() {
            let _ = write!(out, "\n{}{} - {}", INDENT, constant.name(), constant.type_name());
        }
        out.push_str(")\n");
    }

    out.push_str("(:predicates");
    for predicate in domain.predicates() {
        let _ = write!(out, "\n{}({}", INDENT, predicate.name());
        for param in predicate.params() {
            let _ = write!(out, " ?{} - {}", param.name(), param.type_name());
        }
        out.push(')');
    }
    out.push_str(")\n");

    for action in domain.actions() {
        render_action(&mut out, action);
    }

    out.push_str(")\n");
    out
}

/// Renders a problem as PDDL text.
pub fn render_problem(problem: &Problem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "(define (problem {})", problem.name());
    let _ = writeln!(out, "(:domain {})", problem.domain_name());

    out.push_str("(:objects");
    for object in problem.objects() {
        let _ = write!(out, "\n{}{} - {}", INDENT, object.name(), object.type_name());
    }
    out.push_str(")\n");

    out.push_str("(:init");
    for fact in problem.init() {
        let _ = write!(out, "\n{}{}", INDENT, fact);
    }
    out.push_str(")\n");

    let _ = writeln!(out, "(:goal\n{}{})", INDENT, conjunction(problem.goal()));
    out.push_str(")\n");
    out
}

fn render_action(out: &mut String, action: &Action) {
    let params: Vec<String> = action
        .parameters()
        .iter()
        .map(|p| format!("?{} - {}", p.name(), p.type_name()))
        .collect();

    let _ = writeln!(out, "(:action {}", action.name());
    let _ = writeln!(out, "{}:parameters ({})", INDENT, params.join(" "));
    let _ = writeln!(out, "{}:precondition {}", INDENT, conjunction(action.preconditions()));
    let _ = writeln!(out, "{}:effect {}", INDENT, conjunction(action.effects()));
    out.push_str(")\n");
}

fn conjunction(literals: &[Literal]) -> String {
    let mut out = String::from("(and");
    for literal in literals {
        let _ = write!(out, " {}", literal);
    }
    out.push(')');
    out
}

/// Bare names are only safe after the last annotated group, otherwise the
/// reader would attach the next annotation to them.
fn render_types(types: &[TypeDecl]) -> String {
    let last_typed = types.iter().rposition(|t| t.parent().is_some());
    types
        .iter()
        .enumerate()
        .map(|(i, t)| match (t.parent(), last_typed) {
            (Some(parent), _) => format!("{} - {}", t.name(), parent),
            (None, Some(last)) if i < last => format!("{} - {}", t.name(), OBJECT_TYPE),
            (None, _) => t.name().clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a domain from PDDL text.
pub(crate) fn parse_domain(text: &str) -> Result<Domain, ModelError> {
    let body = define_body(text, "domain")?;
    let name = define_name(&body, "domain")?;

    let mut requirements = Vec::new();
    let mut types = Vec::new();
    let mut constants = Vec::new();
    let mut predicates = Vec::new();
    let mut actions = Vec::new();

    for section in &body[2..] {
        let head = section.head().unwrap_or_default();
        let rest = section
            .as_list()
            .and_then(|items| items.get(1..))
            .unwrap_or_default();
        match head {
            ":requirements" => {
                requirements = atoms(rest, ":requirements")?;
            }
            ":types" => {
                types = typed_list(&atoms(rest, ":types")?, ":types")?
                    .into_iter()
                    .map(|(name, parent)| TypeDecl::new(name, Some(parent)))
                    .collect();
            }
            ":constants" => {
                constants = typed_list(&atoms(rest, ":constants")?, ":constants")?
                    .into_iter()
                    .map(|(name, type_name)| TypedName::new(name, type_name))
                    .collect();
            }
            ":predicates" => {
                for (i, item) in rest.iter().enumerate() {
                    predicates.push(parse_predicate(item, &format!("predicates[{}]", i))?);
                }
            }
            ":action" => {
                let field = format!("actions[{}]", actions.len());
                actions.push(parse_action(rest, &field)?);
            }
            other => {
                return Err(ModelError::new(ModelErrorKind::UnsupportedExpression {
                    field: "domain".to_string(),
                    expression: other.to_string(),
                }));
            }
        }
    }

    Domain::new(name, requirements, types, constants, predicates, actions)
}

/// Parses a problem from PDDL text and validates it against `domain`.
pub(crate) fn parse_problem(text: &str, domain: &Domain) -> Result<Problem, ModelError> {
    let body = define_body(text, "problem")?;
    let name = define_name(&body, "problem")?;

    let mut domain_name = String::new();
    let mut objects = Vec::new();
    let mut init = Vec::new();
    let mut goal = Vec::new();

    for section in &body[2..] {
        let head = section.head().unwrap_or_default();
        let rest = section
            .as_list()
            .and_then(|items| items.get(1..))
            .unwrap_or_default();
        match head {
            ":domain" => {
                domain_name = atoms(rest, ":domain")?.into_iter().next().unwrap_or_default();
            }
            ":requirements" => {}
            ":objects" => {
                objects = typed_list(&atoms(rest, ":objects")?, ":objects")?
                    .into_iter()
                    .map(|(name, type_name)| TypedName::new(name, type_name))
                    .collect();
            }
            ":init" => {
                for (j, item) in rest.iter().enumerate() {
                    init.push(Literal::from_sexpr(item, &format!("init[{}]", j))?);
                }
            }
            ":goal" => {
                for item in rest {
                    goal.extend(flatten_literals(item, "goal")?);
                }
            }
            other => {
                return Err(ModelError::new(ModelErrorKind::UnsupportedExpression {
                    field: "problem".to_string(),
                    expression: other.to_string(),
                }));
            }
        }
    }

    Problem::new(name, domain_name, objects, init, goal, domain)
}

/// Flattens a condition into literals, unwrapping nested `and`.
///
/// `()` and `(and)` yield no literals.
pub(crate) fn flatten_literals(expr: &SExpr, field: &str) -> Result<Vec<Literal>, ModelError> {
    match expr.as_list() {
        Some([]) => Ok(Vec::new()),
        Some(items) if expr.head() == Some("and") => {
            let mut out = Vec::new();
            for item in &items[1..] {
                out.extend(flatten_literals(item, field)?);
            }
            Ok(out)
        }
        _ => Ok(vec![Literal::from_sexpr(expr, field)?]),
    }
}

/// Parses a predicate declaration such as `(at ?h - hero ?l - location)`.
pub(crate) fn parse_predicate(expr: &SExpr, field: &str) -> Result<PredicateSignature, ModelError> {
    let malformed = |message: &str| {
        ModelError::new(ModelErrorKind::MalformedPddl {
            field: field.to_string(),
            message: message.to_string(),
        })
    };
    let items = expr.as_list().ok_or_else(|| malformed("expected a list"))?;
    let name = items
        .first()
        .and_then(SExpr::as_atom)
        .ok_or_else(|| malformed("missing predicate name"))?;
    let params = typed_list(&atoms(&items[1..], field)?, field)?
        .into_iter()
        .map(|(var, type_name)| Parameter::new(var, type_name))
        .collect();
    Ok(PredicateSignature::new(name, params))
}

fn parse_action(rest: &[SExpr], field: &str) -> Result<Action, ModelError> {
    let malformed = |message: String| {
        ModelError::new(ModelErrorKind::MalformedPddl {
            field: field.to_string(),
            message,
        })
    };

    let name = rest
        .first()
        .and_then(SExpr::as_atom)
        .ok_or_else(|| malformed("missing action name".to_string()))?;

    let mut parameters = Vec::new();
    let mut preconditions = Vec::new();
    let mut effects = Vec::new();

    let mut iter = rest[1..].iter();
    while let Some(key) = iter.next() {
        let key = key
            .as_atom()
            .ok_or_else(|| malformed(format!("expected a keyword, found {}", key)))?;
        let value = iter
            .next()
            .ok_or_else(|| malformed(format!("{} has no value", key)))?;
        match key {
            ":parameters" => {
                let list = value
                    .as_list()
                    .ok_or_else(|| malformed(":parameters must be a list".to_string()))?;
                parameters = typed_list(&atoms(list, field)?, field)?
                    .into_iter()
                    .map(|(var, type_name)| Parameter::new(var, type_name))
                    .collect();
            }
            ":precondition" => {
                preconditions = flatten_literals(value, &format!("{}.preconditions", field))?;
            }
            ":effect" => {
                effects = flatten_literals(value, &format!("{}.effects", field))?;
            }
            other => {
                return Err(ModelError::new(ModelErrorKind::UnsupportedExpression {
                    field: field.to_string(),
                    expression: other.to_string(),
                }));
            }
        }
    }

    Ok(Action::new(name, parameters, preconditions, effects))
}

fn define_body(text: &str, kind: &str) -> Result<Vec<SExpr>, ModelError> {
    let malformed = |message: String| {
        ModelError::new(ModelErrorKind::MalformedPddl {
            field: kind.to_string(),
            message,
        })
    };
    let expr = SExpr::parse_one(text).map_err(malformed)?;
    match expr {
        SExpr::List(items) if items.first().and_then(SExpr::as_atom) == Some("define") => {
            if items.len() < 2 {
                return Err(malformed(format!("missing ({} <name>)", kind)));
            }
            Ok(items)
        }
        _ => Err(malformed("expected (define ...)".to_string())),
    }
}

fn define_name(body: &[SExpr], kind: &str) -> Result<String, ModelError> {
    body.get(1)
        .and_then(SExpr::as_list)
        .and_then(|items| match items {
            [SExpr::Atom(k), SExpr::Atom(name)] if k == kind => Some(name.clone()),
            _ => None,
        })
        .ok_or_else(|| {
            ModelError::new(ModelErrorKind::MalformedPddl {
                field: kind.to_string(),
                message: format!("expected ({} <name>)", kind),
            })
        })
}

fn atoms(items: &[SExpr], field: &str) -> Result<Vec<String>, ModelError> {
    items
        .iter()
        .map(|item| {
            item.as_atom().map(str::to_string).ok_or_else(|| {
                ModelError::new(ModelErrorKind::MalformedPddl {
                    field: field.to_string(),
                    message: format!("expected a name, found {}", item),
                })
            })
        })
        .collect()
}
