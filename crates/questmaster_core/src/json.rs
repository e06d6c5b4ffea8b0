//! Oracle JSON wire format for domains and problems.

use crate::domain::typed_list;
use crate::pddl::{flatten_literals, parse_predicate};
use crate::{Action, Domain, Literal, Parameter, Problem, SExpr, TypeDecl, TypedName};
use questmaster_error::{ModelError, ModelErrorKind};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
struct DomainDocument {
    domain_name: String,
    #[serde(default)]
    requirements: Vec<String>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    constants: Vec<String>,
    predicates: Vec<String>,
    #[serde(default)]
    actions: Vec<ActionDocument>,
}

#[derive(Debug, Deserialize)]
struct ActionDocument {
    name: String,
    #[serde(default)]
    parameters: Vec<String>,
    #[serde(default)]
    preconditions: Vec<String>,
    #[serde(default)]
    effects: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProblemDocument {
    problem_name: String,
    #[serde(default)]
    domain_name: String,
    objects: ObjectEntries,
    #[serde(default)]
    init: Vec<String>,
    goal: Vec<String>,
}

/// Object map kept as ordered pairs so duplicate keys survive to validation.
#[derive(Debug, Default)]
struct ObjectEntries(Vec<(String, String)>);

impl<'de> Deserialize<'de> for ObjectEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ObjectEntries;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map from object name to type")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((name, type_name)) = map.next_entry::<String, String>()? {
                    entries.push((name, type_name));
                }
                Ok(ObjectEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

pub(crate) fn domain_from_json(text: &str) -> Result<Domain, ModelError> {
    let doc: DomainDocument = serde_json::from_str(text).map_err(map_serde_error)?;

    let types = typed_items(&doc.types, "types")?
        .into_iter()
        .map(|(name, parent)| TypeDecl::new(name, Some(parent)))
        .collect();

    let constants = typed_items(&doc.constants, "constants")?
        .into_iter()
        .map(|(name, type_name)| TypedName::new(name, type_name))
        .collect();

    let mut predicates = Vec::with_capacity(doc.predicates.len());
    for (i, text) in doc.predicates.iter().enumerate() {
        let field = format!("predicates[{}]", i);
        let expr = parse_expr(text, &field)?;
        predicates.push(parse_predicate(&expr, &field)?);
    }

    let mut actions = Vec::with_capacity(doc.actions.len());
    for (i, action) in doc.actions.iter().enumerate() {
        let field = format!("actions[{}]", i);
        let parameters = typed_items(&action.parameters, &format!("{}.parameters", field))?
            .into_iter()
            .map(|(var, type_name)| Parameter::new(var, type_name))
            .collect();
        let preconditions = literals(&action.preconditions, &format!("{}.preconditions", field))?;
        let effects = literals(&action.effects, &format!("{}.effects", field))?;
        actions.push(Action::new(action.name.trim(), parameters, preconditions, effects));
    }

    Domain::new(
        doc.domain_name,
        doc.requirements,
        types,
        constants,
        predicates,
        actions,
    )
}

pub(crate) fn problem_from_json(text: &str, domain: &Domain) -> Result<Problem, ModelError> {
    let doc: ProblemDocument = serde_json::from_str(text).map_err(map_serde_error)?;

    let objects = doc
        .objects
        .0
        .into_iter()
        .map(|(name, type_name)| TypedName::new(name.trim(), type_name.trim()))
        .collect();

    let mut init = Vec::with_capacity(doc.init.len());
    for (j, text) in doc.init.iter().enumerate() {
        init.push(Literal::parse(text, &format!("init[{}]", j))?);
    }
    let goal = literals(&doc.goal, "goal")?;

    Problem::new(
        doc.problem_name.trim(),
        doc.domain_name.trim(),
        objects,
        init,
        goal,
        domain,
    )
}

/// Parses a list of literal strings, each possibly an `(and ...)` group.
fn literals(items: &[String], field: &str) -> Result<Vec<Literal>, ModelError> {
    let mut out = Vec::with_capacity(items.len());
    for (j, text) in items.iter().enumerate() {
        let field = format!("{}[{}]", field, j);
        let expr = parse_expr(text, &field)?;
        out.extend(flatten_literals(&expr, &field)?);
    }
    Ok(out)
}

fn parse_expr(text: &str, field: &str) -> Result<SExpr, ModelError> {
    let trimmed = text.trim();
    let source = if trimmed.starts_with('(') {
        trimmed.to_string()
    } else {
        format!("({})", trimmed)
    };
    SExpr::parse_one(&source).map_err(|_| {
        ModelError::new(ModelErrorKind::InvalidLiteral {
            field: field.to_string(),
            literal: text.to_string(),
        })
    })
}

/// Reads typed-list fragments such as `["?a - t", "?b - u"]`.
///
/// Each entry is its own typed list, so an untyped entry never picks up the
/// annotation of the entry after it.
fn typed_items(items: &[String], field: &str) -> Result<Vec<(String, String)>, ModelError> {
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let atoms: Vec<String> = item.split_whitespace().map(str::to_lowercase).collect();
        out.extend(typed_list(&atoms, &format!("{}[{}]", field, i))?);
    }
    Ok(out)
}

fn map_serde_error(err: serde_json::Error) -> ModelError {
    let message = err.to_string();
    let missing = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next());
    match missing {
        Some(field) => ModelError::new(ModelErrorKind::MissingField(field.to_string())),
        None => ModelError::new(ModelErrorKind::MalformedJson(message)),
    }
}
