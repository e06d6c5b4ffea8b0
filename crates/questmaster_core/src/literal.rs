//! Predicate literals.

use crate::SExpr;
use derive_getters::Getters;
use questmaster_error::{ModelError, ModelErrorKind};
use serde::{Deserialize, Serialize};

/// Expression heads that are valid PDDL but outside the flat literal subset.
const COMPOUND_HEADS: &[&str] = &[
    "and", "or", "imply", "exists", "forall", "when", "increase", "decrease", "assign",
];

/// A predicate applied to arguments, possibly negated.
///
/// Arguments are either variables (`?x`) or object names.
///
/// # Examples
///
/// ```
/// use questmaster_core::Literal;
///
/// let lit = Literal::parse("(not (at ?w ?from))", "effects[0]").unwrap();
/// assert!(lit.negated());
/// assert_eq!(lit.predicate(), "at");
/// assert_eq!(lit.to_string(), "(not (at ?w ?from))");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Getters)]
pub struct Literal {
    /// Predicate name
    predicate: String,
    /// Arguments in order
    args: Vec<String>,
    /// Whether the literal is wrapped in `not`
    #[getter(skip)]
    negated: bool,
}

impl Literal {
    /// Creates a positive literal.
    pub fn new(predicate: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            predicate: predicate.into().to_lowercase(),
            args: args.into_iter().map(|a| a.to_lowercase()).collect(),
            negated: false,
        }
    }

    /// Whether the literal is negated.
    pub fn negated(&self) -> bool {
        self.negated
    }

    /// Returns the negation of this literal.
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Returns this literal without its negation.
    pub fn positive(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            args: self.args.clone(),
            negated: false,
        }
    }

    /// Number of arguments.
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Whether the literal contains no variables.
    pub fn is_ground(&self) -> bool {
        self.variables().next().is_none()
    }

    /// Iterates over variable arguments (those starting with `?`).
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.args
            .iter()
            .map(String::as_str)
            .filter(|a| a.starts_with('?'))
    }

    /// Replaces arguments through `lookup`, leaving unknown arguments untouched.
    pub fn substitute<'a, F>(&self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        Self {
            predicate: self.predicate.clone(),
            args: self
                .args
                .iter()
                .map(|a| lookup(a).map(str::to_string).unwrap_or_else(|| a.clone()))
                .collect(),
            negated: self.negated,
        }
    }

    /// Parses a literal from text such as `(at hero cave)` or `(not (at hero cave))`.
    ///
    /// `field` names the location of the text for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`ModelErrorKind::InvalidLiteral`] for malformed text and
    /// [`ModelErrorKind::UnsupportedExpression`] for compound forms such as `or`.
    pub fn parse(text: &str, field: &str) -> Result<Self, ModelError> {
        let trimmed = text.trim();
        let source = if trimmed.starts_with('(') {
            trimmed.to_string()
        } else {
            format!("({})", trimmed)
        };
        let expr = SExpr::parse_one(&source).map_err(|_| {
            ModelError::new(ModelErrorKind::InvalidLiteral {
                field: field.to_string(),
                literal: text.to_string(),
            })
        })?;
        Self::from_sexpr(&expr, field)
    }

    /// Builds a literal from an already parsed expression.
    pub fn from_sexpr(expr: &SExpr, field: &str) -> Result<Self, ModelError> {
        let invalid = || {
            ModelError::new(ModelErrorKind::InvalidLiteral {
                field: field.to_string(),
                literal: expr.to_string(),
            })
        };

        let items = expr.as_list().ok_or_else(invalid)?;
        let head = items.first().and_then(SExpr::as_atom).ok_or_else(invalid)?;

        if head == "not" {
            let [inner] = &items[1..] else {
                return Err(invalid());
            };
            let positive = Self::from_sexpr(inner, field)?;
            if positive.negated {
                return Err(invalid());
            }
            return Ok(positive.negate());
        }

        if COMPOUND_HEADS.contains(&head) {
            return Err(ModelError::new(ModelErrorKind::UnsupportedExpression {
                field: field.to_string(),
                expression: expr.to_string(),
            }));
        }

        let args = items[1..]
            .iter()
            .map(|arg| arg.as_atom().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                ModelError::new(ModelErrorKind::UnsupportedExpression {
                    field: field.to_string(),
                    expression: expr.to_string(),
                })
            })?;

        Ok(Self {
            predicate: head.to_string(),
            args,
            negated: false,
        })
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "(not ")?;
        }
        write!(f, "({}", self.predicate)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(f, ")")?;
        if self.negated {
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Literal {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, "literal")
    }
}
