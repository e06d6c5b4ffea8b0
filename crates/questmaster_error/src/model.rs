//! Formal model validation errors.

/// Reasons a domain or problem is rejected.
///
/// Every variant names the offending field using a path such as
/// `actions[1].effects[0]` so the raw oracle output can be inspected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ModelErrorKind {
    /// Input is not valid JSON for the expected shape
    #[display("Malformed JSON: {}", _0)]
    MalformedJson(String),
    /// Input is not valid PDDL
    #[display("Malformed PDDL at {}: {}", field, message)]
    MalformedPddl {
        /// Section or path being parsed
        field: String,
        /// What went wrong
        message: String,
    },
    /// A required field is missing or empty
    #[display("Missing required field: {}", _0)]
    MissingField(String),
    /// A literal could not be parsed
    #[display("Invalid literal in {}: '{}'", field, literal)]
    InvalidLiteral {
        /// Offending field path
        field: String,
        /// Raw literal text
        literal: String,
    },
    /// A literal uses a predicate the domain does not declare
    #[display("Undeclared predicate '{}' in {}", predicate, field)]
    UndeclaredPredicate {
        /// Offending field path
        field: String,
        /// Predicate name
        predicate: String,
    },
    /// A literal uses a declared predicate with the wrong number of arguments
    #[display("Predicate '{}' used with {} arguments in {}, declared arities: {:?}", predicate, found, field, declared)]
    PredicateArity {
        /// Offending field path
        field: String,
        /// Predicate name
        predicate: String,
        /// Number of arguments found
        found: usize,
        /// Arities declared in the domain
        declared: Vec<usize>,
    },
    /// A variable in an action literal is not bound by a parameter
    #[display("Unbound variable '{}' in {}", variable, field)]
    UnboundVariable {
        /// Offending field path
        field: String,
        /// Variable name including the `?`
        variable: String,
    },
    /// A ground fact refers to an object that is neither declared nor a constant
    #[display("Undeclared object '{}' in {}", object, field)]
    UndeclaredObject {
        /// Offending field path
        field: String,
        /// Object name
        object: String,
    },
    /// A ground fact contains a variable
    #[display("Variable '{}' not allowed in ground fact {}", variable, field)]
    NonGroundFact {
        /// Offending field path
        field: String,
        /// Variable name
        variable: String,
    },
    /// Two predicate signatures share a name and arity
    #[display("Duplicate predicate signature '{}'/{}", name, arity)]
    DuplicatePredicate {
        /// Predicate name
        name: String,
        /// Arity
        arity: usize,
    },
    /// Two actions share a name
    #[display("Duplicate action '{}'", _0)]
    DuplicateAction(String),
    /// Two objects share a name
    #[display("Duplicate object '{}'", _0)]
    DuplicateObject(String),
    /// Expression form the planner grammar subset does not support
    #[display("Unsupported expression in {}: {}", field, expression)]
    UnsupportedExpression {
        /// Offending field path
        field: String,
        /// The expression head or text
        expression: String,
    },
}

/// Formal model validation error with location tracking.
///
/// # Examples
///
/// ```
/// use questmaster_error::{ModelError, ModelErrorKind};
///
/// let err = ModelError::new(ModelErrorKind::DuplicateAction("move".to_string()));
/// assert!(format!("{}", err).contains("Duplicate action"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Model Error: {} at line {} in {}", kind, line, file)]
pub struct ModelError {
    /// The specific validation failure
    pub kind: ModelErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ModelError {
    /// Create a new ModelError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ModelErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ModelErrorKind {
        &self.kind
    }
}
