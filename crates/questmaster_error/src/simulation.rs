//! Effect simulation errors.

/// Binding failures between a grounded action and its declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum SimulationErrorKind {
    /// Number of grounded arguments differs from the declared parameters
    #[display("Action '{}' expects {} arguments, got {}", action, expected, found)]
    ArityMismatch {
        /// Action name as declared
        action: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        found: usize,
    },
    /// A grounded argument's type does not fit the parameter slot
    #[display("Argument '{}' of type '{}' does not fit parameter ?{} - {} of '{}'", argument, argument_type, parameter, parameter_type, action)]
    TypeMismatch {
        /// Action name as declared
        action: String,
        /// Parameter variable (without `?`)
        parameter: String,
        /// Declared parameter type
        parameter_type: String,
        /// Grounded argument
        argument: String,
        /// Type of the grounded argument
        argument_type: String,
    },
    /// A plan step could not be parsed
    #[display("Invalid plan step: '{}'", _0)]
    InvalidStep(String),
}

/// Simulation error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Simulation Error: {} at line {} in {}", kind, line, file)]
pub struct SimulationError {
    /// The specific error condition
    pub kind: SimulationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl SimulationError {
    /// Create a new SimulationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SimulationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
