//! Planner process errors.
//!
//! These describe failures to *run* the planner. A planner that runs and
//! finds no plan is an outcome, not an error.

/// Error kinds for planner invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PlannerErrorKind {
    /// The planner executable could not be started
    #[display("Failed to spawn planner '{}': {}", command, message)]
    Spawn {
        /// Command that was launched
        command: String,
        /// OS error message
        message: String,
    },
    /// Reading or writing a planner artifact failed
    #[display("Planner I/O error: {}", _0)]
    Io(String),
    /// The planner exceeded its wall-clock limit
    #[display("Planner timed out after {} seconds", _0)]
    Timeout(u64),
}

/// Planner error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Planner Error: {} at line {} in {}", kind, line, file)]
pub struct PlannerError {
    /// The error kind
    pub kind: PlannerErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl PlannerError {
    /// Create a new PlannerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PlannerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
