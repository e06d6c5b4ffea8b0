//! Top-level error wrapper types.

use crate::{
    BuilderError, ConfigError, IoError, ModelError, NarrativeError, OracleError,
    PlannerError, ServerError, SimulationError, StorageError,
};

/// Every error condition a QuestMaster operation can report.
///
/// # Examples
///
/// ```
/// use questmaster_error::{QuestError, IoError};
///
/// let io_err = IoError::new("stdin closed");
/// let err: QuestError = io_err.into();
/// assert!(format!("{}", err).contains("I/O Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum QuestErrorKind {
    /// Console or stream I/O error
    #[from(IoError)]
    Io(IoError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Artifact storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Formal model validation error
    #[from(ModelError)]
    Model(ModelError),
    /// Narrative graph error
    #[from(NarrativeError)]
    Narrative(NarrativeError),
    /// Effect simulation error
    #[from(SimulationError)]
    Simulation(SimulationError),
    /// Planner process error
    #[from(PlannerError)]
    Planner(PlannerError),
    /// Oracle (LLM) error
    #[from(OracleError)]
    Oracle(OracleError),
    /// Graph query server error
    #[from(ServerError)]
    Server(ServerError),
}

/// QuestMaster error with kind discrimination.
///
/// # Examples
///
/// ```
/// use questmaster_error::{QuestError, QuestResult, ConfigError};
///
/// fn might_fail() -> QuestResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("QuestMaster Error: {}", _0)]
pub struct QuestError(Box<QuestErrorKind>);

impl QuestError {
    /// Create a new error from a kind.
    pub fn new(kind: QuestErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &QuestErrorKind {
        &self.0
    }

    /// Returns the validation error if this is a formal model failure.
    pub fn as_model_error(&self) -> Option<&ModelError> {
        match self.kind() {
            QuestErrorKind::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl<T> From<T> for QuestError
where
    T: Into<QuestErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for QuestMaster operations.
pub type QuestResult<T> = std::result::Result<T, QuestError>;
