//! Narrative error types.

/// Specific error conditions for narrative text handling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum NarrativeErrorKind {
    /// Narrative text is empty or whitespace only
    #[display("Narrative text is empty")]
    EmptyNarrative,
    /// No numbered section header was found
    #[display("No numbered section found in narrative ({} bytes)", _0)]
    NoSections(usize),
    /// Failed to read narrative file
    #[display("Failed to read narrative file: {}", _0)]
    FileRead(String),
    /// Failed to serialize a graph export
    #[display("Serialization error: {}", _0)]
    Serialization(String),
}

/// Error type for narrative operations.
///
/// # Examples
///
/// ```
/// use questmaster_error::{NarrativeError, NarrativeErrorKind};
///
/// let err = NarrativeError::new(NarrativeErrorKind::EmptyNarrative);
/// assert!(format!("{}", err).contains("empty"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Narrative Error: {} at line {} in {}", kind, line, file)]
pub struct NarrativeError {
    /// The specific error condition
    pub kind: NarrativeErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl NarrativeError {
    /// Create a new NarrativeError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NarrativeErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
