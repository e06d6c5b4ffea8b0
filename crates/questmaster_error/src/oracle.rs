//! Oracle (LLM backend) error types.

/// Error kinds for oracle calls.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum OracleErrorKind {
    /// HTTP request failed
    #[display("HTTP request failed: {}", _0)]
    Http(String),

    /// Provider returned a non-success status
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Provider rate limited the request
    #[display("Rate limited: {}", _0)]
    RateLimited(String),

    /// Failed to deserialize response
    #[display("Failed to deserialize response: {}", _0)]
    Deserialization(String),

    /// Response carried no text
    #[display("Empty response from model '{}'", _0)]
    EmptyResponse(String),

    /// Client is misconfigured
    #[display("Configuration error: {}", _0)]
    Configuration(String),
}

impl OracleErrorKind {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            OracleErrorKind::Http(_) | OracleErrorKind::RateLimited(_) => true,
            OracleErrorKind::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Oracle error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Oracle Error: {} at line {} in {}", kind, line, file)]
pub struct OracleError {
    /// The error kind
    pub kind: OracleErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl OracleError {
    /// Create a new OracleError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: OracleErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
