use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Invalid analysis record: {message}")]
    InvalidRecord { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Input rejected before any network call is made
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Please select both app.py and api.py files.")]
    MissingUpload,

    #[error("Please select a valid Python (.py) file: {path}")]
    NotPython { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("No analysis loaded. Analyze app.py and api.py first.")]
    MissingAnalysis,

    #[error("No quick question {number}; choose 1 to {count}")]
    UnknownQuickQuestion { number: usize, count: usize },
}

/// Analyzer backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Non-2xx response carrying a `detail` field, reported verbatim.
    #[error("{detail}")]
    Detail { status: u16, detail: String },

    #[error("Diagram generation failed: {message}")]
    Diagram { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// HTTP status of the failed response, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } | BackendError::Detail { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;
