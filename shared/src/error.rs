//! Error types for the weekly schedule event store.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving event requests.
#[derive(Error, Debug)]
pub enum Error {
    /// One or more required input fields were missing or empty
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Grid backend call failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// Google token grant failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingFields(_) | Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Whether this error came from (or on the way to) the remote grid.
    pub fn is_backend_failure(&self) -> bool {
        self.status_code() == 500
    }
}
