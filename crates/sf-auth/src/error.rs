//! Error types for sf-auth.
//!
//! Error messages are designed to avoid exposing sensitive credential data.

use std::collections::BTreeMap;

use sfrecord_client::security::secret;

/// Result type alias for sf-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-auth operations.
///
/// Error messages are sanitized to prevent accidental credential exposure.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if required parameters were missing.
    pub fn is_missing_parameters(&self) -> bool {
        matches!(self.kind, ErrorKind::MissingParameters(_))
    }

    /// Returns true if the grant server rejected the credentials.
    pub fn is_authentication_failed(&self) -> bool {
        matches!(self.kind, ErrorKind::AuthenticationFailed { .. })
    }
}

/// The kind of error that occurred.
///
/// Error messages avoid including credential values.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// One or more required parameters were not supplied.
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    /// The grant response did not carry both an access token and an instance URL.
    #[error("Authentication failed: {status} {reason}")]
    AuthenticationFailed {
        status: u16,
        reason: String,
        /// `error_description` (or `error`) from the grant response, sanitized.
        message: Option<String>,
        /// Supplied parameters with secrets digested.
        parameters: BTreeMap<String, String>,
    },

    /// The token request never got a response.
    #[error("Token request failed: {0}")]
    Transport(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<sfrecord_client::Error> for Error {
    fn from(err: sfrecord_client::Error) -> Self {
        let message = secret::sanitize_message(&err.to_string());
        Error::with_source(ErrorKind::Transport(message), err)
    }
}
