//! Transport errors.
//!
//! A non-2xx status is not an error at this layer: it comes back as an
//! ordinary [`Response`](crate::Response). Errors here mean no usable
//! response exists, or a request could not be built.

use crate::security::secret::sanitize_message;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Transport error.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// The exchange itself failed: nothing, or only part of a response,
    /// came back.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Timeout | ErrorKind::Connection(_) | ErrorKind::Body(_)
        )
    }

    /// The request was never sent because it could not be built.
    pub fn is_request(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvalidUrl(_) | ErrorKind::Encoding(_) | ErrorKind::Config(_)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    /// The connection broke while the body was read.
    #[error("Response body unreadable: {0}")]
    Body(String),

    /// The body is not the JSON the caller asked for.
    #[error("Response is not valid JSON: {0}")]
    Json(String),

    #[error("Response is not valid UTF-8")]
    Utf8,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A JSON or form request body could not be encoded.
    #[error("Request body could not be encoded: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // reqwest messages embed the full URL, query string included
        let message = sanitize_message(&err.to_string());
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(message)
        } else if err.is_body() || err.is_decode() {
            ErrorKind::Body(message)
        } else if err.is_builder() {
            ErrorKind::Config(message)
        } else {
            ErrorKind::Other(message)
        };
        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        let kind = if err.is_io() {
            ErrorKind::Encoding(err.to_string())
        } else {
            ErrorKind::Json(err.to_string())
        };
        Error::with_source(kind, err)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::with_source(ErrorKind::Encoding(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::with_source(ErrorKind::Utf8, err)
    }
}
