//! Error types for sf-rest.
//!
//! Errors fall into four categories, each a closed enum with structured
//! context:
//!
//! - [`UsageError`]: the caller misused the API
//! - [`ValidationError`]: a field value broke one of its rules
//! - [`ResultError`]: a response could not be turned into records
//! - [`RemoteOperationError`]: Salesforce rejected an operation or the request never completed
//!
//! Match on [`Error::kind`] or use the `is_*` predicates to handle a whole
//! category at once.

use std::fmt;

use sfrecord_client::security::secret;
use sfrecord_client::Response;

/// Result type alias for sf-rest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-rest operations.
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

    /// Returns true for programmer misuse.
    pub fn is_usage(&self) -> bool {
        matches!(self.kind, ErrorKind::Usage(_))
    }

    /// Returns true if a field value failed validation.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation(_))
    }

    /// Returns true for response shape problems.
    pub fn is_result(&self) -> bool {
        matches!(self.kind, ErrorKind::Result(_))
    }

    /// Returns true if the remote operation failed.
    pub fn is_remote(&self) -> bool {
        matches!(self.kind, ErrorKind::Remote(_))
    }

    /// The response context of a failed remote operation, if any.
    pub fn response_context(&self) -> Option<&ResponseContext> {
        match &self.kind {
            ErrorKind::Remote(remote) => remote.context(),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("{0}")]
    Usage(UsageError),

    #[error("{0}")]
    Validation(ValidationError),

    #[error("{0}")]
    Result(ResultError),

    #[error("{0}")]
    Remote(RemoteOperationError),

    /// Authentication failed before a client could be built.
    #[error("Auth error: {0}")]
    Auth(String),

    /// The HTTP client could not be constructed.
    #[error("Client error: {0}")]
    Client(String),
}

// ============================================================================
// Usage
// ============================================================================

/// The caller misused the API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UsageError {
    #[error("Invalid or unsupported SOQL datatype: {datatype}")]
    UnsupportedDatatype { datatype: String },

    #[error("Value {value} ({actual_type}) cannot be quoted as SOQL {datatype}")]
    UnquotableValue {
        datatype: String,
        actual_type: String,
        value: serde_json::Value,
    },

    #[error("{sobject_type}.{id_field} is empty")]
    EmptyId {
        sobject_type: String,
        id_field: String,
    },

    #[error("{sobject_type} has no field {field}")]
    NoSuchField { sobject_type: String, field: String },

    #[error("Record type {record_type} does not match schema type {expected}")]
    BadRecordType {
        expected: String,
        record_type: String,
    },

    #[error("Schema for {schema_type} cannot be mapped to type {sobject_type:?}")]
    BadTypeMapping {
        sobject_type: String,
        schema_type: String,
    },
}

// ============================================================================
// Validation
// ============================================================================

/// A field value broke one of its rules.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid byte length {length} (expected {}): {value:?}", bounds(.min, .max))]
    BadByteLength {
        value: String,
        length: usize,
        min: Option<usize>,
        max: Option<usize>,
    },

    #[error("Invalid character length {length} (expected {}): {value:?}", bounds(.min, .max))]
    BadCharacterLength {
        value: String,
        length: usize,
        min: Option<usize>,
        max: Option<usize>,
    },

    #[error("Value {value:?} is not one of {}", .allowed.join("|"))]
    BadEnumValue { value: String, allowed: Vec<String> },

    #[error("Invalid Salesforce 18-character id: {value:?}")]
    BadId { value: String },

    #[error("Value is required")]
    ValueRequired,

    #[error("Invalid value: {0}")]
    Invalid(String),
}

fn bounds(min: &Option<usize>, max: &Option<usize>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{min}..={max}"),
        (Some(min), None) => format!(">= {min}"),
        (None, Some(max)) => format!("<= {max}"),
        (None, None) => "any".to_string(),
    }
}

// ============================================================================
// Result
// ============================================================================

/// A response could not be turned into records.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResultError {
    #[error("No type specified in record attributes (record id {record_id:?})")]
    NoType { record_id: Option<String> },

    #[error("Error parsing Salesforce API response body (status {status})")]
    UnparsableResponse { status: u16 },

    #[error("Error parsing {} record", .sobject_type.as_deref().unwrap_or("Salesforce"))]
    UnparsableRecord {
        /// The raw record that failed.
        record: serde_json::Value,
        /// The schema type the page resolved to, if it declares one.
        sobject_type: Option<String>,
    },

    #[error("Unexpected HTTP response status code {status}")]
    UnexpectedStatus { status: u16 },
}

// ============================================================================
// Remote operations
// ============================================================================

/// Salesforce rejected an operation, or the request never completed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteOperationError {
    #[error("Failed to create record: {0}")]
    CreateFailed(ResponseContext),

    #[error("Failed to get record: {0}")]
    GetFailed(ResponseContext),

    #[error("Failed to update record: {0}")]
    UpdateFailed(ResponseContext),

    #[error("Failed to delete record: {0}")]
    DeleteFailed(ResponseContext),

    #[error("HTTP request failed: {method} {path}")]
    RequestFailed { method: String, path: String },
}

impl RemoteOperationError {
    /// The response context, for failures that produced a response.
    pub fn context(&self) -> Option<&ResponseContext> {
        match self {
            Self::CreateFailed(ctx)
            | Self::GetFailed(ctx)
            | Self::UpdateFailed(ctx)
            | Self::DeleteFailed(ctx) => Some(ctx),
            Self::RequestFailed { .. } => None,
        }
    }
}

/// What a failed response said about itself.
///
/// Salesforce fields come from the first element of a JSON error array, or
/// from the body itself when it is a single object (e.g. a create result).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseContext {
    pub status: u16,
    pub reason: String,
    pub id: Option<String>,
    pub success: Option<bool>,
    pub created: Option<bool>,
    pub error_code: Option<String>,
    pub errors: Vec<String>,
    /// `errors` joined by newlines when present, otherwise `message`.
    pub error_message: Option<String>,
}

impl ResponseContext {
    /// Extract context from a response.
    pub fn from_response(response: &Response) -> Self {
        let payload = match serde_json::from_slice::<serde_json::Value>(response.body()) {
            Ok(serde_json::Value::Array(mut items)) if !items.is_empty() => items.swap_remove(0),
            Ok(value @ serde_json::Value::Object(_)) => value,
            _ => serde_json::Value::Null,
        };

        let text = |key: &str| payload.get(key).and_then(|v| v.as_str()).map(str::to_string);
        let flag = |key: &str| payload.get(key).and_then(|v| v.as_bool());

        let errors: Vec<String> = payload
            .get("errors")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().map(error_text).collect())
            .unwrap_or_default();

        let error_message = if errors.is_empty() {
            text("message")
        } else {
            Some(errors.join("\n"))
        }
        .map(|m| secret::sanitize_message(&m));

        Self {
            status: response.status(),
            reason: response.reason().to_string(),
            id: text("id"),
            success: flag("success"),
            created: flag("created"),
            error_code: text("errorCode").or_else(|| text("statusCode")),
            errors,
            error_message,
        }
    }
}

fn error_text(item: &serde_json::Value) -> String {
    match item {
        serde_json::Value::String(s) => s.clone(),
        other => other
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    }
}

impl fmt::Display for ResponseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.reason)?;
        if let Some(ref code) = self.error_code {
            write!(f, " [{code}]")?;
        }
        if let Some(ref message) = self.error_message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<UsageError> for Error {
    fn from(err: UsageError) -> Self {
        Error::new(ErrorKind::Usage(err))
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::new(ErrorKind::Validation(err))
    }
}

impl From<ResultError> for Error {
    fn from(err: ResultError) -> Self {
        Error::new(ErrorKind::Result(err))
    }
}

impl From<RemoteOperationError> for Error {
    fn from(err: RemoteOperationError) -> Self {
        Error::new(ErrorKind::Remote(err))
    }
}

impl From<sfrecord_client::Error> for Error {
    fn from(err: sfrecord_client::Error) -> Self {
        Error::with_source(ErrorKind::Client(err.to_string()), err)
    }
}

impl From<sfrecord_auth::Error> for Error {
    fn from(err: sfrecord_auth::Error) -> Self {
        Error::with_source(ErrorKind::Auth(err.to_string()), err)
    }
}
