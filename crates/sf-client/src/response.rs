//! HTTP response as plain data.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// A fully buffered HTTP response.
///
/// The body is read eagerly by the transport, so a `Response` holds no
/// connection and can be inspected any number of times.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    reason: String,
    headers: BTreeMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Build a response from its parts.
    ///
    /// Header names are normalized to lowercase for case-insensitive lookups.
    pub fn new(
        status: u16,
        headers: impl IntoIterator<Item = (String, String)>,
        body: impl Into<Bytes>,
    ) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();

        Self {
            status,
            reason: canonical_reason(status).to_string(),
            headers,
            body: body.into(),
        }
    }

    /// Override the reason phrase.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the reason phrase for the status code.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    /// All response headers (lowercase names).
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Get the response body as bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String> {
        Ok(String::from_utf8(self.body.to_vec())?)
    }

    /// Deserialize the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Into::into)
    }

    /// Parse Salesforce error entries from the body.
    ///
    /// Salesforce reports failures as a JSON array of
    /// `{"errorCode", "message", "fields"}` objects; a single object is
    /// accepted too. Anything else yields an empty list.
    pub fn api_errors(&self) -> Vec<ApiError> {
        if let Ok(errors) = serde_json::from_slice::<Vec<ApiError>>(&self.body) {
            return errors;
        }
        serde_json::from_slice::<ApiError>(&self.body)
            .map(|err| vec![err])
            .unwrap_or_default()
    }
}

/// One entry of a Salesforce error response body.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ApiError {
    #[serde(alias = "errorCode", alias = "statusCode")]
    pub error_code: String,
    pub message: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}
