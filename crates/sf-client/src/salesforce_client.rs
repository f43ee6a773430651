//! Authenticated Salesforce transport bound to one org instance.
//!
//! [`SalesforceClient`] combines an access token and instance URL with an
//! [`SfHttpClient`] and implements [`Transport`], the seam the REST layer
//! talks through.
//!
//! ## Security
//!
//! - Access tokens are redacted in Debug output
//! - Tokens are never recorded in tracing spans

use tracing::instrument;

use crate::client::SfHttpClient;
use crate::config::{normalize_api_version, ClientConfig};
use crate::error::Result;
use crate::request::RequestBuilder;
use crate::response::Response;

/// Something that can carry a request to Salesforce and bring back the
/// buffered response.
///
/// Implementations block until the exchange completes. A non-2xx status is
/// a successful exchange; only failures without any response are errors.
pub trait Transport: Send + Sync {
    /// Send one request.
    fn send(&self, request: RequestBuilder) -> Result<Response>;

    /// The REST API version requests should target (e.g. `"59.0"`).
    fn api_version(&self) -> &str;
}

/// Salesforce API client holding an access token for one instance.
///
/// # Example
///
/// ```rust,no_run
/// use sfrecord_client::{SalesforceClient, Transport};
///
/// # fn main() -> Result<(), sfrecord_client::Error> {
/// let client = SalesforceClient::new("https://na1.salesforce.com", "token")?
///     .with_api_version("60.0");
///
/// let response = client.send(client.get("/services/data/v60.0/limits"))?;
/// assert!(response.is_success());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SalesforceClient {
    http: SfHttpClient,
    instance_url: String,
    access_token: String,
    api_version: String,
}

impl std::fmt::Debug for SalesforceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceClient")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl SalesforceClient {
    /// Create a new Salesforce client with the given instance URL and access token.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        Self::with_config(instance_url, access_token, ClientConfig::default())
    }

    /// Create a new Salesforce client with custom configuration.
    pub fn with_config(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let api_version = config.api_version.clone();
        Ok(Self {
            http: SfHttpClient::new(config)?,
            instance_url: instance_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            api_version,
        })
    }

    /// Set the API version (e.g., "60.0"); a leading `v` is dropped.
    pub fn with_api_version(mut self, version: impl AsRef<str>) -> Self {
        self.api_version = normalize_api_version(version.as_ref());
        self
    }

    /// Get the instance URL.
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Get the access token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Get the underlying HTTP client.
    pub fn http(&self) -> &SfHttpClient {
        &self.http
    }

    /// Build the full URL for a path.
    ///
    /// If the path starts with `/`, it's appended to the instance URL.
    /// Full URLs are passed through unchanged.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.instance_url, path)
        } else {
            format!("{}/{}", self.instance_url, path)
        }
    }

    // =========================================================================
    // Authenticated request builders
    // =========================================================================

    /// Create a GET request builder with authentication.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(path).oauth_token(&self.access_token)
    }

    /// Create a POST request builder with authentication.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(path).oauth_token(&self.access_token)
    }

    /// Create a PATCH request builder with authentication.
    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.http.patch(path).oauth_token(&self.access_token)
    }

    /// Create a DELETE request builder with authentication.
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(path).oauth_token(&self.access_token)
    }
}

impl Transport for SalesforceClient {
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.url()))]
    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let url = self.url(request.url());
        let mut request = request.with_url(url);
        if !request.is_authenticated() {
            request = request.oauth_token(&self.access_token);
        }
        self.http.execute(&request)
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }
}
