//! Core blocking HTTP client with compression and request tracing.

use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{RequestBody, RequestBuilder, RequestMethod};
use crate::response::Response;

/// Blocking HTTP client for Salesforce APIs.
///
/// Non-2xx responses are returned as ordinary [`Response`] values. Only
/// failures that produce no response at all (timeouts, refused
/// connections, unreadable bodies) surface as errors.
#[derive(Debug, Clone)]
pub struct SfHttpClient {
    inner: reqwest::blocking::Client,
    config: ClientConfig,
}

impl SfHttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let builder = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool.idle_timeout)
            .pool_max_idle_per_host(config.pool.max_idle_per_host)
            .user_agent(config.user_agent.as_str())
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed);

        let inner = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Get, url)
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Post, url)
    }

    /// Create a PATCH request builder.
    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Patch, url)
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Delete, url)
    }

    /// Execute a request and buffer the whole response.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub fn execute(&self, request: &RequestBuilder) -> Result<Response> {
        let url = full_url(request)?;
        let mut req = self.inner.request(request.method.to_reqwest(), url);

        if let Some(ref token) = request.oauth_token {
            req = req.header("Authorization", format!("OAuth {token}"));
        }

        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if self.config.accept_compressed {
            req = req.header("Accept-Encoding", "gzip, deflate");
        }

        if let Some(ref body) = request.body {
            req = match body {
                RequestBody::Json(value) => req.body(serde_json::to_vec(value)?),
                RequestBody::Form(encoded) => req.body(encoded.clone()),
                RequestBody::Text(text) => req.body(text.clone()),
            };
        }

        if self.config.trace_exchanges {
            debug!("Sending request");
        }

        let response = req.send()?;
        let status = response.status();

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes()?;

        if self.config.trace_exchanges {
            let status = status.as_u16();
            let content_length = body.len();
            if (200..300).contains(&status) {
                debug!(status, content_length, "Response received");
            } else {
                info!(status, content_length, "Non-success response");
            }
        }

        let mut out = Response::new(status.as_u16(), headers, body);
        if let Some(reason) = status.canonical_reason() {
            out = out.with_reason(reason);
        }
        Ok(out)
    }

    /// Execute a request.
    pub fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.execute(&request)
    }
}

/// Append the builder's query parameters to its url.
fn full_url(request: &RequestBuilder) -> Result<url::Url> {
    let mut url = url::Url::parse(&request.url)?;
    if !request.query_params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &request.query_params {
            pairs.append_pair(name, value);
        }
    }
    Ok(url)
}
