//! Salesforce REST API client.
//!
//! This client talks to the API through any [`Transport`] (normally a
//! [`SalesforceClient`] from `sf-client`) and turns responses into
//! [`Record`](crate::Record)s and [`RecordSet`]s using its [`TypeMap`].
//!
//! Every path is relative to `/services/data/v{version}`, except
//! `nextRecordsUrl` links and [`SalesforceRestClient::stream`] paths, which
//! the API already hands out in full.

use std::fmt;
use std::sync::Arc;

use sfrecord_auth::{AuthParameters, Authenticator};
use sfrecord_client::{ClientConfig, RequestBuilder, RequestMethod, Response, SalesforceClient, Transport};
use tracing::{debug, info};

use crate::error::{Error, ErrorKind, RemoteOperationError, ResponseContext, Result};
use crate::result::{PageFetcher, RecordSet};
use crate::schema::{RecordSchema, TypeMap};

mod crud;
mod query;

/// Salesforce REST API client.
///
/// Cloning is cheap; clones share the transport and the type map as of the
/// time of cloning.
///
/// # Example
///
/// ```rust,no_run
/// use serde_json::json;
/// use sfrecord_rest::{Record, SalesforceRestClient};
///
/// # fn main() -> Result<(), sfrecord_rest::Error> {
/// let client = SalesforceRestClient::new("https://myorg.my.salesforce.com", "access_token_here")?;
///
/// // Create
/// let account = client.create(&Record::new("Account", [("Name", "New Account")])?)?;
///
/// // Query, following every page
/// for record in &client.query("SELECT Id, Name FROM Account WHERE Name = {name}", &[("name", json!("New Account"))])? {
///     println!("{:?}", record?.get_str("Name"));
/// }
///
/// // Delete
/// client.delete(&account)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SalesforceRestClient {
    transport: Arc<dyn Transport>,
    types: Arc<TypeMap>,
    api_version: String,
}

impl SalesforceRestClient {
    /// Create a new REST client with the given instance URL and access token.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let client = SalesforceClient::new(instance_url, access_token)?;
        Ok(Self::from_client(client))
    }

    /// Create a new REST client with custom HTTP configuration.
    pub fn with_config(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let client = SalesforceClient::with_config(instance_url, access_token, config)?;
        Ok(Self::from_client(client))
    }

    /// Create a REST client from an existing SalesforceClient.
    pub fn from_client(client: SalesforceClient) -> Self {
        Self::from_transport(Arc::new(client))
    }

    /// Create a REST client over any transport.
    pub fn from_transport(transport: Arc<dyn Transport>) -> Self {
        let api_version = transport.api_version().to_string();
        Self {
            transport,
            types: Arc::new(TypeMap::default()),
            api_version,
        }
    }

    /// Authenticate, then build a client over the resulting transport.
    pub fn login(authenticator: &impl Authenticator, parameters: &AuthParameters) -> Result<Self> {
        let client = authenticator.authenticate(parameters)?;
        Ok(Self::from_client(client))
    }

    /// Set the API version (e.g., "60.0").
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Get the API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// The prefix of every relative API path.
    pub fn api_path(&self) -> String {
        format!("/services/data/v{}", self.api_version)
    }

    // =========================================================================
    // Type mapping
    // =========================================================================

    /// Replace the type map.
    pub fn with_type_map(mut self, types: TypeMap) -> Self {
        self.types = Arc::new(types);
        self
    }

    /// Build records of `sobject_type` with `schema`.
    ///
    /// Fails with `BadTypeMapping` if the schema is bound to another type.
    pub fn map_type(
        &mut self,
        sobject_type: impl Into<String>,
        schema: impl Into<Arc<RecordSchema>>,
    ) -> Result<&mut Self> {
        Arc::make_mut(&mut self.types).register(sobject_type, schema)?;
        Ok(self)
    }

    /// The type map used for results.
    pub fn type_map(&self) -> &TypeMap {
        &self.types
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// Build a record set from a response, following further pages through
    /// this client.
    pub fn result_from(&self, response: &Response) -> Result<RecordSet> {
        RecordSet::from_response(
            response.status(),
            response.body(),
            self.types.clone(),
            Some(self.page_fetcher()),
        )
    }

    /// Fetch the page behind a `nextRecordsUrl`.
    pub fn more_results_from(&self, url: &str) -> Result<RecordSet> {
        let response = self.execute(RequestBuilder::new(RequestMethod::Get, url))?;
        self.result_from(&response)
    }

    fn page_fetcher(&self) -> PageFetcher {
        let client = self.clone();
        Arc::new(move |url: &str| client.more_results_from(url))
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// A request for a path relative to the API root.
    pub(crate) fn request(&self, method: RequestMethod, path: &str) -> RequestBuilder {
        RequestBuilder::new(method, format!("{}{}", self.api_path(), path))
    }

    /// Send a request. Failures without a response become `RequestFailed`.
    pub(crate) fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let method = request.method().to_string();
        let path = request.url().to_string();
        debug!(%method, %path, "Sending request");

        self.transport.send(request).map_err(|err| {
            info!(%method, %path, error = %err, "HTTP request failed");
            Error::with_source(
                ErrorKind::Remote(RemoteOperationError::RequestFailed { method, path }),
                err,
            )
        })
    }
}

/// Fail with the operation's error unless the status is one of `expected`.
pub(crate) fn expect_status(
    response: &Response,
    expected: &[u16],
    failure: fn(ResponseContext) -> RemoteOperationError,
) -> Result<()> {
    if expected.contains(&response.status()) {
        return Ok(());
    }
    let context = ResponseContext::from_response(response);
    info!(status = context.status, error = ?context.error_message, "Unexpected response status");
    Err(failure(context).into())
}

impl fmt::Debug for SalesforceRestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SalesforceRestClient")
            .field("api_version", &self.api_version)
            .field("mapped_types", &self.types.len())
            .finish_non_exhaustive()
    }
}
