//! # sf-client
//!
//! Blocking HTTP transport for the Salesforce REST API.
//!
//! This crate is the transport collaborator used by `sfrecord-rest`:
//! - A [`Transport`] trait taking a request description and returning a plain-data [`Response`]
//! - [`SfHttpClient`], a configured `reqwest` blocking client
//! - [`SalesforceClient`], an authenticated transport bound to one org instance
//! - Request/response tracing
//! - [`security`] helpers for SOQL escaping, URL encoding and secret digests
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │  (sf-rest: records, record sets, query builder, facade)     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ Transport
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SalesforceClient                          │
//! │  - Holds instance URL + access token                        │
//! │  - Resolves relative paths, adds the OAuth header           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SfHttpClient                             │
//! │  - Raw blocking HTTP with compression and timeouts          │
//! │  - Response buffering into plain data                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call blocks the calling thread until a response or a transport
//! error is available. Nothing is retried.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sfrecord_client::{SalesforceClient, Transport};
//!
//! # fn main() -> Result<(), sfrecord_client::Error> {
//! let client = SalesforceClient::new("https://na1.salesforce.com", "access-token")?;
//!
//! let response = client.send(client.get("/services/data/v59.0/limits"))?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
mod salesforce_client;
pub mod security;

pub use client::SfHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder, PoolConfig};
pub use error::{Error, ErrorKind, Result};
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use response::Response;
pub use salesforce_client::{SalesforceClient, Transport};

/// Default Salesforce API version
pub const DEFAULT_API_VERSION: &str = "59.0";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("sfrecord/", env!("CARGO_PKG_VERSION"));
