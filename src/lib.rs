//! # sfrecord
//!
//! A Salesforce REST client that maps API responses into typed records.
//!
//! Query results come back as lazy record sets: records are built as they
//! are iterated, related records and related lists become nested records
//! and record sets, and further pages are fetched only when iteration
//! reaches them.
//!
//! ## Security
//!
//! - Sensitive data (tokens, secrets) are redacted in Debug output
//! - Tracing/logging skips credential parameters
//! - Secrets carried in error context are replaced by their SHA-256 digest
//!
//! ## Crates
//!
//! - **sfrecord-client** - Blocking HTTP transport, request/response types, SOQL escaping
//! - **sfrecord-auth** - OAuth 2.0 username-password authentication
//! - **sfrecord-rest** - Records, record sets, SOQL templates and the CRUD client
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sfrecord::auth::PasswordCredentials;
//! use sfrecord::rest::SalesforceRestClient;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // SF_CLIENT_ID, SF_CLIENT_SECRET, SF_USERNAME, SF_PASSWORD
//!     let creds = PasswordCredentials::from_env()?;
//!     let client = SalesforceRestClient::login(&creds.authenticator()?, &creds.to_parameters())?;
//!
//!     let accounts = client.query("SELECT Id, Name FROM Account LIMIT 10", &[])?;
//!     for account in &accounts {
//!         println!("{:?}", account?.get_str("Name"));
//!     }
//!
//!     Ok(())
//! }
//! ```

#[cfg(feature = "auth")]
pub use sfrecord_auth as auth;
#[cfg(feature = "client")]
pub use sfrecord_client as client;
#[cfg(feature = "rest")]
pub use sfrecord_rest as rest;

#[cfg(feature = "client")]
pub use sfrecord_client::{ClientConfig, SalesforceClient, Transport};

#[cfg(feature = "auth")]
pub use sfrecord_auth::{Authenticator, PasswordAuth, PasswordCredentials};

#[cfg(feature = "rest")]
pub use sfrecord_rest::{FieldRule, FieldValue, Record, RecordSchema, RecordSet, SalesforceRestClient, TypeMap};
