//! # sf-auth
//!
//! Salesforce authentication for the `sfrecord` workspace.
//!
//! An [`Authenticator`] turns credential parameters into an authenticated
//! [`sfrecord_client::SalesforceClient`], ready to hand to the REST layer.
//!
//! ## Security
//!
//! - Secrets are redacted in Debug output
//! - Tracing skips credential parameters
//! - `client_secret` and `password` are replaced by a SHA-256 digest before
//!   they are attached to any error
//!
//! ## Supported Authentication Methods
//!
//! - **OAuth 2.0 Username-Password Flow** ([`PasswordAuth`])
//!
//! ## Example
//!
//! ```rust,no_run
//! use sfrecord_auth::{Authenticator, PasswordCredentials};
//!
//! fn main() -> Result<(), sfrecord_auth::Error> {
//!     // SF_CLIENT_ID, SF_CLIENT_SECRET, SF_USERNAME, SF_PASSWORD
//!     let creds = PasswordCredentials::from_env()?;
//!
//!     let client = creds.authenticator()?.authenticate(&creds.to_parameters())?;
//!     println!("{}", client.instance_url());
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod password;

pub use credentials::PasswordCredentials;
pub use error::{Error, ErrorKind, Result};
pub use password::{AuthParameters, Authenticator, PasswordAuth, TokenResponse};

/// Default Salesforce login URL for production.
pub const PRODUCTION_LOGIN_URL: &str = "https://login.salesforce.com";

/// Default Salesforce login URL for sandbox.
pub const SANDBOX_LOGIN_URL: &str = "https://test.salesforce.com";

/// Token endpoint path, relative to the login URL.
pub const TOKEN_PATH: &str = "/services/oauth2/token";
