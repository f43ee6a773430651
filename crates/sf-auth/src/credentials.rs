//! Password-flow credentials.
//!
//! Secrets are redacted in Debug output.

use sfrecord_client::DEFAULT_API_VERSION;

use crate::error::{Error, ErrorKind, Result};
use crate::password::{AuthParameters, PasswordAuth};

/// Credentials for the username-password flow.
#[derive(Clone)]
pub struct PasswordCredentials {
    client_id: String,
    client_secret: String,
    username: String,
    password: String,
    login_url: Option<String>,
    api_version: String,
}

impl std::fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("login_url", &self.login_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl PasswordCredentials {
    /// Create new credentials with the given values.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: username.into(),
            password: password.into(),
            login_url: None,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Load credentials from environment variables.
    ///
    /// Required: `SF_CLIENT_ID`, `SF_CLIENT_SECRET`, `SF_USERNAME`, `SF_PASSWORD`.
    /// Optional: `SF_LOGIN_URL`, `SF_API_VERSION`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::new(ErrorKind::EnvVar(name.to_string())))
        };

        let mut creds = Self::new(
            required("SF_CLIENT_ID")?,
            required("SF_CLIENT_SECRET")?,
            required("SF_USERNAME")?,
            required("SF_PASSWORD")?,
        );

        if let Some(url) = lookup("SF_LOGIN_URL") {
            creds = creds.with_login_url(url);
        }
        if let Some(version) = lookup("SF_API_VERSION") {
            creds = creds.with_api_version(version);
        }

        Ok(creds)
    }

    /// Authenticate against a non-production login URL.
    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = Some(url.into());
        self
    }

    /// Target a specific API version (e.g. "60.0").
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// The login URL, if overridden.
    pub fn login_url(&self) -> Option<&str> {
        self.login_url.as_deref()
    }

    /// The API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// The username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The four grant parameters.
    pub fn to_parameters(&self) -> AuthParameters {
        [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
    }

    /// A [`PasswordAuth`] configured for these credentials' login URL and API version.
    pub fn authenticator(&self) -> Result<PasswordAuth> {
        let mut auth = PasswordAuth::new().with_api_version(&self.api_version);
        if let Some(ref url) = self.login_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::new(ErrorKind::Config(format!(
                    "login URL must be http(s): {url}"
                ))));
            }
            auth = auth.with_endpoint(url);
        }
        Ok(auth)
    }
}
