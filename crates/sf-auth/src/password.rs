//! OAuth 2.0 username-password flow.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sfrecord_client::security::secret;
use sfrecord_client::{ClientConfig, SalesforceClient, SfHttpClient};
use tracing::{debug, info, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::{PRODUCTION_LOGIN_URL, TOKEN_PATH};

/// Named credential parameters (`client_id`, `username`, ...).
pub type AuthParameters = BTreeMap<String, String>;

/// Parameters the password grant cannot do without.
const REQUIRED_PARAMETERS: [&str; 4] = ["client_id", "client_secret", "username", "password"];

/// Parameters replaced by a digest before they appear in an error.
const SECRET_PARAMETERS: [&str; 2] = ["client_secret", "password"];

/// Produces an authenticated transport from credential parameters.
pub trait Authenticator {
    /// Exchange the parameters for an access token and return a client
    /// bound to the granted instance.
    fn authenticate(&self, parameters: &AuthParameters) -> Result<SalesforceClient>;
}

/// Username-password OAuth flow against a login endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use sfrecord_auth::{AuthParameters, Authenticator, PasswordAuth, SANDBOX_LOGIN_URL};
///
/// # fn main() -> Result<(), sfrecord_auth::Error> {
/// let mut parameters = AuthParameters::new();
/// parameters.insert("client_id".into(), "consumer-key".into());
/// parameters.insert("client_secret".into(), "consumer-secret".into());
/// parameters.insert("username".into(), "user@example.com".into());
/// parameters.insert("password".into(), "password+security-token".into());
///
/// let client = PasswordAuth::new()
///     .with_endpoint(SANDBOX_LOGIN_URL)
///     .authenticate(&parameters)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PasswordAuth {
    endpoint: String,
    config: ClientConfig,
}

impl Default for PasswordAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordAuth {
    /// Authenticate against the production login endpoint.
    pub fn new() -> Self {
        Self {
            endpoint: PRODUCTION_LOGIN_URL.to_string(),
            config: ClientConfig::default(),
        }
    }

    /// Override the login endpoint (sandbox, My Domain, test server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// HTTP configuration for both the token request and the returned client.
    ///
    /// The config's API version is the one the returned client targets.
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// API version the returned client targets.
    pub fn with_api_version(mut self, version: impl AsRef<str>) -> Self {
        self.config = self.config.with_api_version(version);
        self
    }

    /// The login endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn token_url(&self) -> String {
        format!("{}{}", self.endpoint, TOKEN_PATH)
    }
}

impl Authenticator for PasswordAuth {
    #[instrument(skip(self, parameters), fields(endpoint = %self.endpoint))]
    fn authenticate(&self, parameters: &AuthParameters) -> Result<SalesforceClient> {
        let missing: Vec<String> = REQUIRED_PARAMETERS
            .iter()
            .filter(|name| !parameters.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::new(ErrorKind::MissingParameters(missing)));
        }

        let mut form: Vec<(&str, &str)> = vec![("grant_type", "password")];
        form.extend(
            parameters
                .iter()
                .filter(|(name, _)| name.as_str() != "grant_type")
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );

        let http = SfHttpClient::new(self.config.clone())?;
        let request = http
            .post(self.token_url())
            .header("Accept", "application/json")
            .form(&form)?;

        debug!("Requesting password grant");
        let response = http.execute(&request)?;

        let token = match response.json::<TokenResponse>() {
            Ok(token) if !token.access_token.is_empty() && !token.instance_url.is_empty() => token,
            _ => {
                let message = response
                    .json::<OAuthErrorResponse>()
                    .ok()
                    .and_then(|err| err.error_description.or(err.error))
                    .map(|m| secret::sanitize_message(&m));
                info!(status = response.status(), "Password grant rejected");
                return Err(Error::new(ErrorKind::AuthenticationFailed {
                    status: response.status(),
                    reason: response.reason().to_string(),
                    message,
                    parameters: obfuscate(parameters),
                }));
            }
        };

        debug!(instance_url = %token.instance_url, "Password grant succeeded");
        let client = SalesforceClient::with_config(
            &token.instance_url,
            &token.access_token,
            self.config.clone(),
        )?;
        Ok(client)
    }
}

/// Replace secret parameter values with their SHA-256 digest.
pub(crate) fn obfuscate(parameters: &AuthParameters) -> AuthParameters {
    parameters
        .iter()
        .map(|(name, value)| {
            let value = if SECRET_PARAMETERS.contains(&name.as_str()) {
                secret::digest(value)
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}

/// Token response from the grant endpoint.
///
/// The access token is redacted in Debug output.
#[derive(Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Instance URL.
    pub instance_url: String,
    /// User ID URL.
    #[serde(default)]
    pub id: Option<String>,
    /// Token type (usually "Bearer").
    #[serde(default)]
    pub token_type: Option<String>,
    /// Issued at timestamp.
    #[serde(default)]
    pub issued_at: Option<String>,
    /// Signature for verification.
    #[serde(default)]
    pub signature: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("instance_url", &self.instance_url)
            .field("id", &self.id)
            .field("token_type", &self.token_type)
            .field("issued_at", &self.issued_at)
            .field("signature", &self.signature.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// OAuth error response.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn parameters() -> AuthParameters {
        [
            ("client_id", "your_client_id"),
            ("client_secret", "your_client_secret"),
            ("username", "your_username"),
            ("password", "your_password"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_default_endpoint() {
        let auth = PasswordAuth::new();
        assert_eq!(auth.endpoint(), "https://login.salesforce.com");
        assert_eq!(
            auth.token_url(),
            "https://login.salesforce.com/services/oauth2/token"
        );

        let auth = PasswordAuth::new().with_endpoint("https://test.salesforce.com/");
        assert_eq!(auth.endpoint(), "https://test.salesforce.com");
    }

    #[test]
    fn test_missing_parameters() {
        let mut params = parameters();
        params.remove("client_id");

        let err = PasswordAuth::new().authenticate(&params).unwrap_err();
        match err.kind {
            ErrorKind::MissingParameters(missing) => {
                assert_eq!(missing, vec!["client_id".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_successful_authentication() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/services/oauth2/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "password".into()),
                Matcher::UrlEncoded("client_id".into(), "your_client_id".into()),
                Matcher::UrlEncoded("username".into(), "your_username".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"access_token":"00Dxx!token","instance_url":"https://na1.salesforce.com","token_type":"Bearer"}"#,
            )
            .create();

        let client = PasswordAuth::new()
            .with_endpoint(server.url())
            .with_api_version("60.0")
            .authenticate(&parameters())
            .unwrap();

        mock.assert();
        assert_eq!(client.instance_url(), "https://na1.salesforce.com");
        assert_eq!(client.access_token(), "00Dxx!token");
        assert_eq!(
            sfrecord_client::Transport::api_version(&client),
            "60.0"
        );
    }

    #[test]
    fn test_failed_authentication_hashes_secrets() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/services/oauth2/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"authentication failure"}"#)
            .create();

        let err = PasswordAuth::new()
            .with_endpoint(server.url())
            .authenticate(&parameters())
            .unwrap_err();

        assert!(err.is_authentication_failed());
        match err.kind {
            ErrorKind::AuthenticationFailed {
                status,
                message,
                parameters,
                ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(message.as_deref(), Some("authentication failure"));
                assert_eq!(parameters["client_id"], "your_client_id");
                assert_eq!(parameters["password"], secret::digest("your_password"));
                assert_eq!(
                    parameters["client_secret"],
                    secret::digest("your_client_secret")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_response_without_instance_url_fails() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/services/oauth2/token")
            .with_status(200)
            .with_body(r#"{"access_token":"abc"}"#)
            .create();

        let err = PasswordAuth::new()
            .with_endpoint(server.url())
            .authenticate(&parameters())
            .unwrap_err();
        assert!(err.is_authentication_failed());
    }

    #[test]
    fn test_token_response_debug_redacts_token() {
        let token = TokenResponse {
            access_token: "secret_access_token".to_string(),
            instance_url: "https://na1.salesforce.com".to_string(),
            id: None,
            token_type: Some("Bearer".to_string()),
            issued_at: None,
            signature: Some("sig".to_string()),
        };
        let debug = format!("{:?}", token);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret_access_token"));
    }
}
