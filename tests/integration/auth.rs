//! Logging in with the password grant, then using the resulting client.

use mockito::Matcher;
use sfrecord::auth::{AuthParameters, PasswordAuth, PasswordCredentials};
use sfrecord::rest::{ErrorKind, SalesforceRestClient};

use super::common::{example, init_tracing, page, API, BOB};

fn parameters() -> AuthParameters {
    PasswordCredentials::new("client-id", "client-secret", "bob@example.com", "hunter2")
        .to_parameters()
}

#[test]
fn test_login_then_query() {
    init_tracing();
    let mut server = mockito::Server::new();
    let token = server
        .mock("POST", "/services/oauth2/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "password".into()),
            Matcher::UrlEncoded("client_id".into(), "client-id".into()),
            Matcher::UrlEncoded("username".into(), "bob@example.com".into()),
        ]))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "access_token": "session-token",
                "instance_url": server.url(),
                "token_type": "Bearer"
            })
            .to_string(),
        )
        .create();
    let query = server
        .mock("GET", format!("{API}/query").as_str())
        .match_query(Matcher::Any)
        .match_header("authorization", "OAuth session-token")
        .with_status(200)
        .with_body(page(vec![example(BOB, "Bob")], 1, None).to_string())
        .create();

    let auth = PasswordAuth::new()
        .with_endpoint(server.url())
        .with_api_version("56.0");
    let client = SalesforceRestClient::login(&auth, &parameters()).unwrap();

    assert_eq!(client.api_version(), "56.0");
    let bob = client
        .query("SELECT Id, Name FROM Example", &[])
        .unwrap()
        .first()
        .unwrap()
        .unwrap();

    token.assert();
    query.assert();
    assert_eq!(bob.id(), Some(BOB));
}

#[test]
fn test_login_with_missing_parameters() {
    let mut params = parameters();
    params.remove("password");

    let err = SalesforceRestClient::login(&PasswordAuth::new(), &params).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Auth(ref message) if message.contains("password")));
}

#[test]
fn test_login_failure_hides_secrets() {
    let mut server = mockito::Server::new();
    let _token = server
        .mock("POST", "/services/oauth2/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"authentication failure"}"#)
        .create();

    let auth = PasswordAuth::new().with_endpoint(server.url());
    let err = SalesforceRestClient::login(&auth, &parameters()).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Auth(_)));
    let rendered = format!("{err} {err:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(!rendered.contains("client-secret"));
}
