//! CRUD round trips through the HTTP transport.

use mockito::Matcher;
use serde_json::json;
use sfrecord::rest::{
    ErrorKind, Record, RemoteOperationError, SalesforceRestClient, UsageError, ValidationError,
};

use super::common::{client, example, types, API, BOB, TOKEN};

// ============================================================================
// Create
// ============================================================================

#[test]
fn test_create_assigns_returned_id() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", format!("{API}/sobjects/Example").as_str())
        .match_header("authorization", format!("OAuth {TOKEN}").as_str())
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"Name": "Bob"})))
        .with_status(201)
        .with_body(r#"{"id":"ID1","success":true,"errors":[]}"#)
        .create();

    let client = client(&server);
    let bob = Record::new("Example", [("Name", "Bob")]).unwrap();
    let created = client.create(&bob).unwrap();

    mock.assert();
    assert_eq!(created.id(), Some("ID1"));
    assert_eq!(created.get_str("Name"), Some("Bob"));
    assert_eq!(bob.id(), None);
}

#[test]
fn test_create_failure_carries_response_context() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", format!("{API}/sobjects/Example").as_str())
        .with_status(400)
        .with_body(
            json!([{
                "errorCode": "DUPLICATE_VALUE",
                "message": "duplicate value found: Name",
                "fields": ["Name"]
            }])
            .to_string(),
        )
        .create();

    let err = client(&server)
        .create(&Record::new("Example", [("Name", "Bob")]).unwrap())
        .unwrap_err();

    assert!(err.is_remote());
    let ctx = err.response_context().unwrap();
    assert_eq!(ctx.status, 400);
    assert_eq!(ctx.reason, "Bad Request");
    assert_eq!(ctx.error_code.as_deref(), Some("DUPLICATE_VALUE"));
    assert_eq!(ctx.error_message.as_deref(), Some("duplicate value found: Name"));
}

#[test]
fn test_invalid_field_value_is_rejected_at_construction() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create();

    let client = client(&server);
    let schema = client.type_map().resolve(Some("Example"));
    let err = Record::with_schema(schema, "Example", [("Name", "B")]).unwrap_err();

    assert!(matches!(
        err.kind,
        ErrorKind::Validation(ValidationError::BadCharacterLength { length: 1, .. })
    ));
    mock.assert();
}

// ============================================================================
// Get
// ============================================================================

#[test]
fn test_get_maps_record_type() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", format!("{API}/sobjects/Example/Id/{BOB}").as_str())
        .with_status(200)
        .with_body(example(BOB, "Bob").to_string())
        .create();

    let bob = client(&server).get("Example", BOB).unwrap().unwrap();

    mock.assert();
    assert_eq!(bob.schema().sobject_type(), Some("Example"));
    assert_eq!(bob.fields(), ["Id", "Name"]);
    assert_eq!(
        bob.metadata().url.as_deref(),
        Some("/services/data/v56.0/sobjects/Example/5003a00001IJpONAA1")
    );
}

#[test]
fn test_get_not_found() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", format!("{API}/sobjects/Example/Id/{BOB}").as_str())
        .with_status(404)
        .with_body(r#"[{"errorCode":"NOT_FOUND","message":"The requested resource does not exist"}]"#)
        .create();

    let err = client(&server).get("Example", BOB).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::Remote(RemoteOperationError::GetFailed(ref ctx)) if ctx.status == 404
    ));
}

// ============================================================================
// Update
// ============================================================================

#[test]
fn test_update_writes_editable_fields_and_refetches() {
    let mut server = mockito::Server::new();
    let patch = server
        .mock("PATCH", format!("{API}/sobjects/Example/Id/{BOB}").as_str())
        .match_body(Matcher::Json(json!({"Name": "Roberto"})))
        .with_status(204)
        .create();
    let get = server
        .mock("GET", format!("{API}/sobjects/Example/Id/{BOB}").as_str())
        .with_status(200)
        .with_body(example(BOB, "Roberto").to_string())
        .create();

    let client = client(&server);
    let schema = client.type_map().resolve(Some("Example"));
    let mut bob = Record::from_payload_with_schema(schema, &example(BOB, "Bob")).unwrap();
    bob.set_field("Name", "Roberto").unwrap();

    let updated = client.update_record(&bob).unwrap().unwrap();

    patch.assert();
    get.assert();
    assert_eq!(updated.get_str("Name"), Some("Roberto"));
}

// ============================================================================
// Delete
// ============================================================================

#[test]
fn test_delete_clears_id() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("DELETE", format!("{API}/sobjects/Example/Id/{BOB}").as_str())
        .with_status(204)
        .create();

    let bob = Record::from_payload(&example(BOB, "Bob")).unwrap();
    let deleted = client(&server).delete(&bob).unwrap();

    mock.assert();
    assert_eq!(deleted.id(), None);
    assert_eq!(bob.id(), Some(BOB));
}

#[test]
fn test_delete_with_empty_id_sends_nothing() {
    let mut server = mockito::Server::new();
    let mock = server.mock("DELETE", Matcher::Any).expect(0).create();

    let unsaved = Record::new("Example", [("Name", "Bob")]).unwrap();
    let err = client(&server).delete(&unsaved).unwrap_err();

    mock.assert();
    assert!(matches!(
        err.kind,
        ErrorKind::Usage(UsageError::EmptyId { ref sobject_type, ref id_field })
            if sobject_type == "Example" && id_field == "Id"
    ));
}

// ============================================================================
// Transport failures
// ============================================================================

#[test]
fn test_connection_failure_is_request_failed() {
    // Nothing listens on port 1
    let client = SalesforceRestClient::new("http://127.0.0.1:1", TOKEN)
        .unwrap()
        .with_api_version("56.0")
        .with_type_map(types());

    let err = client.get("Example", BOB).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::Remote(RemoteOperationError::RequestFailed { ref method, ref path })
            if method == "GET" && path == "/services/data/v56.0/sobjects/Example/Id/5003a00001IJpONAA1"
    ));
    assert!(err.response_context().is_none());
}
