//! Queries, pagination and nested results through the HTTP transport.

use mockito::Matcher;
use serde_json::json;
use sfrecord::rest::{ErrorKind, FieldValue, Record, ResultError};

use super::common::{client, example, page, team, API, BOB, LINDA, NEXT_PAGE, PAUL, TEAM};

fn names(records: &[Record]) -> Vec<&str> {
    records.iter().filter_map(|r| r.get_str("Name")).collect()
}

#[test]
fn test_query_sends_prepared_soql() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", format!("{API}/query").as_str())
        .match_query(Matcher::UrlEncoded(
            "q".into(),
            r"SELECT Id, Name FROM Example WHERE Name = 'O\'Brien' AND IsDeleted = false".into(),
        ))
        .with_status(200)
        .with_body(page(vec![example(BOB, "O'Brien")], 1, None).to_string())
        .create();

    let result = client(&server)
        .query(
            "SELECT Id, Name\n FROM Example\n WHERE Name = {name} AND IsDeleted = {deleted}",
            &[("name", json!("O'Brien")), ("deleted", json!(false))],
        )
        .unwrap();

    mock.assert();
    assert_eq!(result.total_size(), 1);
    assert_eq!(result.first().unwrap().unwrap().get_str("Name"), Some("O'Brien"));
}

#[test]
fn test_pagination_is_transparent_and_cached() {
    let mut server = mockito::Server::new();
    let first = server
        .mock("GET", format!("{API}/query").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            page(vec![example(BOB, "Bob"), example(LINDA, "Linda")], 3, Some(NEXT_PAGE)).to_string(),
        )
        .expect(1)
        .create();
    let second = server
        .mock("GET", NEXT_PAGE)
        .with_status(200)
        .with_body(page(vec![example(PAUL, "Paul")], 3, None).to_string())
        .expect(1)
        .create();

    let result = client(&server).query("SELECT Id, Name FROM Example", &[]).unwrap();
    assert!(!result.done());

    let first_pass = result.to_list().unwrap();
    assert_eq!(names(&first_pass), ["Bob", "Linda", "Paul"]);

    // replayed from cache, no further requests
    let second_pass = result.to_list().unwrap();
    assert_eq!(first_pass, second_pass);

    first.assert();
    second.assert();
}

#[test]
fn test_first_record_fetches_one_page() {
    let mut server = mockito::Server::new();
    let _first = server
        .mock("GET", format!("{API}/query").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(page(vec![example(BOB, "Bob")], 2, Some(NEXT_PAGE)).to_string())
        .create();
    let second = server.mock("GET", NEXT_PAGE).expect(0).create();

    let result = client(&server).query("SELECT Id FROM Example", &[]).unwrap();
    assert_eq!(result.first().unwrap().unwrap().id(), Some(BOB));

    second.assert();
}

#[test]
fn test_nested_records_and_record_sets() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", format!("{API}/sobjects/Team/Id/{TEAM}").as_str())
        .with_status(200)
        .with_body(team().to_string())
        .create();

    let team = client(&server).get("Team", TEAM).unwrap().unwrap();
    assert_eq!(team.schema().sobject_type(), Some("Team"));
    assert_eq!(team.get_str("Name"), Some("Blue"));

    let manager = team.get("Manager").and_then(FieldValue::as_record).unwrap();
    assert_eq!(manager.id(), Some(BOB));
    assert_eq!(manager.schema().sobject_type(), Some("Example"));

    let members = team
        .get("Members")
        .and_then(FieldValue::as_record_set)
        .unwrap();
    assert_eq!(members.total_size(), 3);
    let members = members.to_list().unwrap();
    assert_eq!(names(&members), ["Bob", "Linda", "Paul"]);
    assert_eq!(members[0], *manager);

    // related records are never written back
    assert_eq!(
        serde_json::Value::Object(team.to_map(true)),
        json!({"Name": "Blue"})
    );
}

#[test]
fn test_unparsable_record_is_reported_and_not_cached() {
    let mut server = mockito::Server::new();
    let broken = json!({"Id": LINDA, "Name": "Linda"});
    let _mock = server
        .mock("GET", format!("{API}/query").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(page(vec![example(BOB, "Bob"), broken.clone()], 2, None).to_string())
        .create();

    let result = client(&server).query("SELECT Id, Name FROM Example", &[]).unwrap();
    let err = result.to_list().unwrap_err();

    assert!(matches!(
        err.kind,
        ErrorKind::Result(ResultError::UnparsableRecord { ref record, .. }) if *record == broken
    ));
    assert!(!result.is_cached());
}

#[test]
fn test_malformed_body_is_unparsable_response() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", format!("{API}/query").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create();

    let err = client(&server).query("SELECT Id FROM Example", &[]).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::Result(ResultError::UnparsableResponse { status: 200 })
    ));
}

#[test]
fn test_stream_returns_raw_body() {
    let mut server = mockito::Server::new();
    let path = format!("{API}/sobjects/Attachment/00P3a00001IJpONAA1/Body");
    let mock = server
        .mock("GET", path.as_str())
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body(b"%PDF-1.4 binary")
        .create();

    let body = client(&server).stream(&path).unwrap();

    mock.assert();
    assert_eq!(&body[..], b"%PDF-1.4 binary");
}
