use serde_json::{json, Value};
use sfrecord::rest::{FieldRule, RecordSchema, SalesforceRestClient, TypeMap};

pub const TOKEN: &str = "00Dxx0000000000!AQ0AQtoken";
pub const API: &str = "/services/data/v56.0";

pub const BOB: &str = "5003a00001IJpONAA1";
pub const LINDA: &str = "5003a00001IJpONAA2";
pub const PAUL: &str = "5003a00001IJpONAA3";
pub const TEAM: &str = "4003a00001IJpONAA1";

pub const NEXT_PAGE: &str = "/services/data/v56.0/query/01gD0000002HU6KIAW-2000";

/// Install a test subscriber once; `RUST_LOG` controls the output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A client pointed at the mock server, with the example types mapped.
pub fn client(server: &mockito::Server) -> SalesforceRestClient {
    init_tracing();
    SalesforceRestClient::new(server.url(), TOKEN)
        .expect("client")
        .with_api_version("56.0")
        .with_type_map(types())
}

pub fn example_schema() -> RecordSchema {
    RecordSchema::builder("Example")
        .field("Name", [FieldRule::Required, FieldRule::length(2, 100)])
        .build()
}

pub fn team_schema() -> RecordSchema {
    RecordSchema::builder("Team")
        .field("Name", [FieldRule::one_of(["Red", "Blue"])])
        .fields(["Manager", "Members"])
        .uneditable("Manager")
        .uneditable("Members")
        .build()
}

pub fn types() -> TypeMap {
    TypeMap::new()
        .with(example_schema())
        .and_then(|types| types.with(team_schema()))
        .expect("type map")
}

pub fn example(id: &str, name: &str) -> Value {
    json!({
        "attributes": {
            "type": "Example",
            "url": format!("{API}/sobjects/Example/{id}")
        },
        "Id": id,
        "Name": name
    })
}

pub fn page(records: Vec<Value>, total: u64, next: Option<&str>) -> Value {
    let mut body = json!({
        "totalSize": total,
        "done": next.is_none(),
        "records": records
    });
    if let Some(url) = next {
        body["nextRecordsUrl"] = json!(url);
    }
    body
}

pub fn team() -> Value {
    json!({
        "attributes": {
            "type": "Team",
            "url": format!("{API}/sobjects/Team/{TEAM}")
        },
        "Id": TEAM,
        "Name": "Blue",
        "Manager": example(BOB, "Bob"),
        "Members": page(
            vec![example(BOB, "Bob"), example(LINDA, "Linda"), example(PAUL, "Paul")],
            3,
            None,
        )
    })
}
