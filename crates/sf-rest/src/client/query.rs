use bytes::Bytes;
use serde_json::Value;
use sfrecord_client::{RequestBuilder, RequestMethod};
use tracing::instrument;

use super::expect_status;
use crate::error::{RemoteOperationError, Result};
use crate::query_builder::prepare;
use crate::result::RecordSet;

impl super::SalesforceRestClient {
    /// Execute a SOQL query built from a template.
    ///
    /// Each `{name}` placeholder is replaced by the quoted parameter value
    /// (see [`prepare`](crate::query_builder::prepare)), so parameters never
    /// need escaping by hand. The returned set follows `nextRecordsUrl` as
    /// it is iterated.
    ///
    /// ```rust,no_run
    /// # use serde_json::json;
    /// # fn run(client: &sfrecord_rest::SalesforceRestClient) -> Result<(), sfrecord_rest::Error> {
    /// let contacts = client.query(
    ///     "SELECT Id, Name FROM Contact WHERE LastName = {last_name}",
    ///     &[("last_name", json!("O'Brien"))],
    /// )?;
    /// for contact in &contacts {
    ///     println!("{:?}", contact?.id());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, parameters))]
    pub fn query(&self, template: &str, parameters: &[(&str, Value)]) -> Result<RecordSet> {
        let soql = prepare(template, parameters)?;
        let request = self.request(RequestMethod::Get, "/query").query("q", soql);

        let response = self.execute(request)?;
        expect_status(&response, &[200], RemoteOperationError::GetFailed)?;
        self.result_from(&response)
    }

    /// Fetch the raw body at `path` (e.g. an attachment's `Body` url).
    ///
    /// The path is used as given, without the API prefix, and the status is
    /// not checked.
    #[instrument(skip(self))]
    pub fn stream(&self, path: &str) -> Result<Bytes> {
        let response = self.execute(RequestBuilder::new(RequestMethod::Get, path))?;
        Ok(response.body().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::client;
    use crate::error::{ErrorKind, RemoteOperationError, UsageError};
    use serde_json::json;

    const BOB: &str = "5003a00001IJpONAA1";

    #[test]
    fn test_query() {
        let (transport, client) = client();
        transport.respond(
            200,
            json!({
                "totalSize": 1,
                "done": true,
                "records": [{"attributes": {"type": "Example"}, "Id": BOB, "Name": "Bob"}]
            })
            .to_string(),
        );

        let result = client
            .query(
                "SELECT Id, Name\nFROM Example\nWHERE Name = {name}",
                &[("name", json!("O'Brien"))],
            )
            .unwrap();
        assert_eq!(result.to_list().unwrap().len(), 1);

        let request = &transport.requests()[0];
        assert_eq!(request.url(), "/services/data/v56.0/query");
        assert_eq!(
            request.query_param("q"),
            Some(r"SELECT Id, NameFROM ExampleWHERE Name = 'O\'Brien'")
        );
    }

    #[test]
    fn test_query_follows_next_records_url() {
        let (transport, client) = client();
        let next = "/services/data/v56.0/query/01gD0000002HU6KIAW-2000";
        transport
            .respond(
                200,
                json!({
                    "totalSize": 2,
                    "done": false,
                    "nextRecordsUrl": next,
                    "records": [{"attributes": {"type": "Example"}, "Id": BOB}]
                })
                .to_string(),
            )
            .respond(
                200,
                json!({
                    "totalSize": 2,
                    "done": true,
                    "records": [{"attributes": {"type": "Example"}, "Id": "5003a00001IJpONAA2"}]
                })
                .to_string(),
            );

        let records = client.query("SELECT Id FROM Example", &[]).unwrap().to_list().unwrap();
        assert_eq!(records.len(), 2);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].url(), next);
    }

    #[test]
    fn test_query_bad_parameter_sends_nothing() {
        let (transport, client) = client();
        let err = client
            .query("SELECT Id FROM Example WHERE Id IN {ids}", &[("ids", json!([BOB]))])
            .unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::Usage(UsageError::UnsupportedDatatype { .. })
        ));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_query_failed() {
        let (transport, client) = client();
        transport.respond(
            400,
            r#"[{"errorCode":"MALFORMED_QUERY","message":"unexpected token: FORM"}]"#,
        );

        let err = client.query("SELECT Id FORM Example", &[]).unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::Remote(RemoteOperationError::GetFailed(_))
        ));
    }

    #[test]
    fn test_stream() {
        let (transport, client) = client();
        transport.respond(200, "%PDF-1.4").respond(404, "missing");

        let path = "/services/data/v56.0/sobjects/Attachment/00P3a00001IJpONAA1/Body";
        assert_eq!(&client.stream(path).unwrap()[..], b"%PDF-1.4");
        assert_eq!(transport.requests()[0].url(), path);

        // no status check
        assert_eq!(&client.stream(path).unwrap()[..], b"missing");
    }

    #[test]
    fn test_stream_transport_failure() {
        let (transport, client) = client();
        transport.fail();

        let err = client.stream("/x").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::Remote(RemoteOperationError::RequestFailed { ref path, .. }) if path == "/x"
        ));
    }
}
