use serde_json::Value;
use sfrecord_client::security::url::encode_param;
use sfrecord_client::RequestMethod;
use tracing::instrument;

use super::expect_status;
use crate::error::{RemoteOperationError, Result, UsageError};
use crate::record::{FieldValue, Record};
use crate::result::RecordSet;
use crate::schema::ID_FIELD;

impl super::SalesforceRestClient {
    /// Create a record.
    ///
    /// Sends the record's editable, set fields and returns a copy carrying
    /// the id Salesforce assigned. The input record is not changed.
    #[instrument(skip(self, record), fields(sobject = %record.sobject_type()))]
    pub fn create(&self, record: &Record) -> Result<Record> {
        let path = format!("/sobjects/{}", encode_param(record.sobject_type()));
        let request = self
            .request(RequestMethod::Post, &path)
            .json_value(Value::Object(record.to_map(true)));

        let response = self.execute(request)?;
        expect_status(&response, &[201], RemoteOperationError::CreateFailed)?;

        let result = self.result_from(&response)?;
        let mut created = record.clone();
        created.assign_id(result.last_id());
        Ok(created)
    }

    /// Get a record by its Salesforce id.
    pub fn get(&self, sobject_type: &str, id: &str) -> Result<Option<Record>> {
        self.get_by_external_id(sobject_type, ID_FIELD, id)?.first()
    }

    /// Get records by the value of an external id field.
    #[instrument(skip(self))]
    pub fn get_by_external_id(
        &self,
        sobject_type: &str,
        id_field: &str,
        id: &str,
    ) -> Result<RecordSet> {
        let response = self.execute(
            self.request(RequestMethod::Get, &record_path(sobject_type, id_field, id)),
        )?;
        expect_status(&response, &[200], RemoteOperationError::GetFailed)?;
        self.result_from(&response)
    }

    /// Update a record, then fetch it again.
    ///
    /// The record is addressed by `id_field`, which must be one of its
    /// fields. `id` defaults to the value of that field. The write body
    /// holds the record's editable, set fields.
    ///
    /// Both 200 and 204 count as success. Salesforce answers a PATCH with
    /// 204 No Content; any other status is `UpdateFailed`.
    #[instrument(skip(self, record), fields(sobject = %record.sobject_type()))]
    pub fn update(
        &self,
        record: &Record,
        id_field: &str,
        id: Option<&str>,
    ) -> Result<Option<Record>> {
        if !record.has_field(id_field) {
            return Err(UsageError::NoSuchField {
                sobject_type: record.sobject_type().to_string(),
                field: id_field.to_string(),
            }
            .into());
        }

        let id = match id {
            Some(id) => Some(id.to_string()),
            None => record.get(id_field).and_then(id_text),
        }
        .filter(|id| !id.is_empty())
        .ok_or_else(|| UsageError::EmptyId {
            sobject_type: record.sobject_type().to_string(),
            id_field: id_field.to_string(),
        })?;

        let path = record_path(record.sobject_type(), id_field, &id);
        let request = self
            .request(RequestMethod::Patch, &path)
            .json_value(Value::Object(record.to_map(true)));

        let response = self.execute(request)?;
        expect_status(&response, &[200, 204], RemoteOperationError::UpdateFailed)?;

        match record.id() {
            Some(record_id) => self.get(record.sobject_type(), record_id),
            None => self
                .get_by_external_id(record.sobject_type(), id_field, &id)?
                .first(),
        }
    }

    /// Update a record addressed by its own `Id`.
    pub fn update_record(&self, record: &Record) -> Result<Option<Record>> {
        self.update(record, ID_FIELD, None)
    }

    /// Delete a record.
    ///
    /// Fails with `EmptyId` before sending anything if the record has no id.
    /// Returns a copy with the id cleared.
    #[instrument(skip(self, record), fields(sobject = %record.sobject_type()))]
    pub fn delete(&self, record: &Record) -> Result<Record> {
        let id = record
            .id()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| UsageError::EmptyId {
                sobject_type: record.sobject_type().to_string(),
                id_field: ID_FIELD.to_string(),
            })?;

        self.delete_by_external_id(record.sobject_type(), ID_FIELD, id)?;

        let mut deleted = record.clone();
        deleted.assign_id(None);
        Ok(deleted)
    }

    /// Delete a record by the value of an external id field.
    #[instrument(skip(self))]
    pub fn delete_by_external_id(
        &self,
        sobject_type: &str,
        id_field: &str,
        id: &str,
    ) -> Result<RecordSet> {
        let response = self.execute(
            self.request(RequestMethod::Delete, &record_path(sobject_type, id_field, id)),
        )?;
        expect_status(&response, &[204], RemoteOperationError::DeleteFailed)?;
        self.result_from(&response)
    }
}

fn record_path(sobject_type: &str, id_field: &str, id: &str) -> String {
    format!(
        "/sobjects/{}/{}/{}",
        encode_param(sobject_type),
        encode_param(id_field),
        encode_param(id)
    )
}

fn id_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::String(s) => Some(s.clone()),
        FieldValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
