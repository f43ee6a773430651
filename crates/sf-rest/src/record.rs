//! The record model.
//!
//! A [`Record`] is one Salesforce object instance: a type name, an ordered
//! field list fixed at construction, the values currently set, and the
//! metadata the API reported alongside it. Values are [`FieldValue`]s, which
//! may themselves hold nested records or record sets.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, ResultError, UsageError};
use crate::result::RecordSet;
use crate::schema::{RecordSchema, ID_FIELD};

// ============================================================================
// Field values
// ============================================================================

/// A single field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// A related record (e.g. `Account` on a `Contact`).
    Record(Box<Record>),
    /// A related list (e.g. `Contacts` on an `Account`).
    RecordSet(RecordSet),
    /// Compound values such as addresses or geolocations.
    Json(Value),
}

impl FieldValue {
    /// Convert a decoded JSON value without materializing nested records.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => FieldValue::Number(n),
            Value::String(s) => FieldValue::String(s),
            other => FieldValue::Json(other),
        }
    }

    /// Render as JSON. Nested records become a map of all their fields; nested
    /// record sets become their raw page body.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Number(n) => Value::Number(n.clone()),
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Record(record) => Value::Object(record.to_map(false)),
            FieldValue::RecordSet(set) => set.body().clone(),
            FieldValue::Json(value) => value.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// `None` for null, otherwise `Some(self)`.
    pub fn as_option(&self) -> Option<&FieldValue> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_set(&self) -> Option<&RecordSet> {
        match self {
            FieldValue::RecordSet(set) => Some(set),
            _ => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<f64> for FieldValue {
    /// Non-finite floats become `Null`.
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(FieldValue::Number)
            .unwrap_or(FieldValue::Null)
    }
}

impl From<Record> for FieldValue {
    fn from(value: Record) -> Self {
        FieldValue::Record(Box::new(value))
    }
}

impl From<RecordSet> for FieldValue {
    fn from(value: RecordSet) -> Self {
        FieldValue::RecordSet(value)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::from_json(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// What the API said about a record beyond its fields.
///
/// Built from the record's `attributes` merged over its audit fields; any
/// part may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RecordMetadata {
    #[serde(rename = "type", default)]
    pub sobject_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "CreatedById", default)]
    pub created_by_id: Option<String>,
    #[serde(rename = "CreatedDate", default)]
    pub created_date: Option<String>,
    #[serde(rename = "SystemModstamp", default)]
    pub system_modstamp: Option<String>,
    #[serde(rename = "LastModifiedDate", default)]
    pub last_modified_date: Option<String>,
    #[serde(rename = "LastModifiedById", default)]
    pub last_modified_by_id: Option<String>,
    #[serde(rename = "IsDeleted", default)]
    pub is_deleted: Option<bool>,
}

const AUDIT_FIELDS: [&str; 6] = [
    "CreatedById",
    "CreatedDate",
    "SystemModstamp",
    "LastModifiedDate",
    "LastModifiedById",
    "IsDeleted",
];

impl RecordMetadata {
    /// Read metadata from a raw record payload.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        let mut merged = Map::new();
        for field in AUDIT_FIELDS {
            if let Some(value) = payload.get(field) {
                merged.insert(field.to_string(), value.clone());
            }
        }
        if let Some(Value::Object(attributes)) = payload.get("attributes") {
            for (key, value) in attributes {
                merged.insert(key.clone(), value.clone());
            }
        }

        // Mistyped entries are dropped one at a time rather than losing the rest.
        let text = |key: &str| merged.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            sobject_type: text("type"),
            url: text("url"),
            created_by_id: text("CreatedById"),
            created_date: text("CreatedDate"),
            system_modstamp: text("SystemModstamp"),
            last_modified_date: text("LastModifiedDate"),
            last_modified_by_id: text("LastModifiedById"),
            is_deleted: merged.get("IsDeleted").and_then(Value::as_bool),
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_date.as_deref())
    }

    pub fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.last_modified_date.as_deref())
    }

    pub fn system_modstamp_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.system_modstamp.as_deref())
    }
}

/// Salesforce writes `2024-01-15T10:30:00.000+0000`; RFC 3339 is accepted too.
fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?;
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ============================================================================
// Record
// ============================================================================

/// One Salesforce object instance.
///
/// Cloning produces an independent copy; nested records and record sets are
/// cloned along with it.
#[derive(Debug, Clone)]
pub struct Record {
    sobject_type: String,
    schema: Arc<RecordSchema>,
    fields: Vec<String>,
    values: HashMap<String, FieldValue>,
    metadata: RecordMetadata,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.sobject_type == other.sobject_type
            && self.fields == other.fields
            && self.values == other.values
            && self.metadata == other.metadata
    }
}

impl Record {
    /// Create a record of the generic variant.
    ///
    /// The field list is `Id` followed by the given field names.
    ///
    /// ```rust
    /// use sfrecord_rest::Record;
    ///
    /// let bob = Record::new("Contact", [("LastName", "Bob")])?;
    /// assert_eq!(bob.get_str("LastName"), Some("Bob"));
    /// assert_eq!(bob.id(), None);
    /// # Ok::<(), sfrecord_rest::Error>(())
    /// ```
    pub fn new<K, V>(
        sobject_type: impl Into<String>,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self::with_schema(Arc::new(RecordSchema::generic()), sobject_type, fields)
    }

    /// Create a record of a specific variant.
    ///
    /// Fails with `BadRecordType` if the schema is bound to another type.
    /// Null values are skipped; every other value is assigned through
    /// [`Record::set_field`], so it must pass validation.
    pub fn with_schema<K, V>(
        schema: Arc<RecordSchema>,
        sobject_type: impl Into<String>,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let sobject_type = sobject_type.into();
        schema.check_type(&sobject_type)?;

        let input: Vec<(String, FieldValue)> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut names: Vec<String> = schema.field_names().map(str::to_string).collect();
        if schema.is_open() {
            for (name, _) in &input {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }

        let mut record = Self {
            sobject_type,
            schema,
            fields: names,
            values: HashMap::new(),
            metadata: RecordMetadata::default(),
        };

        for (name, value) in input {
            if value.is_null() || !record.fields.contains(&name) {
                continue;
            }
            record.set_field(&name, value)?;
        }

        Ok(record)
    }

    /// Build a generic record from a raw API record payload.
    ///
    /// Nested values are kept as plain JSON; [`RecordSet`] iteration is what
    /// materializes related records.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        Self::from_payload_with_schema(Arc::new(RecordSchema::generic()), payload)
    }

    /// Build a record of a specific variant from a raw API record payload.
    pub fn from_payload_with_schema(schema: Arc<RecordSchema>, payload: &Value) -> Result<Self> {
        let Some(map) = payload.as_object() else {
            return Err(ResultError::NoType { record_id: None }.into());
        };
        let fields = map
            .iter()
            .filter(|(name, _)| name.as_str() != "attributes")
            .map(|(name, value)| (name.clone(), FieldValue::from_json(value.clone())))
            .collect();
        Self::from_parts(schema, map, fields)
    }

    /// Build a record from a raw payload whose field values have already
    /// been converted.
    pub(crate) fn from_parts(
        schema: Arc<RecordSchema>,
        payload: &Map<String, Value>,
        fields: Vec<(String, FieldValue)>,
    ) -> Result<Self> {
        let sobject_type = payload
            .get("attributes")
            .and_then(|a| a.get("type"))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ResultError::NoType {
                record_id: payload.get(ID_FIELD).and_then(Value::as_str).map(str::to_string),
            })?;

        let mut record = Self::with_schema(schema, sobject_type, fields)?;
        record.metadata = RecordMetadata::from_payload(payload);
        Ok(record)
    }

    /// The Salesforce type name.
    pub fn sobject_type(&self) -> &str {
        &self.sobject_type
    }

    /// The variant this record was built with.
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Recognized field names, in order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// API metadata (type, url, audit fields).
    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    /// The value of a field, if set.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// The value of a text field, if set.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_str)
    }

    /// Whether a field holds a non-null value.
    pub fn is_set(&self, field: &str) -> bool {
        self.values.get(field).is_some_and(|v| !v.is_null())
    }

    /// The record id, if set.
    pub fn id(&self) -> Option<&str> {
        self.get_str(ID_FIELD)
    }

    /// Assign a field.
    ///
    /// Fails with `NoSuchField` for names outside the field list, or with a
    /// validation error if the schema rejects the value. A rejected value is
    /// not kept.
    pub fn set_field(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<&mut Self> {
        if !self.has_field(field) {
            return Err(UsageError::NoSuchField {
                sobject_type: self.sobject_type.clone(),
                field: field.to_string(),
            }
            .into());
        }

        let value = value.into();
        if let Err(err) = self.schema.validate_field(field, &value) {
            debug!(sobject = %self.sobject_type, field, error = %err, "Rejected field value");
            return Err(err.into());
        }

        self.values.insert(field.to_string(), value);
        Ok(self)
    }

    /// Clear a field without validation.
    pub fn unset_field(&mut self, field: &str) -> Result<&mut Self> {
        if !self.has_field(field) {
            return Err(UsageError::NoSuchField {
                sobject_type: self.sobject_type.clone(),
                field: field.to_string(),
            }
            .into());
        }
        self.values.remove(field);
        Ok(self)
    }

    /// Set or clear the id as assigned by Salesforce, without validation.
    pub(crate) fn assign_id(&mut self, id: Option<&str>) {
        match id {
            Some(id) => self.values.insert(ID_FIELD.to_string(), FieldValue::from(id)),
            None => self.values.remove(ID_FIELD),
        };
    }

    /// Fields as a JSON map.
    ///
    /// With `for_edit`, unset fields and uneditable fields (the id, audit
    /// fields and any the schema marks) are left out. Otherwise every field
    /// is present, `null` when unset.
    pub fn to_map(&self, for_edit: bool) -> Map<String, Value> {
        self.fields_for(for_edit)
            .map(|field| {
                let value = self.values.get(field).map(FieldValue::to_json).unwrap_or(Value::Null);
                (field.to_string(), value)
            })
            .collect()
    }

    /// Re-run field validation over the fields [`Record::to_map`] would emit.
    pub fn validate(&self, for_edit: bool) -> Result<()> {
        for field in self.fields_for(for_edit) {
            let value = self.values.get(field).cloned().unwrap_or_default();
            self.schema.validate_field(field, &value)?;
        }
        Ok(())
    }

    fn fields_for(&self, for_edit: bool) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str).filter(move |field| {
            !for_edit || (self.is_set(field) && !self.schema.is_uneditable(field))
        })
    }
}
