//! Record variants and the type registry.
//!
//! A [`RecordSchema`] describes one kind of record: an optional fixed
//! Salesforce type, the fields it declares (with their rules), and any
//! fields beyond the system ones that must never be written back. A
//! [`TypeMap`] maps Salesforce type names to schemas so record sets can
//! pick the right variant for each page.
//!
//! ```text
//!  TypeMap                     RecordSchema "Example"
//!  ┌──────────┬──────────┐     ┌───────────────────────────────┐
//!  │ Example  │  ───────────►  │ Id    [salesforce id]         │
//!  │ Team     │  ──┐     │     │ Name  [required, 2..=100]     │
//!  └──────────┴─────│────┘     └───────────────────────────────┘
//!                   └──────►   RecordSchema "Team" ...
//!  (unmapped)  ──────────►     RecordSchema::generic()  (Id + payload keys)
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, UsageError, ValidationError};
use crate::record::FieldValue;
use crate::validator;

/// The identifier field every record has.
pub const ID_FIELD: &str = "Id";

/// System-managed fields never sent on create or update.
pub const UNEDITABLE_FIELDS: [&str; 7] = [
    "Id",
    "LastModifiedDate",
    "IsDeleted",
    "CreatedById",
    "CreatedDate",
    "LastModifiedById",
    "SystemModstamp",
];

type CustomRule = dyn Fn(&FieldValue) -> std::result::Result<(), ValidationError> + Send + Sync;

/// One validation rule attached to a field.
///
/// Rules other than [`FieldRule::Required`] only look at values that are
/// set; an unset field passes them.
#[derive(Clone)]
pub enum FieldRule {
    /// The value must be set.
    Required,
    /// Text length in characters.
    CharacterLength {
        min: Option<usize>,
        max: Option<usize>,
    },
    /// Text length in bytes.
    ByteLength {
        min: Option<usize>,
        max: Option<usize>,
    },
    /// Text must be one of the listed values.
    OneOf(Vec<String>),
    /// Text must be an 18-character Salesforce id.
    SalesforceId,
    /// Arbitrary check.
    Custom(Arc<CustomRule>),
}

impl FieldRule {
    /// Character length between `min` and `max`, inclusive.
    pub fn length(min: usize, max: usize) -> Self {
        FieldRule::CharacterLength {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Value must be one of `values`.
    pub fn one_of<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        FieldRule::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Wrap a closure as a rule.
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&FieldValue) -> std::result::Result<(), ValidationError> + Send + Sync + 'static,
    {
        FieldRule::Custom(Arc::new(check))
    }

    fn check(&self, field: &str, value: &FieldValue) -> std::result::Result<(), ValidationError> {
        if let FieldRule::Required = self {
            return validator::not_null(value.as_option());
        }
        if let FieldRule::Custom(check) = self {
            return check(value);
        }
        if value.is_null() {
            return Ok(());
        }

        let text = value
            .as_str()
            .ok_or_else(|| ValidationError::Invalid(format!("{field} must be text")))?;
        match self {
            FieldRule::CharacterLength { min, max } => validator::character_length(text, *min, *max),
            FieldRule::ByteLength { min, max } => validator::byte_length(text, *min, *max),
            FieldRule::OneOf(allowed) => validator::enumeration(text, allowed),
            FieldRule::SalesforceId => validator::salesforce_id(text),
            FieldRule::Required | FieldRule::Custom(_) => Ok(()),
        }
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRule::Required => f.write_str("Required"),
            FieldRule::CharacterLength { min, max } => f
                .debug_struct("CharacterLength")
                .field("min", min)
                .field("max", max)
                .finish(),
            FieldRule::ByteLength { min, max } => f
                .debug_struct("ByteLength")
                .field("min", min)
                .field("max", max)
                .finish(),
            FieldRule::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
            FieldRule::SalesforceId => f.write_str("SalesforceId"),
            FieldRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A declared field and its rules.
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: String,
    rules: Vec<FieldRule>,
}

impl FieldDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}

/// Definition of one record variant.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    sobject_type: Option<String>,
    fields: Vec<FieldDef>,
    uneditable: Vec<String>,
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self::generic()
    }
}

impl RecordSchema {
    /// The schema used for unmapped types: only `Id` is declared, so records
    /// take their field list from the payload.
    pub fn generic() -> Self {
        Self {
            sobject_type: None,
            fields: vec![id_field_def()],
            uneditable: Vec::new(),
        }
    }

    /// Start a schema bound to one Salesforce type.
    pub fn builder(sobject_type: impl Into<String>) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            schema: Self {
                sobject_type: Some(sobject_type.into()),
                ..Self::generic()
            },
        }
    }

    /// Start a schema that accepts any Salesforce type.
    pub fn untyped() -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            schema: Self::generic(),
        }
    }

    /// The Salesforce type this schema requires, if any.
    pub fn sobject_type(&self) -> Option<&str> {
        self.sobject_type.as_deref()
    }

    /// Declared fields, `Id` first.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Declared field names, `Id` first.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// True when nothing beyond `Id` is declared; records then also accept
    /// every key of their payload as a field.
    pub fn is_open(&self) -> bool {
        self.fields.len() == 1
    }

    /// Whether `field` is excluded from write payloads.
    pub fn is_uneditable(&self, field: &str) -> bool {
        UNEDITABLE_FIELDS.contains(&field) || self.uneditable.iter().any(|f| f == field)
    }

    /// Fail if a record of `record_type` cannot use this schema.
    pub fn check_type(&self, record_type: &str) -> Result<()> {
        match self.sobject_type {
            Some(ref expected) if !expected.is_empty() && expected != record_type => {
                Err(UsageError::BadRecordType {
                    expected: expected.clone(),
                    record_type: record_type.to_string(),
                }
                .into())
            }
            _ => Ok(()),
        }
    }

    /// Run the rules declared for `field` against `value`.
    ///
    /// `Id` is always checked as a Salesforce id when set. Undeclared
    /// fields have no rules.
    pub fn validate_field(
        &self,
        field: &str,
        value: &FieldValue,
    ) -> std::result::Result<(), ValidationError> {
        if field == ID_FIELD && !value.is_null() {
            let text = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_json().to_string());
            validator::salesforce_id(&text)?;
        }

        if let Some(def) = self.fields.iter().find(|f| f.name == field) {
            for rule in &def.rules {
                rule.check(field, value)?;
            }
        }
        Ok(())
    }
}

fn id_field_def() -> FieldDef {
    FieldDef {
        name: ID_FIELD.to_string(),
        rules: Vec::new(),
    }
}

/// Builder for [`RecordSchema`].
///
/// ```rust
/// use sfrecord_rest::{FieldRule, RecordSchema};
///
/// let example = RecordSchema::builder("Example")
///     .field("Name", [FieldRule::Required, FieldRule::length(2, 100)])
///     .build();
///
/// assert_eq!(example.field_names().collect::<Vec<_>>(), ["Id", "Name"]);
/// ```
#[derive(Debug)]
pub struct RecordSchemaBuilder {
    schema: RecordSchema,
}

impl RecordSchemaBuilder {
    /// Declare a field with its rules. Declaring `Id` adds rules to it.
    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = FieldRule>) -> Self {
        let name = name.into();
        match self.schema.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.rules.extend(rules),
            None => self.schema.fields.push(FieldDef {
                name,
                rules: rules.into_iter().collect(),
            }),
        }
        self
    }

    /// Declare several fields without rules.
    pub fn fields<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        for name in names {
            self = self.field(name, []);
        }
        self
    }

    /// Exclude a field from write payloads (e.g. nested records or renamed
    /// fields), in addition to the system fields.
    pub fn uneditable(mut self, name: impl Into<String>) -> Self {
        self.schema.uneditable.push(name.into());
        self
    }

    pub fn build(self) -> RecordSchema {
        self.schema
    }
}

/// Registry of Salesforce type name to record schema.
#[derive(Debug, Clone, Default)]
pub struct TypeMap {
    schemas: HashMap<String, Arc<RecordSchema>>,
    generic: Arc<RecordSchema>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `sobject_type` to `schema`.
    ///
    /// Fails with `BadTypeMapping` if the schema is bound to a different
    /// type or the type name is empty.
    pub fn register(
        &mut self,
        sobject_type: impl Into<String>,
        schema: impl Into<Arc<RecordSchema>>,
    ) -> Result<()> {
        let sobject_type = sobject_type.into();
        let schema = schema.into();

        let conflicting = schema
            .sobject_type()
            .is_some_and(|declared| declared != sobject_type);
        if sobject_type.is_empty() || conflicting {
            return Err(UsageError::BadTypeMapping {
                sobject_type,
                schema_type: schema.sobject_type().unwrap_or_default().to_string(),
            }
            .into());
        }

        self.schemas.insert(sobject_type, schema);
        Ok(())
    }

    /// Register a schema under its own type.
    pub fn with(mut self, schema: RecordSchema) -> Result<Self> {
        let sobject_type = schema.sobject_type().unwrap_or_default().to_string();
        self.register(sobject_type, schema)?;
        Ok(self)
    }

    /// The schema mapped to `sobject_type`, if any.
    pub fn get(&self, sobject_type: &str) -> Option<&Arc<RecordSchema>> {
        self.schemas.get(sobject_type)
    }

    /// The schema for `sobject_type`, falling back to the generic one.
    pub fn resolve(&self, sobject_type: Option<&str>) -> Arc<RecordSchema> {
        sobject_type
            .and_then(|t| self.schemas.get(t))
            .unwrap_or(&self.generic)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
