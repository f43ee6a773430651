//! # sf-rest
//!
//! Salesforce REST API records: a typed record model, lazily paginated
//! record sets, SOQL templating and a CRUD client.
//!
//! ## Features
//!
//! - **Records** - Dynamically fielded [`Record`]s with per-type schemas and validation
//! - **Record sets** - Lazy, cached iteration that follows `nextRecordsUrl` transparently
//! - **Nested results** - Related records and related lists become records and record sets
//! - **SOQL templates** - `{name}` placeholders with type-aware quoting
//! - **CRUD** - Create, get, update and delete by id or external id
//!
//! ## Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use sfrecord_rest::{FieldRule, Record, RecordSchema, SalesforceRestClient};
//!
//! fn main() -> Result<(), sfrecord_rest::Error> {
//!     let mut client = SalesforceRestClient::new(
//!         "https://myorg.my.salesforce.com",
//!         "access_token_here",
//!     )?;
//!
//!     // Contacts are built with their own schema
//!     client.map_type(
//!         "Contact",
//!         RecordSchema::builder("Contact")
//!             .field("LastName", [FieldRule::Required, FieldRule::length(1, 80)])
//!             .field("Email", [])
//!             .build(),
//!     )?;
//!
//!     // Create
//!     let schema = client.type_map().resolve(Some("Contact"));
//!     let contact = client.create(&Record::with_schema(schema, "Contact", [("LastName", "Smith")])?)?;
//!
//!     // Query across all pages
//!     let contacts = client.query(
//!         "SELECT Id, LastName, Email FROM Contact WHERE LastName = {name}",
//!         &[("name", json!("Smith"))],
//!     )?;
//!     for contact in &contacts {
//!         let contact = contact?;
//!         println!("{:?} {:?}", contact.id(), contact.get_str("Email"));
//!     }
//!
//!     // Update
//!     let mut changed = contact.clone();
//!     changed.set_field("Email", "smith@example.com")?;
//!     client.update_record(&changed)?;
//!
//!     // Delete
//!     client.delete(&contact)?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
pub mod query_builder;
mod record;
mod result;
mod schema;
pub mod validator;

// Main client
pub use client::SalesforceRestClient;

// Error types
pub use error::{
    Error, ErrorKind, RemoteOperationError, ResponseContext, Result, ResultError, UsageError,
    ValidationError,
};

// Record model
pub use record::{FieldValue, Record, RecordMetadata};
pub use schema::{
    FieldDef, FieldRule, RecordSchema, RecordSchemaBuilder, TypeMap, ID_FIELD, UNEDITABLE_FIELDS,
};

// Record sets
pub use result::{PageFetcher, RecordSet, Records};

// Query templating
pub use query_builder::{prepare, quote, SoqlType};

// Re-export commonly used types from the transport and auth crates
pub use sfrecord_auth::{AuthParameters, Authenticator, PasswordAuth, PasswordCredentials};
pub use sfrecord_client::{ClientConfig, SalesforceClient, Transport, DEFAULT_API_VERSION};
