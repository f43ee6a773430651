//! End-to-end tests against a local mock of the Salesforce REST API.
//!
//! Run with:
//!   cargo test --test integration
//!
//! Set `RUST_LOG=sfrecord_rest=debug` to see request and page-fetch traces.

#[path = "integration/common.rs"]
mod common;
#[path = "integration/auth.rs"]
mod auth;
#[path = "integration/rest.rs"]
mod rest;
#[path = "integration/results.rs"]
mod results;
