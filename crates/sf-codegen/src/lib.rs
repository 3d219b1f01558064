//! # sf-codegen
//!
//! Typed Rust models for Salesforce SObjects.
//!
//! The generator describes each object through a [`RequestGateway`], reduces
//! the describe payload to an [`ObjectSpec`] and renders one module per
//! object: a serde struct whose fields are `Option<T>` renamed to their API
//! names, plus an enum per picklist field. A `mod.rs` re-exports them all.
//!
//! | Salesforce type | Rust type |
//! |-----------------|-----------|
//! | id, reference, string, textarea, phone, email, url, date, datetime, ... | `String` |
//! | double, percent, currency | `f64` |
//! | int | `i64` |
//! | boolean | `bool` |
//! | picklist | `<Field>Picklist` enum |
//! | anything else | `serde_json::Value` |
//!
//! [`RequestGateway`]: cloudy_sf_client::RequestGateway

mod error;
mod generator;
mod model;
pub mod render;

pub use error::{Error, ErrorKind, Result};
pub use generator::{Generator, DEFAULT_OUTPUT_DIR};
pub use model::{FieldSpec, FieldType, ObjectSpec};
