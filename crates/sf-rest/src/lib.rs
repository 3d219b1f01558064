//! # sf-rest
//!
//! Salesforce REST orchestration on top of a [`RequestGateway`].
//!
//! ## Features
//!
//! - **SObject Collections** - insert/update/upsert/delete in batches of up
//!   to 200 records, with every outcome paired to its input record
//! - **SOQL Query** - cursor-following pagination, including nested
//!   sub-query collections
//! - **Describe** - object and field metadata
//!
//! Every operation takes the gateway explicitly; [`SalesforceRestClient`] is
//! a thin owner of one for convenience.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloudy_sf_rest::{collections, query, Operation, QueryMode, WriteRequest};
//! use cloudy_sf_client::SalesforceClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cloudy_sf_rest::Error> {
//!     let gateway = SalesforceClient::new("https://myorg.my.salesforce.com", "00D...")?;
//!
//!     let accounts = query::execute(
//!         &gateway,
//!         "SELECT Id, (SELECT Id FROM Contacts) FROM Account",
//!         QueryMode::Query,
//!     )
//!     .await?;
//!
//!     let request = WriteRequest::new(Operation::Delete, "Account", accounts.into_records());
//!     let results = collections::write(&gateway, &request).await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
pub mod collections;
pub mod describe;
mod error;
pub mod query;
mod types;

// Main client
pub use client::SalesforceRestClient;

// Collection operations
pub use collections::{
    build_collection_call, CollectionCall, CollectionRequest, CollectionResult, Operation,
    OperationResult, SalesforceError, WriteOptions, WriteRequest, WriteSummary,
    DEFAULT_BATCH_SIZE,
};

// Describe types
pub use describe::{DescribeSObjectResult, FieldDescribe, PicklistValue};

// Error types
pub use error::{Error, ErrorKind, Result};

// Query types
pub use query::{QueryMode, QueryPage, QueryResult, MAX_NESTING_DEPTH};

// Common types
pub use types::{record_id, Record};

// Re-export sf-client types that users might need
pub use cloudy_sf_client::{ClientConfig, ClientConfigBuilder, RequestGateway, RequestMethod};
