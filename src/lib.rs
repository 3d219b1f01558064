//! # cloudy-sf
//!
//! A Salesforce client built around two operations: batched SObject
//! Collections writes and fully paginated SOQL reads.
//!
//! ## Security
//!
//! - Session ids, passwords and security tokens are redacted in Debug output
//! - Tracing skips credential parameters and record payloads
//! - Config files name environment variables instead of holding secrets
//!
//! ## Crates
//!
//! - **cloudy-sf-client** - Request gateway: one authenticated JSON call, uniform errors
//! - **cloudy-sf-auth** - SOAP username/password login, session credentials
//! - **cloudy-sf-rest** - Batch writer, paginated reader, describe
//! - **cloudy-sf-codegen** - Typed SObject models from describe metadata
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cloudy_sf::{SalesforceRestClient, UsernamePasswordLogin, WriteOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let creds = UsernamePasswordLogin::new("me@acme.com", "password", "token")
//!         .authenticate()
//!         .await?;
//!     let client = SalesforceRestClient::from_credentials(&creds)?;
//!
//!     let contacts = client
//!         .query("SELECT Id, Email FROM Contact WHERE Email = null")
//!         .await?;
//!
//!     let results = client
//!         .delete("Contact", contacts.into_records(), WriteOptions::default())
//!         .await?;
//!
//!     for failure in results.iter().filter(|r| !r.is_success()) {
//!         println!("{:?}: {:?}", failure.record.get("Id"), failure.errors());
//!     }
//!     Ok(())
//! }
//! ```

#[cfg(feature = "auth")]
pub mod config;

// Re-export all crates for convenient access
#[cfg(feature = "auth")]
pub use cloudy_sf_auth as auth;
#[cfg(feature = "client")]
pub use cloudy_sf_client as client;
#[cfg(feature = "codegen")]
pub use cloudy_sf_codegen as codegen;
#[cfg(feature = "rest")]
pub use cloudy_sf_rest as rest;

// Re-export commonly used types at the top level
#[cfg(feature = "auth")]
pub use cloudy_sf_auth::{Credentials, SalesforceCredentials, UsernamePasswordLogin};
#[cfg(feature = "client")]
pub use cloudy_sf_client::{ClientConfig, RequestGateway, SalesforceClient};
#[cfg(feature = "codegen")]
pub use cloudy_sf_codegen::Generator;
#[cfg(feature = "rest")]
pub use cloudy_sf_rest::{
    Operation, OperationResult, QueryMode, QueryResult, Record, SalesforceRestClient,
    WriteOptions, WriteRequest, WriteSummary,
};
