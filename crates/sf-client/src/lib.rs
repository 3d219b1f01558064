//! # sf-client
//!
//! Authenticated HTTP gateway for Salesforce APIs.
//!
//! This crate is the leaf of the workspace. Everything that talks to
//! Salesforce goes through it:
//! - One authenticated JSON call per [`RequestGateway::send`]
//! - Uniform error surface: non-2xx responses keep their status and raw body,
//!   connection/timeout/decoding failures are transport errors
//! - No retries and no interpretation of error payloads
//! - Request/response tracing and API usage logging
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Orchestration Layer                      │
//! │  (batch writer, paginated reader, describe, SOAP login)     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │          SalesforceClient  (impl RequestGateway)            │
//! │  - Holds instance URL + session token + API version         │
//! │  - send(method, path, body?, query) -> JSON                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SfHttpClient                           │
//! │  - Raw HTTP, compression, timeouts                          │
//! │  - Status checking                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloudy_sf_client::{RequestGateway, RequestMethod, SalesforceClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cloudy_sf_client::Error> {
//!     let client = SalesforceClient::new("https://myorg.my.salesforce.com", "00D...")?;
//!
//!     let limits = client
//!         .send(RequestMethod::Get, "/services/data/v62.0/limits", None, &[])
//!         .await?;
//!
//!     println!("{limits}");
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod gateway;
mod request;
mod response;
mod salesforce_client;
pub mod security;

pub use client::SfHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder, CompressionConfig};
pub use error::{Error, ErrorKind, Result};
pub use gateway::RequestGateway;
pub use request::{RequestBuilder, RequestMethod};
pub use response::{ApiUsage, Response};
pub use salesforce_client::SalesforceClient;

/// Default Salesforce API version
pub const DEFAULT_API_VERSION: &str = "62.0";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("cloudy-sf/", env!("CARGO_PKG_VERSION"));
