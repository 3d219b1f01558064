//! # sf-auth
//!
//! Salesforce authentication for the cloudy client.
//!
//! Authentication produces a session id and the instance URL it is valid
//! for. That pair is consumed once to construct a
//! [`cloudy_sf_client::SalesforceClient`]; nothing in the workspace keeps a
//! process-wide session.
//!
//! ## Security
//!
//! - Passwords, security tokens and session ids are redacted in Debug output
//! - Tracing skips credential parameters
//! - HTTP failures from the login endpoint never echo the response body
//!
//! ## Supported Authentication Methods
//!
//! - **Username/password SOAP login** with a security token
//! - **Pre-issued session** from environment variables
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloudy_sf_auth::{UsernamePasswordLogin, PRODUCTION_LOGIN_URL};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cloudy_sf_auth::Error> {
//!     let creds = UsernamePasswordLogin::new("me@example.com", "password", "token")
//!         .with_login_url(PRODUCTION_LOGIN_URL)
//!         .authenticate()
//!         .await?;
//!
//!     let client = creds.client()?;
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod login;

pub use credentials::{Credentials, SalesforceCredentials};
pub use error::{Error, ErrorKind, Result};
pub use login::UsernamePasswordLogin;

/// Default Salesforce login URL for production.
pub const PRODUCTION_LOGIN_URL: &str = "https://login.salesforce.com";

/// Default Salesforce login URL for sandbox.
pub const SANDBOX_LOGIN_URL: &str = "https://test.salesforce.com";
