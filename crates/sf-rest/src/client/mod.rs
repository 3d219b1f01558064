//! Salesforce REST API client.
//!
//! This client wraps `SalesforceClient` from `sf-client` and exposes the
//! batch writer, paginated reader and describe as methods.

use cloudy_sf_auth::Credentials;
use cloudy_sf_client::{ClientConfig, RequestGateway, RequestMethod, SalesforceClient};
use serde_json::Value;

use crate::error::Result;

mod collections;
mod describe;
mod query;

/// Salesforce REST API client.
///
/// A convenience owner of one [`SalesforceClient`]. The orchestration
/// functions in [`crate::collections`] and [`crate::query`] accept any
/// [`RequestGateway`]; this type just supplies one.
///
/// # Example
///
/// ```rust,ignore
/// use cloudy_sf_rest::{SalesforceRestClient, WriteOptions};
///
/// let client = SalesforceRestClient::new(
///     "https://myorg.my.salesforce.com",
///     "access_token_here",
/// )?;
///
/// let accounts = client.query("SELECT Id, Name FROM Account").await?;
///
/// let results = client
///     .update("Account", accounts.into_records(), WriteOptions::default())
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct SalesforceRestClient {
    client: SalesforceClient,
}

impl SalesforceRestClient {
    /// Create a new REST client with the given instance URL and access token.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let client = SalesforceClient::new(instance_url, access_token)?;
        Ok(Self { client })
    }

    /// Create a new REST client with custom HTTP configuration.
    pub fn with_config(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let client = SalesforceClient::with_config(instance_url, access_token, config)?;
        Ok(Self { client })
    }

    /// Create a REST client for an authenticated session.
    pub fn from_credentials(credentials: &impl Credentials) -> Result<Self> {
        let client = SalesforceClient::new(credentials.instance_url(), credentials.access_token())?
            .with_api_version(credentials.api_version());
        Ok(Self { client })
    }

    /// Create a REST client from an existing SalesforceClient.
    pub fn from_client(client: SalesforceClient) -> Self {
        Self { client }
    }

    /// Get the underlying SalesforceClient.
    pub fn inner(&self) -> &SalesforceClient {
        &self.client
    }

    /// Get the instance URL.
    pub fn instance_url(&self) -> &str {
        self.client.instance_url()
    }

    /// Get the API version.
    pub fn api_version(&self) -> &str {
        self.client.api_version()
    }

    /// Set the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.client = self.client.with_api_version(version);
        self
    }
}

impl RequestGateway for SalesforceRestClient {
    async fn send(
        &self,
        method: RequestMethod,
        path: &str,
        body: Option<&Value>,
        query: &[(String, String)],
    ) -> cloudy_sf_client::Result<Value> {
        self.client.send(method, path, body, query).await
    }

    fn api_version(&self) -> &str {
        self.client.api_version()
    }
}
