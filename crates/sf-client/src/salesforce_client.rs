//! Authenticated Salesforce client implementing [`RequestGateway`].
//!
//! ## Security
//!
//! - Access tokens are redacted in Debug output
//! - Request bodies are skipped in tracing spans

use serde_json::Value;
use tracing::instrument;

use crate::client::SfHttpClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::gateway::RequestGateway;
use crate::request::{RequestBuilder, RequestMethod};
use crate::DEFAULT_API_VERSION;

/// Salesforce API client bound to one authenticated session.
///
/// Cheap to clone; clones share the connection pool. The session token is
/// read-only after construction, so independent call chains may use the same
/// client concurrently.
///
/// # Example
///
/// ```rust,ignore
/// use cloudy_sf_client::{RequestGateway, RequestMethod, SalesforceClient};
///
/// let client = SalesforceClient::new("https://na1.salesforce.com", session_id)?;
/// let page = client
///     .send(
///         RequestMethod::Get,
///         &client.data_path("query"),
///         None,
///         &[("q".to_string(), "SELECT Id FROM Account".to_string())],
///     )
///     .await?;
/// ```
#[derive(Clone)]
pub struct SalesforceClient {
    http: SfHttpClient,
    instance_url: String,
    access_token: String,
    api_version: String,
}

impl std::fmt::Debug for SalesforceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceClient")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl SalesforceClient {
    /// Create a new client for the given instance URL and session token.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        Self::with_config(instance_url, access_token, ClientConfig::default())
    }

    /// Create a new client with custom configuration.
    pub fn with_config(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let instance_url = instance_url.into();
        url::Url::parse(&instance_url)?;

        let http = SfHttpClient::new(config)?;
        Ok(Self {
            http,
            instance_url: instance_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    /// Set the API version (e.g., "62.0").
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Get the instance URL.
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Get the access token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Build the full URL for a path.
    ///
    /// If the path starts with `/`, it's appended to the instance URL.
    /// Absolute URLs are returned unchanged.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.instance_url, path)
        } else {
            format!("{}/{}", self.instance_url, path)
        }
    }

    /// Create an authenticated request builder for a path.
    pub fn request(&self, method: RequestMethod, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(&self.access_token)
    }
}

impl RequestGateway for SalesforceClient {
    #[instrument(skip(self, body, query), fields(method = %method, path = %path))]
    async fn send(
        &self,
        method: RequestMethod,
        path: &str,
        body: Option<&Value>,
        query: &[(String, String)],
    ) -> Result<Value> {
        let mut request = self.request(method, path).query_pairs(query);
        if let Some(body) = body {
            request = request.json_value(body.clone());
        }

        let response = self.http.execute(request).await?;
        response.json_value().await
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }
}
