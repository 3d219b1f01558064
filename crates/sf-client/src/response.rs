//! HTTP response handling.

use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorKind, Result};

/// Wrapper around an HTTP response.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Get API usage limits from the `Sforce-Limit-Info` header.
    pub fn api_usage(&self) -> Option<ApiUsage> {
        ApiUsage::parse(self.header("sforce-limit-info")?)
    }

    /// Turn a non-2xx response into [`ErrorKind::Http`] carrying the raw body.
    pub async fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let status = self.status();
        let body = self.inner.text().await.unwrap_or_default();
        Err(Error::new(ErrorKind::Http { status, body }))
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        self.inner.text().await.map_err(Into::into)
    }

    /// Decode the body as JSON. An empty body (e.g. `204 No Content`)
    /// decodes to `Value::Null`.
    pub async fn json_value(self) -> Result<serde_json::Value> {
        let text = self.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            Error::with_source(ErrorKind::MalformedResponse(e.to_string()), e)
        })
    }

    /// Deserialize the response body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let text = self.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            Error::with_source(ErrorKind::MalformedResponse(e.to_string()), e)
        })
    }
}

/// API usage information from response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiUsage {
    /// Number of API calls used.
    pub used: u64,
    /// Total API call limit.
    pub limit: u64,
}

impl ApiUsage {
    /// Parse a `Sforce-Limit-Info` value, e.g. `api-usage=25/15000`.
    pub fn parse(header: &str) -> Option<Self> {
        header.split(',').map(str::trim).find_map(|part| {
            let usage = part.strip_prefix("api-usage=")?;
            let (used, limit) = usage.split_once('/')?;
            Some(Self {
                used: used.trim().parse().ok()?,
                limit: limit.trim().parse().ok()?,
            })
        })
    }

    /// Get the remaining API calls.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }

    /// Get the usage percentage.
    pub fn percentage(&self) -> f64 {
        if self.limit == 0 {
            100.0
        } else {
            (self.used as f64 / self.limit as f64) * 100.0
        }
    }
}
