//! The request gateway seam.

use std::future::Future;

use serde_json::Value;

use crate::error::Result;
use crate::request::RequestMethod;

/// One authenticated JSON call against a Salesforce instance.
///
/// Orchestration code (batch writes, paginated reads, describe) is generic
/// over this trait and receives the gateway explicitly; nothing depends on a
/// process-wide client.
///
/// Implementations must:
/// - resolve `path` against their base URL (absolute `http(s)://` URLs are
///   used verbatim),
/// - attach the session credential,
/// - send `body` as JSON when present and `query` as URL parameters,
/// - return the decoded JSON body (`Value::Null` for an empty body),
/// - fail with `ErrorKind::Http` for non-2xx statuses and with a transport
///   kind for everything below HTTP, without retrying.
pub trait RequestGateway: Send + Sync {
    /// Issue one request and decode the JSON response.
    fn send(
        &self,
        method: RequestMethod,
        path: &str,
        body: Option<&Value>,
        query: &[(String, String)],
    ) -> impl Future<Output = Result<Value>> + Send;

    /// API version used to build versioned paths, e.g. `"62.0"`.
    fn api_version(&self) -> &str;

    /// Build a versioned data path: `data_path("query")` ->
    /// `/services/data/v62.0/query`.
    fn data_path(&self, path: &str) -> String {
        format!(
            "/services/data/v{}/{}",
            self.api_version(),
            path.trim_start_matches('/')
        )
    }
}
