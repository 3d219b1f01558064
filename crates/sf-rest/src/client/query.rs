use tracing::instrument;

use crate::error::Result;
use crate::query::{self, QueryMode, QueryResult};

impl super::SalesforceRestClient {
    /// Execute a SOQL query and return every page, nested sub-query
    /// collections included.
    ///
    /// # Security
    ///
    /// **IMPORTANT**: values interpolated into the WHERE clause must be
    /// escaped by the caller; the query string is sent as given.
    #[instrument(skip(self))]
    pub async fn query(&self, soql: &str) -> Result<QueryResult> {
        query::execute(&self.client, soql, QueryMode::Query).await
    }

    /// Like [`query`](Self::query) but against `queryAll`, which also returns
    /// deleted and archived records.
    #[instrument(skip(self))]
    pub async fn query_all(&self, soql: &str) -> Result<QueryResult> {
        query::execute(&self.client, soql, QueryMode::QueryAll).await
    }
}
