use tracing::instrument;

use crate::describe::{self, DescribeSObjectResult};
use crate::error::Result;

impl super::SalesforceRestClient {
    /// Describe one SObject: its fields, their types and picklist values.
    #[instrument(skip(self))]
    pub async fn describe_sobject(&self, sobject: &str) -> Result<DescribeSObjectResult> {
        describe::describe_sobject(&self.client, sobject).await
    }
}
