use tracing::instrument;

use crate::collections::{self, Operation, OperationResult, WriteOptions, WriteRequest};
use crate::error::Result;
use crate::types::Record;

impl super::SalesforceRestClient {
    /// Insert records, in batches of `options.batch_size`.
    #[instrument(skip(self, records, options), fields(records = records.len()))]
    pub async fn insert(
        &self,
        object_type: &str,
        records: Vec<Record>,
        options: WriteOptions,
    ) -> Result<Vec<OperationResult>> {
        self.write_records(Operation::Insert, object_type, records, options)
            .await
    }

    /// Update records. Every record must carry an `Id`.
    #[instrument(skip(self, records, options), fields(records = records.len()))]
    pub async fn update(
        &self,
        object_type: &str,
        records: Vec<Record>,
        options: WriteOptions,
    ) -> Result<Vec<OperationResult>> {
        self.write_records(Operation::Update, object_type, records, options)
            .await
    }

    /// Upsert records on `options.external_id_field`, or `Id` when unset.
    #[instrument(skip(self, records, options), fields(records = records.len()))]
    pub async fn upsert(
        &self,
        object_type: &str,
        records: Vec<Record>,
        options: WriteOptions,
    ) -> Result<Vec<OperationResult>> {
        self.write_records(Operation::Upsert, object_type, records, options)
            .await
    }

    /// Delete records by their `Id`/`id`.
    #[instrument(skip(self, records, options), fields(records = records.len()))]
    pub async fn delete(
        &self,
        object_type: &str,
        records: Vec<Record>,
        options: WriteOptions,
    ) -> Result<Vec<OperationResult>> {
        self.write_records(Operation::Delete, object_type, records, options)
            .await
    }

    /// Run a prepared collections write.
    pub async fn write(&self, request: &WriteRequest) -> Result<Vec<OperationResult>> {
        collections::write(&self.client, request).await
    }

    async fn write_records(
        &self,
        operation: Operation,
        object_type: &str,
        records: Vec<Record>,
        options: WriteOptions,
    ) -> Result<Vec<OperationResult>> {
        let request = WriteRequest::new(operation, object_type, records).with_options(options);
        self.write(&request).await
    }
}
