//! SObject Collections batch writer.
//!
//! A write is split into contiguous batches of at most `batch_size` records.
//! [`build_collection_call`] turns one batch into one request; [`write`] sends
//! the batches in order and pairs every returned outcome with the record it
//! belongs to.
//!
//! Any failure aborts the whole write. Batches that the service already
//! committed are not rolled back, but no partial result list is returned.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use cloudy_sf_client::security::names;
use cloudy_sf_client::{RequestGateway, RequestMethod};

use crate::error::{Error, ErrorKind, Result};
use crate::types::{record_id, Record};

/// Maximum number of records the collections endpoint accepts per call.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Collections write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Update,
    Upsert,
    Delete,
}

impl Operation {
    /// HTTP method used for this operation.
    pub fn method(&self) -> RequestMethod {
        match self {
            Operation::Insert => RequestMethod::Post,
            Operation::Update | Operation::Upsert => RequestMethod::Patch,
            Operation::Delete => RequestMethod::Delete,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Upsert => "upsert",
            Operation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options shared by all collections writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Ask the service to roll back a whole batch if any record fails.
    /// Applies per batch, never across batches.
    pub all_or_none: bool,
    /// Records per request. Must be positive.
    pub batch_size: usize,
    /// External id field for upserts. `None` means `Id`.
    pub external_id_field: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            all_or_none: true,
            batch_size: DEFAULT_BATCH_SIZE,
            external_id_field: None,
        }
    }
}

impl WriteOptions {
    pub fn with_all_or_none(mut self, all_or_none: bool) -> Self {
        self.all_or_none = all_or_none;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_external_id_field(mut self, field: impl Into<String>) -> Self {
        self.external_id_field = Some(field.into());
        self
    }

    /// The upsert key: the external id field, or `Id`.
    pub fn upsert_key(&self) -> &str {
        self.external_id_field.as_deref().unwrap_or("Id")
    }
}

/// A complete collections write.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub operation: Operation,
    pub object_type: String,
    pub records: Vec<Record>,
    pub options: WriteOptions,
}

impl WriteRequest {
    /// Create a write with default options.
    pub fn new(operation: Operation, object_type: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            operation,
            object_type: object_type.into(),
            records,
            options: WriteOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Check names and batch size before anything is sent.
    pub fn validate(&self) -> Result<()> {
        self.batch_size()?;
        if !names::is_safe_api_name(&self.object_type) {
            return Err(Error::new(ErrorKind::InvalidName(self.object_type.clone())));
        }
        if let Some(field) = &self.options.external_id_field {
            if !names::is_safe_api_name(field) {
                return Err(Error::new(ErrorKind::InvalidName(field.clone())));
            }
        }
        Ok(())
    }

    /// Contiguous batches of at most `batch_size` records, in input order.
    pub fn batches(&self) -> Result<std::slice::Chunks<'_, Record>> {
        Ok(self.records.chunks(self.batch_size()?))
    }

    fn batch_size(&self) -> Result<usize> {
        match self.options.batch_size {
            0 => Err(Error::new(ErrorKind::InvalidInput(
                "batch_size must be greater than zero".to_string(),
            ))),
            size => Ok(size),
        }
    }
}

/// Body of an insert/update/upsert collections call.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionRequest {
    #[serde(rename = "allOrNone")]
    pub all_or_none: bool,
    pub records: Vec<Record>,
}

/// One fully built collections request.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionCall {
    pub method: RequestMethod,
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

/// Build the request for one batch.
///
/// Pure: no I/O, and `batch` is not modified. Records are sent with an
/// `attributes: {type}` entry added to a copy.
pub fn build_collection_call(
    api_version: &str,
    request: &WriteRequest,
    batch_index: usize,
    batch: &[Record],
) -> Result<CollectionCall> {
    let base = format!("/services/data/v{api_version}/composite/sobjects");
    let operation = request.operation;

    if operation == Operation::Delete {
        let ids = batch_ids(batch_index, batch)?;
        return Ok(CollectionCall {
            method: operation.method(),
            path: base,
            body: None,
            query: vec![
                ("ids".to_string(), ids.join(",")),
                (
                    "allOrNone".to_string(),
                    request.options.all_or_none.to_string(),
                ),
            ],
        });
    }

    if operation == Operation::Update {
        batch_ids(batch_index, batch)?;
    }

    let path = match operation {
        Operation::Upsert => format!(
            "{base}/{}/{}",
            request.object_type,
            request.options.upsert_key()
        ),
        _ => base,
    };

    let body = CollectionRequest {
        all_or_none: request.options.all_or_none,
        records: batch
            .iter()
            .map(|record| tag_record(record, &request.object_type))
            .collect(),
    };

    Ok(CollectionCall {
        method: operation.method(),
        path,
        body: Some(serde_json::to_value(&body)?),
        query: Vec::new(),
    })
}

fn tag_record(record: &Record, object_type: &str) -> Record {
    let mut tagged = record.clone();
    tagged.insert("attributes".to_string(), json!({ "type": object_type }));
    tagged
}

fn batch_ids(batch_index: usize, batch: &[Record]) -> Result<Vec<&str>> {
    batch
        .iter()
        .enumerate()
        .map(|(record_index, record)| {
            record_id(record).ok_or_else(|| {
                Error::new(ErrorKind::MissingIdentifier {
                    batch_index,
                    record_index,
                })
            })
        })
        .collect()
}

/// Per-record outcome returned by the collections endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CollectionResult {
    pub id: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<SalesforceError>,
    pub created: Option<bool>,
}

/// Salesforce error in operation results.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SalesforceError {
    #[serde(rename = "statusCode")]
    pub status_code: String,
    pub message: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// An input record paired with the service's outcome for it.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    /// The record as the caller supplied it.
    pub record: Record,
    pub outcome: CollectionResult,
}

impl OperationResult {
    pub fn is_success(&self) -> bool {
        self.outcome.success
    }

    /// Id of the written record, when the service reported one.
    pub fn id(&self) -> Option<&str> {
        self.outcome.id.as_deref()
    }

    pub fn errors(&self) -> &[SalesforceError] {
        &self.outcome.errors
    }
}

/// Success/failure view over the results of one write.
#[derive(Debug, Clone, Copy)]
pub struct WriteSummary<'a> {
    results: &'a [OperationResult],
}

impl<'a> WriteSummary<'a> {
    pub fn new(results: &'a [OperationResult]) -> Self {
        Self { results }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn successes(&self) -> impl Iterator<Item = &'a OperationResult> + 'a {
        self.results.iter().filter(|r| r.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &'a OperationResult> + 'a {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Check that `response` holds exactly one outcome per record in the batch.
fn reconcile(batch_index: usize, expected: usize, response: Value) -> Result<Vec<CollectionResult>> {
    let Value::Array(items) = response else {
        return Err(Error::new(ErrorKind::UnexpectedResponse(format!(
            "batch {batch_index}: expected an array of results"
        ))));
    };

    if items.len() != expected {
        return Err(Error::new(ErrorKind::ResultArityMismatch {
            batch_index,
            expected,
            actual: items.len(),
        }));
    }

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| {
                Error::with_source(
                    ErrorKind::UnexpectedResponse(format!(
                        "batch {batch_index}: invalid result entry: {e}"
                    )),
                    e,
                )
            })
        })
        .collect()
}

/// Run a collections write.
///
/// Every batch is built before the first request goes out, so a missing
/// identifier anywhere in the input fails the write without any call.
/// Batches are then sent one at a time, in input order.
///
/// On success the result has one entry per input record, in input order.
#[instrument(
    skip(gateway, request),
    fields(
        operation = %request.operation,
        object_type = %request.object_type,
        records = request.records.len()
    )
)]
pub async fn write<G: RequestGateway>(gateway: &G, request: &WriteRequest) -> Result<Vec<OperationResult>> {
    request.validate()?;
    if request.records.is_empty() {
        debug!("No records to write");
        return Ok(Vec::new());
    }

    let calls = request
        .batches()?
        .enumerate()
        .map(|(batch_index, batch)| {
            build_collection_call(gateway.api_version(), request, batch_index, batch)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut results = Vec::with_capacity(request.records.len());
    for (batch_index, (call, batch)) in calls.iter().zip(request.batches()?).enumerate() {
        debug!(batch_index, size = batch.len(), "Sending collections batch");

        let response = gateway
            .send(call.method, &call.path, call.body.as_ref(), &call.query)
            .await?;
        let outcomes = reconcile(batch_index, batch.len(), response)?;

        results.extend(
            batch
                .iter()
                .cloned()
                .zip(outcomes)
                .map(|(record, outcome)| OperationResult { record, outcome }),
        );
    }

    let summary = WriteSummary::new(&results);
    info!(
        succeeded = summary.success_count(),
        failed = summary.failure_count(),
        "Collections write complete"
    );

    Ok(results)
}
