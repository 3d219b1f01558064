//! Paginated SOQL reader.
//!
//! [`execute`] follows `nextRecordsUrl` cursors until the result is done,
//! then walks every record for nested sub-query collections and pages them
//! to completion in place.
//!
//! Any error discards everything fetched so far.

use std::collections::HashSet;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use cloudy_sf_client::{RequestGateway, RequestMethod};

use crate::error::{Error, ErrorKind, Result};
use crate::types::Record;

/// Maximum depth of nested collections resolved below a top-level record.
pub const MAX_NESTING_DEPTH: usize = 8;

/// Which query endpoint to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// `query`: live records only.
    #[default]
    Query,
    /// `queryAll`: also returns deleted and archived records.
    QueryAll,
}

impl QueryMode {
    pub fn endpoint(&self) -> &'static str {
        match self {
            QueryMode::Query => "query",
            QueryMode::QueryAll => "queryAll",
        }
    }
}

/// One page of a query response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueryPage {
    #[serde(rename = "totalSize", default)]
    pub total_size: u64,
    pub done: bool,
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(rename = "nextRecordsUrl", default, skip_serializing_if = "Option::is_none")]
    pub next_records_url: Option<String>,
}

impl QueryPage {
    /// Where to go next, if anywhere.
    ///
    /// A page that is done but still names a cursor is treated as the last
    /// page. A page that is not done and names no cursor is malformed.
    fn next_cursor(&self, page: usize) -> Result<Option<String>> {
        next_cursor(self.done, self.next_records_url.as_deref(), page)
    }
}

fn next_cursor(done: bool, cursor: Option<&str>, page: usize) -> Result<Option<String>> {
    match (done, cursor) {
        (false, Some(cursor)) => Ok(Some(cursor.to_string())),
        (false, None) => Err(Error::new(ErrorKind::IncompletePagination { page })),
        (true, Some(cursor)) => {
            warn!(page, cursor, "Page is done but carries a cursor; ignoring it");
            Ok(None)
        }
        (true, None) => Ok(None),
    }
}

/// A fully paginated query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Records of every page, in page order.
    pub records: Vec<Record>,
    pub done: bool,
    /// Total reported by the first page.
    #[serde(rename = "totalSize")]
    pub total_size: u64,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Deserialize every record into `T`.
    pub fn records_as<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.records
            .iter()
            .map(|record| {
                serde_json::from_value(Value::Object(record.clone())).map_err(Error::from)
            })
            .collect()
    }
}

/// Run a SOQL query and return every record, nested collections included.
#[instrument(skip(gateway, soql, mode), fields(mode = mode.endpoint()))]
pub async fn execute<G: RequestGateway>(
    gateway: &G,
    soql: &str,
    mode: QueryMode,
) -> Result<QueryResult> {
    let mut seen = HashSet::new();
    let path = gateway.data_path(mode.endpoint());
    let query = [("q".to_string(), soql.to_string())];

    let first = fetch_page(gateway, &path, &query, 1).await?;
    let total_size = first.total_size;
    let mut cursor = first.next_cursor(1)?;
    let mut records = first.records;

    let mut page = 1;
    while let Some(url) = cursor {
        page += 1;
        let next = follow_cursor(gateway, url, page, &mut seen).await?;
        cursor = next.next_cursor(page)?;
        records.extend(next.records);
    }

    if records.len() as u64 != total_size {
        warn!(
            received = records.len(),
            total_size, "Record count differs from reported totalSize"
        );
    }

    for record in &mut records {
        resolve_record(gateway, record, 0, &mut seen).await?;
    }

    info!(records = records.len(), pages = page, "Query complete");

    Ok(QueryResult {
        records,
        done: true,
        total_size,
    })
}

async fn fetch_page<G: RequestGateway>(
    gateway: &G,
    path: &str,
    query: &[(String, String)],
    page: usize,
) -> Result<QueryPage> {
    debug!(page, "Fetching query page");
    let value = gateway.send(RequestMethod::Get, path, None, query).await?;
    serde_json::from_value(value).map_err(|e| {
        Error::with_source(
            ErrorKind::UnexpectedResponse(format!("page {page} is not a query result: {e}")),
            e,
        )
    })
}

async fn follow_cursor<G: RequestGateway>(
    gateway: &G,
    cursor: String,
    page: usize,
    seen: &mut HashSet<String>,
) -> Result<QueryPage> {
    if seen.contains(&cursor) {
        return Err(Error::new(ErrorKind::RepeatedCursor { cursor }));
    }
    let result = fetch_page(gateway, &cursor, &[], page).await;
    seen.insert(cursor);
    result
}

/// Resolve every nested collection held directly by `record`.
///
/// `depth` is the nesting level of `record` itself; top-level records are 0.
fn resolve_record<'a, G: RequestGateway>(
    gateway: &'a G,
    record: &'a mut Record,
    depth: usize,
    seen: &'a mut HashSet<String>,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        for (field, value) in record.iter_mut() {
            let Value::Object(collection) = value else {
                continue;
            };
            if !is_nested_collection(collection) {
                continue;
            }
            if depth + 1 > MAX_NESTING_DEPTH {
                return Err(Error::new(ErrorKind::NestingTooDeep {
                    max_depth: MAX_NESTING_DEPTH,
                }));
            }

            complete_collection(gateway, field, collection, seen).await?;

            if let Some(Value::Array(children)) = collection.get_mut("records") {
                for child in children.iter_mut().filter_map(Value::as_object_mut) {
                    resolve_record(gateway, child, depth + 1, seen).await?;
                }
            }
        }
        Ok(())
    })
}

fn is_nested_collection(value: &serde_json::Map<String, Value>) -> bool {
    matches!(value.get("records"), Some(Value::Array(_))) || value.contains_key("nextRecordsUrl")
}

/// Page a nested collection to completion, appending to its `records`.
async fn complete_collection<G: RequestGateway>(
    gateway: &G,
    field: &str,
    collection: &mut serde_json::Map<String, Value>,
    seen: &mut HashSet<String>,
) -> Result<()> {
    let malformed = || {
        Error::new(ErrorKind::MalformedNestedCollection {
            field: field.to_string(),
        })
    };

    let first_cursor = match collection.get("nextRecordsUrl") {
        None | Some(Value::Null) => None,
        Some(Value::String(url)) => Some(url.as_str()),
        Some(_) => return Err(malformed()),
    };
    let done = match collection.get("done") {
        None => first_cursor.is_none(),
        Some(Value::Bool(done)) => *done,
        Some(_) => return Err(malformed()),
    };
    if first_cursor.is_some() && !matches!(collection.get("records"), Some(Value::Array(_))) {
        return Err(malformed());
    }

    let mut cursor = next_cursor(done, first_cursor, 1).inspect_err(|_| {
        debug!(field, "Nested collection is not done and has no cursor");
    })?;
    if cursor.is_none() {
        collection.insert("done".to_string(), Value::Bool(true));
        collection.remove("nextRecordsUrl");
        return Ok(());
    }

    let mut page = 1;
    let mut fetched = Vec::new();
    while let Some(url) = cursor {
        page += 1;
        debug!(field, page, "Following nested collection cursor");
        let next = follow_cursor(gateway, url, page, seen).await?;
        cursor = next.next_cursor(page)?;
        fetched.extend(next.records.into_iter().map(Value::Object));
    }

    if let Some(Value::Array(records)) = collection.get_mut("records") {
        records.extend(fetched);
    }
    collection.insert("done".to_string(), Value::Bool(true));
    collection.remove("nextRecordsUrl");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudy_sf_client::SalesforceClient;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const QUERY_PATH: &str = "/services/data/v62.0/query";

    async fn mount_page(server: &MockServer, url_path: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(url_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> SalesforceClient {
        SalesforceClient::new(server.uri(), "tok").unwrap()
    }

    #[test]
    fn test_next_cursor() {
        let page = |done: bool, next: Option<&str>| QueryPage {
            total_size: 0,
            done,
            records: vec![],
            next_records_url: next.map(str::to_string),
        };

        assert_eq!(page(false, Some("/c")).next_cursor(1).unwrap(), Some("/c".into()));
        assert_eq!(page(true, None).next_cursor(1).unwrap(), None);
        assert_eq!(page(true, Some("/c")).next_cursor(1).unwrap(), None);
        assert!(matches!(
            page(false, None).next_cursor(3).unwrap_err().kind,
            ErrorKind::IncompletePagination { page: 3 }
        ));
    }

    #[test]
    fn test_query_mode_endpoint() {
        assert_eq!(QueryMode::default().endpoint(), "query");
        assert_eq!(QueryMode::QueryAll.endpoint(), "queryAll");
    }

    #[tokio::test]
    async fn test_three_pages_concatenate_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(QUERY_PATH))
            .and(query_param("q", "SELECT Id FROM Account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalSize": 5,
                "done": false,
                "records": [{"Id": "1"}, {"Id": "2"}],
                "nextRecordsUrl": "/services/data/v62.0/query/01g-2000"
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_page(
            &server,
            "/services/data/v62.0/query/01g-2000",
            json!({
                "totalSize": 99,
                "done": false,
                "records": [{"Id": "3"}, {"Id": "4"}],
                "nextRecordsUrl": "/services/data/v62.0/query/01g-4000"
            }),
        )
        .await;
        mount_page(
            &server,
            "/services/data/v62.0/query/01g-4000",
            json!({"totalSize": 99, "done": true, "records": [{"Id": "5"}]}),
        )
        .await;

        let result = execute(&client(&server), "SELECT Id FROM Account", QueryMode::Query)
            .await
            .unwrap();

        let ids: Vec<&str> = result
            .records
            .iter()
            .map(|r| r["Id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"]);
        assert_eq!(result.total_size, 5);
        assert!(result.done);
    }

    #[tokio::test]
    async fn test_query_all_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/queryAll"))
            .and(query_param("q", "SELECT Id FROM Account WHERE IsDeleted = true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalSize": 1, "done": true, "records": [{"Id": "del"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = execute(
            &client(&server),
            "SELECT Id FROM Account WHERE IsDeleted = true",
            QueryMode::QueryAll,
        )
        .await
        .unwrap();

        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_incomplete_pagination() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            QUERY_PATH,
            json!({"totalSize": 10, "done": false, "records": [{"Id": "1"}]}),
        )
        .await;

        let err = execute(&client(&server), "SELECT Id FROM Account", QueryMode::Query)
            .await
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::IncompletePagination { page: 1 }));
    }

    #[tokio::test]
    async fn test_repeated_cursor() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            QUERY_PATH,
            json!({"totalSize": 4, "done": false, "records": [{"Id": "1"}], "nextRecordsUrl": "/loop"}),
        )
        .await;
        mount_page(
            &server,
            "/loop",
            json!({"totalSize": 4, "done": false, "records": [{"Id": "2"}], "nextRecordsUrl": "/loop"}),
        )
        .await;

        let err = execute(&client(&server), "SELECT Id FROM Account", QueryMode::Query)
            .await
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::RepeatedCursor { ref cursor } if cursor == "/loop"));
    }

    #[tokio::test]
    async fn test_nested_collection_resolution() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            QUERY_PATH,
            json!({
                "totalSize": 1,
                "done": true,
                "records": [{
                    "attributes": {"type": "Account", "url": "/services/data/v62.0/sobjects/Account/001"},
                    "Id": "001",
                    "Owner": {"attributes": {"type": "User"}, "Name": "Ann"},
                    "Children": {
                        "totalSize": 5,
                        "done": false,
                        "records": [{"Id": "c1"}, {"Id": "c2"}],
                        "nextRecordsUrl": "/cursor1"
                    }
                }]
            }),
        )
        .await;
        mount_page(
            &server,
            "/cursor1",
            json!({
                "totalSize": 5,
                "done": false,
                "records": [{"Id": "c3"}, {"Id": "c4"}],
                "nextRecordsUrl": "/cursor2"
            }),
        )
        .await;
        mount_page(
            &server,
            "/cursor2",
            json!({"totalSize": 5, "done": true, "records": [{"Id": "c5"}]}),
        )
        .await;

        let result = execute(
            &client(&server),
            "SELECT Id, (SELECT Id FROM Children) FROM Account",
            QueryMode::Query,
        )
        .await
        .unwrap();

        let children = &result.records[0]["Children"];
        let ids: Vec<&str> = children["records"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["Id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["c1", "c2", "c3", "c4", "c5"]);
        assert_eq!(children["done"], true);
        assert!(children.get("nextRecordsUrl").is_none());
        assert_eq!(result.records[0]["Owner"]["Name"], "Ann");
    }

    #[tokio::test]
    async fn test_nested_collection_in_later_page_and_grandchildren() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            QUERY_PATH,
            json!({
                "totalSize": 2, "done": false,
                "records": [{"Id": "p1"}],
                "nextRecordsUrl": "/page2"
            }),
        )
        .await;
        mount_page(
            &server,
            "/page2",
            json!({
                "totalSize": 2, "done": true,
                "records": [{
                    "Id": "p2",
                    "Kids": {
                        "totalSize": 1, "done": true,
                        "records": [{
                            "Id": "k1",
                            "Grandkids": {
                                "totalSize": 2, "done": false,
                                "records": [{"Id": "g1"}],
                                "nextRecordsUrl": "/grand"
                            }
                        }]
                    }
                }]
            }),
        )
        .await;
        mount_page(
            &server,
            "/grand",
            json!({"totalSize": 2, "done": true, "records": [{"Id": "g2"}]}),
        )
        .await;

        let result = execute(&client(&server), "SELECT Id FROM Parent__c", QueryMode::Query)
            .await
            .unwrap();

        let grandkids = &result.records[1]["Kids"]["records"][0]["Grandkids"];
        assert_eq!(grandkids["records"].as_array().unwrap().len(), 2);
        assert_eq!(grandkids["records"][1]["Id"], "g2");
        assert_eq!(grandkids["done"], true);
    }

    #[tokio::test]
    async fn test_malformed_nested_collection() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            QUERY_PATH,
            json!({
                "totalSize": 1, "done": true,
                "records": [{"Id": "001", "Contacts": {"done": false, "nextRecordsUrl": "/more"}}]
            }),
        )
        .await;

        let err = execute(&client(&server), "SELECT Id FROM Account", QueryMode::Query)
            .await
            .unwrap_err();

        assert!(matches!(
            err.kind,
            ErrorKind::MalformedNestedCollection { ref field } if field == "Contacts"
        ));
    }

    #[tokio::test]
    async fn test_nested_collection_not_done_without_cursor() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            QUERY_PATH,
            json!({
                "totalSize": 1, "done": true,
                "records": [{
                    "Id": "001",
                    "Contacts": {"totalSize": 5, "done": false, "records": [{"Id": "c1"}]}
                }]
            }),
        )
        .await;

        let err = execute(&client(&server), "SELECT Id FROM Account", QueryMode::Query)
            .await
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::IncompletePagination { page: 1 }));
    }

    #[tokio::test]
    async fn test_nested_collection_done_with_stale_cursor() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            QUERY_PATH,
            json!({
                "totalSize": 1, "done": true,
                "records": [{
                    "Id": "001",
                    "Contacts": {
                        "totalSize": 1, "done": true,
                        "records": [{"Id": "c1"}],
                        "nextRecordsUrl": "/stale"
                    }
                }]
            }),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/stale"))
            .respond_with(ResponseTemplate::new(404))
            .expect(0)
            .mount(&server)
            .await;

        let result = execute(&client(&server), "SELECT Id FROM Account", QueryMode::Query)
            .await
            .unwrap();

        let contacts = &result.records[0]["Contacts"];
        assert_eq!(contacts["records"], json!([{"Id": "c1"}]));
        assert_eq!(contacts["done"], json!(true));
        assert!(contacts.get("nextRecordsUrl").is_none());
    }

    #[tokio::test]
    async fn test_nested_cursor_must_be_a_string() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            QUERY_PATH,
            json!({
                "totalSize": 1, "done": true,
                "records": [{"Id": "001", "Contacts": {"records": [], "nextRecordsUrl": 5}}]
            }),
        )
        .await;

        let err = execute(&client(&server), "SELECT Id FROM Account", QueryMode::Query)
            .await
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::MalformedNestedCollection { .. }));
    }

    #[tokio::test]
    async fn test_nesting_depth_is_capped() {
        let server = MockServer::start().await;

        let mut leaf = json!({"Id": "leaf"});
        for _ in 0..=MAX_NESTING_DEPTH {
            leaf = json!({"Id": "n", "Sub": {"totalSize": 1, "done": true, "records": [leaf]}});
        }
        mount_page(
            &server,
            QUERY_PATH,
            json!({"totalSize": 1, "done": true, "records": [leaf]}),
        )
        .await;

        let err = execute(&client(&server), "SELECT Id FROM Account", QueryMode::Query)
            .await
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::NestingTooDeep { .. }));
    }

    #[tokio::test]
    async fn test_http_error_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(QUERY_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"[{"message":"unexpected token: FORM","errorCode":"MALFORMED_QUERY"}]"#,
            ))
            .mount(&server)
            .await;

        let err = execute(&client(&server), "SELECT Id FORM Account", QueryMode::Query)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert!(err.body().unwrap().contains("MALFORMED_QUERY"));
    }

    #[tokio::test]
    async fn test_records_as_typed() {
        #[derive(Deserialize)]
        struct Account {
            #[serde(rename = "Id")]
            id: String,
        }

        let server = MockServer::start().await;
        mount_page(
            &server,
            QUERY_PATH,
            json!({"totalSize": 2, "done": true, "records": [{"Id": "a"}, {"Id": "b"}]}),
        )
        .await;

        let result = execute(&client(&server), "SELECT Id FROM Account", QueryMode::Query)
            .await
            .unwrap();
        let accounts: Vec<Account> = result.records_as().unwrap();

        assert_eq!(accounts[1].id, "b");
    }
}
