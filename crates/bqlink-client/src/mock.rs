//! Mock transport for testing
//!
//! Serves scripted results from memory without connecting to any warehouse.
//! It's useful for:
//! - Unit testing code that consumes query results
//! - Exercising cursor exhaustion, mid-stream failures and cancellation
//! - Demos without real credentials
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bqlink_client::{MockResponse, MockTransport, WarehouseClient};
//! use bqlink_core::{Field, FieldType, QueryContext, Schema, Value};
//!
//! let transport = MockTransport::new();
//! transport
//!     .add_response(
//!         "select name from t",
//!         MockResponse::new(Schema::from_fields(vec![Field::new("name", FieldType::String)]))
//!             .with_rows(vec![vec![Value::from("Alice")]]),
//!     )
//!     .await;
//!
//! let client = WarehouseClient::from_transport(Box::new(transport));
//! let out = client.query(&QueryContext::new(), "select name from t").await?;
//! ```
//!
//! ## Simulating Failures
//!
//! ```rust,ignore
//! // Fail after the first row
//! let response = MockResponse::new(schema).with_row(row).then_fail(
//!     WarehouseError::QueryExecution("backend error".to_string()),
//! );
//!
//! // Never answer, so only cancellation ends the drain
//! let response = MockResponse::new(schema).with_row(row).then_stall();
//! ```

use crate::transport::{Connector, DryRunStatus, Fetch, RowCursor, Transport};
use bqlink_core::{Credentials, Row, Schema, WarehouseError};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// One scripted cursor step
#[derive(Debug, Clone, PartialEq)]
pub enum MockStep {
    Row(Row),
    Fail(WarehouseError),

    /// Never resolves
    Stall,
}

/// Scripted result for one query text
#[derive(Debug, Clone, Default)]
pub struct MockResponse {
    pub schema: Schema,
    pub steps: Vec<MockStep>,

    /// Row-count hint reported by the cursor
    pub total_rows: Option<u64>,

    /// Error returned when the query is submitted
    pub open_error: Option<WarehouseError>,

    /// Dry-run answer; a response without one reports zero bytes
    pub dry_run: Option<Result<DryRunStatus, WarehouseError>>,
}

impl MockResponse {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            ..Default::default()
        }
    }

    /// Append rows and set the row-count hint to the total scripted rows
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.steps.extend(rows.into_iter().map(MockStep::Row));
        self.total_rows = Some(self.row_steps() as u64);
        self
    }

    /// Append a single row without touching the row-count hint
    pub fn with_row(mut self, row: Row) -> Self {
        self.steps.push(MockStep::Row(row));
        self
    }

    /// Fail the cursor once the preceding steps are consumed
    pub fn then_fail(mut self, error: WarehouseError) -> Self {
        self.steps.push(MockStep::Fail(error));
        self
    }

    /// Hang the cursor once the preceding steps are consumed
    pub fn then_stall(mut self) -> Self {
        self.steps.push(MockStep::Stall);
        self
    }

    pub fn with_total_rows(mut self, total_rows: Option<u64>) -> Self {
        self.total_rows = total_rows;
        self
    }

    pub fn with_open_error(mut self, error: WarehouseError) -> Self {
        self.open_error = Some(error);
        self
    }

    pub fn with_dry_run_bytes(mut self, bytes: i64) -> Self {
        self.dry_run = Some(Ok(DryRunStatus {
            total_bytes_processed: bytes,
            cache_hit: false,
        }));
        self
    }

    pub fn with_dry_run_error(mut self, error: WarehouseError) -> Self {
        self.dry_run = Some(Err(error));
        self
    }

    fn row_steps(&self) -> usize {
        self.steps.iter().filter(|s| matches!(s, MockStep::Row(_))).count()
    }
}

/// Mock transport for testing
///
/// Clones share the scripted responses, the submitted-query log and the
/// closed flag, so a test can keep a clone for inspection after handing the
/// transport to a client.
#[derive(Clone)]
pub struct MockTransport {
    /// Scripted responses by exact query text
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,

    /// Every query submitted, in order, dry runs included
    submitted: Arc<RwLock<Vec<String>>>,

    closed: Arc<AtomicBool>,

    /// Error to return from close()
    close_error: Option<WarehouseError>,

    /// Simulated latency per call (milliseconds)
    latency_ms: u64,

    /// Name to return from name() method
    transport_name: &'static str,
}

impl MockTransport {
    /// Create a new mock transport with no scripted responses
    pub fn new() -> Self {
        Self::from_responses(HashMap::new())
    }

    /// Create a mock transport from a pre-built map of responses
    pub fn from_responses(responses: HashMap<String, MockResponse>) -> Self {
        Self {
            responses: Arc::new(RwLock::new(responses)),
            submitted: Arc::new(RwLock::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
            close_error: None,
            latency_ms: 0,
            transport_name: "Mock",
        }
    }

    /// Script the response for a query text
    pub async fn add_response(&self, query: impl Into<String>, response: MockResponse) {
        self.responses.write().await.insert(query.into(), response);
    }

    /// Configure simulated latency for every call and every cursor step
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set a custom transport name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.transport_name = name;
        self
    }

    /// Make close() fail with the given error
    pub fn with_close_error(mut self, error: WarehouseError) -> Self {
        self.close_error = Some(error);
        self
    }

    /// Queries submitted so far, in order
    pub async fn submitted_queries(&self) -> Vec<String> {
        self.submitted.read().await.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        simulate_latency(self.latency_ms).await;
    }

    async fn lookup(&self, query: &str) -> Result<MockResponse, WarehouseError> {
        self.submitted.write().await.push(query.to_string());

        self.responses
            .read()
            .await
            .get(query)
            .cloned()
            .ok_or_else(|| WarehouseError::QueryExecution(format!("Not found: no mock response for '{}'", query)))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

async fn simulate_latency(latency_ms: u64) {
    if latency_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(latency_ms)).await;
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        self.transport_name
    }

    async fn open_cursor(&self, query: &str) -> Result<Box<dyn RowCursor>, WarehouseError> {
        self.simulate_latency().await;

        let response = self.lookup(query).await?;
        if let Some(error) = response.open_error {
            return Err(error);
        }

        Ok(Box::new(MockCursor {
            schema: response.schema,
            steps: response.steps.into(),
            total_rows: response.total_rows,
            latency_ms: self.latency_ms,
        }))
    }

    async fn dry_run(&self, query: &str) -> Result<DryRunStatus, WarehouseError> {
        self.simulate_latency().await;

        let response = self.lookup(query).await?;
        if let Some(error) = response.open_error {
            return Err(error);
        }

        response.dry_run.unwrap_or(Ok(DryRunStatus::default()))
    }

    async fn close(&self) -> Result<(), WarehouseError> {
        self.closed.store(true, Ordering::SeqCst);
        match &self.close_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Cursor over a scripted response
pub struct MockCursor {
    schema: Schema,
    steps: VecDeque<MockStep>,
    total_rows: Option<u64>,
    latency_ms: u64,
}

#[async_trait::async_trait]
impl RowCursor for MockCursor {
    fn total_rows(&self) -> Option<u64> {
        self.total_rows
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn next(&mut self) -> Result<Fetch, WarehouseError> {
        simulate_latency(self.latency_ms).await;

        match self.steps.pop_front() {
            Some(MockStep::Row(row)) => Ok(Fetch::Row(row)),
            Some(MockStep::Fail(error)) => Err(error),
            Some(MockStep::Stall) => std::future::pending().await,
            None => Ok(Fetch::Exhausted),
        }
    }
}

/// Mock connector for testing construction paths
///
/// Records the credentials each connect call received and hands out clones
/// of one shared [`MockTransport`].
#[derive(Clone)]
pub struct MockConnector {
    transport: MockTransport,
    connect_error: Option<WarehouseError>,
    connections: Arc<RwLock<Vec<(String, Credentials)>>>,
    latency_ms: u64,
}

impl MockConnector {
    pub fn new(transport: MockTransport) -> Self {
        Self {
            transport,
            connect_error: None,
            connections: Arc::new(RwLock::new(Vec::new())),
            latency_ms: 0,
        }
    }

    /// Configure every connect call to fail
    pub fn with_connect_error(mut self, error: WarehouseError) -> Self {
        self.connect_error = Some(error);
        self
    }

    /// Configure simulated latency for connect calls
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// `(project_id, credentials)` of every connect call, in order
    pub async fn connections(&self) -> Vec<(String, Credentials)> {
        self.connections.read().await.clone()
    }

    pub fn transport(&self) -> &MockTransport {
        &self.transport
    }
}

#[async_trait::async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        project_id: &str,
        credentials: Credentials,
    ) -> Result<Box<dyn Transport>, WarehouseError> {
        simulate_latency(self.latency_ms).await;

        self.connections
            .write()
            .await
            .push((project_id.to_string(), credentials));

        match &self.connect_error {
            Some(error) => Err(error.clone()),
            None => Ok(Box::new(self.transport.clone())),
        }
    }
}

/// Builder for creating MockTransport with multiple responses
///
/// # Example
///
/// ```rust,ignore
/// let transport = MockTransportBuilder::new()
///     .with_response("select 1", MockResponse::new(schema).with_rows(rows))
///     .with_response("select broken", MockResponse::default().with_open_error(err))
///     .with_latency(50)
///     .build();
/// ```
pub struct MockTransportBuilder {
    responses: HashMap<String, MockResponse>,
    latency_ms: u64,
    transport_name: &'static str,
}

impl MockTransportBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            latency_ms: 0,
            transport_name: "Mock",
        }
    }

    /// Script the response for a query text
    pub fn with_response(mut self, query: impl Into<String>, response: MockResponse) -> Self {
        self.responses.insert(query.into(), response);
        self
    }

    /// Configure latency
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set transport name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.transport_name = name;
        self
    }

    /// Build the MockTransport
    pub fn build(self) -> MockTransport {
        MockTransport::from_responses(self.responses)
            .with_latency(self.latency_ms)
            .with_name(self.transport_name)
    }
}

impl Default for MockTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqlink_core::{Field, FieldType, Value};

    fn schema() -> Schema {
        Schema::from_fields(vec![Field::new("id", FieldType::Integer)])
    }

    #[tokio::test]
    async fn test_mock_cursor_steps_then_exhausts() {
        let transport = MockTransport::new();
        transport
            .add_response(
                "select id",
                MockResponse::new(schema()).with_rows(vec![vec![Value::Int(1)], vec![Value::Int(2)]]),
            )
            .await;

        let mut cursor = transport.open_cursor("select id").await.unwrap();
        assert_eq!(cursor.total_rows(), Some(2));
        assert_eq!(cursor.next().await.unwrap(), Fetch::Row(vec![Value::Int(1)]));
        assert_eq!(cursor.next().await.unwrap(), Fetch::Row(vec![Value::Int(2)]));
        assert_eq!(cursor.next().await.unwrap(), Fetch::Exhausted);
        assert_eq!(cursor.next().await.unwrap(), Fetch::Exhausted);
    }

    #[tokio::test]
    async fn test_mock_unknown_query() {
        let transport = MockTransport::new();

        let result = transport.open_cursor("select nothing").await;
        assert!(matches!(result, Err(WarehouseError::QueryExecution(_))));
        assert_eq!(transport.submitted_queries().await, vec!["select nothing"]);
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let transport = MockTransportBuilder::new()
            .with_response(
                "q",
                MockResponse::new(schema())
                    .with_row(vec![Value::Int(1)])
                    .then_fail(WarehouseError::QueryExecution("backend error".to_string())),
            )
            .build();

        let mut cursor = transport.open_cursor("q").await.unwrap();
        assert_eq!(cursor.total_rows(), None);
        assert!(matches!(cursor.next().await, Ok(Fetch::Row(_))));
        assert!(matches!(cursor.next().await, Err(WarehouseError::QueryExecution(_))));
    }

    #[tokio::test]
    async fn test_mock_dry_run() {
        let transport = MockTransportBuilder::new()
            .with_response("priced", MockResponse::new(schema()).with_dry_run_bytes(2048))
            .with_response("unpriced", MockResponse::new(schema()))
            .build();

        assert_eq!(transport.dry_run("priced").await.unwrap().total_bytes_processed, 2048);
        assert_eq!(transport.dry_run("unpriced").await.unwrap().total_bytes_processed, 0);
    }

    #[tokio::test]
    async fn test_mock_close_shared_between_clones() {
        let transport = MockTransport::new().with_name("TestBigQuery");
        let handle = transport.clone();

        assert_eq!(transport.name(), "TestBigQuery");
        assert!(!handle.is_closed());
        transport.close().await.unwrap();
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_mock_connector_records_credentials() {
        let connector = MockConnector::new(MockTransport::new());

        connector
            .connect("proj", Credentials::ApplicationDefault)
            .await
            .unwrap();

        let connections = connector.connections().await;
        assert_eq!(connections, vec![("proj".to_string(), Credentials::ApplicationDefault)]);
    }

    #[tokio::test]
    async fn test_mock_connector_failure() {
        let connector = MockConnector::new(MockTransport::new())
            .with_connect_error(WarehouseError::Connection("refused".to_string()));

        let result = connector.connect("proj", Credentials::ApplicationDefault).await;
        assert!(matches!(result, Err(WarehouseError::Connection(_))));
    }
}
