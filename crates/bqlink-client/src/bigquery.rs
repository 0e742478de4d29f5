//! BigQuery transport backed by `gcp-bigquery-client`
//!
//! Queries go through `jobs.query`; the first response page seeds a cursor
//! that keeps calling `jobs.getQueryResults` while the job is still running
//! or a page token remains. Cells are decoded against the result schema as
//! they are read.
//!
//! ## Authentication
//!
//! 1. Application Default Credentials (ADC)
//! 2. Service account JSON (inline bytes or a key file, parsed up front)
//! 3. Authorized user JSON (a refresh token, exchanged through `yup_oauth2`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! let connector = BigQueryConnector::new(BigQueryOptions::default().with_location("EU"));
//! let client = WarehouseClient::connect(
//!     &connector,
//!     &QueryContext::new(),
//!     "my-project",
//!     CredentialSource::ApplicationDefault,
//! ).await?;
//! ```
//!
//! Reference: https://cloud.google.com/bigquery/docs/reference/rest/v2/jobs/query

use crate::transport::{Connector, Transport};
use bqlink_core::{ClientConfig, Credentials, WarehouseError};

#[cfg(feature = "bigquery")]
use crate::transport::{DryRunStatus, Fetch, RowCursor};
#[cfg(feature = "bigquery")]
use bqlink_core::{decode_row, Field, FieldMode, FieldType, Row, Schema};
#[cfg(feature = "bigquery")]
use bqlink_core::AuthorizedUserCredentials;
#[cfg(feature = "bigquery")]
use gcp_bigquery_client::yup_oauth2::{
    authenticator::DefaultAuthenticator, authorized_user::AuthorizedUserSecret,
    AuthorizedUserAuthenticator,
};
#[cfg(feature = "bigquery")]
use gcp_bigquery_client::{
    auth::Authenticator,
    error::BQError,
    model::get_query_results_parameters::GetQueryResultsParameters,
    model::get_query_results_response::GetQueryResultsResponse,
    model::query_request::QueryRequest,
    model::query_response::QueryResponse,
    model::table_field_schema::TableFieldSchema,
    model::table_row::TableRow,
    model::table_schema::TableSchema,
    Client as BigQueryClient,
};
#[cfg(feature = "bigquery")]
use std::collections::VecDeque;
#[cfg(feature = "bigquery")]
use std::sync::Arc;
#[cfg(feature = "bigquery")]
use tracing::{debug, info};

/// Options applied to every request a BigQuery transport sends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BigQueryOptions {
    /// Dataset location; inferred by the service when unset
    pub location: Option<String>,

    /// Rows per result page
    pub page_size: Option<u32>,

    /// Server-side wait per query/results call
    pub job_timeout_ms: Option<u32>,

    /// Request the read-only scope for service accounts
    pub readonly: bool,
}

impl BigQueryOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            location: config.location.clone(),
            page_size: config.page_size,
            job_timeout_ms: config.job_timeout_ms,
            readonly: config.readonly,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[cfg(feature = "bigquery")]
    fn max_results(&self) -> Option<i32> {
        self.page_size.map(clamp_i32)
    }

    #[cfg(feature = "bigquery")]
    fn timeout_ms(&self) -> Option<i32> {
        self.job_timeout_ms.map(clamp_i32)
    }
}

#[cfg(feature = "bigquery")]
fn clamp_i32(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Connects to BigQuery with the resolved credentials
#[derive(Debug, Clone, Default)]
pub struct BigQueryConnector {
    options: BigQueryOptions,
}

impl BigQueryConnector {
    pub fn new(options: BigQueryOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BigQueryOptions {
        &self.options
    }
}

#[async_trait::async_trait]
impl Connector for BigQueryConnector {
    #[cfg(feature = "bigquery")]
    async fn connect(
        &self,
        project_id: &str,
        credentials: Credentials,
    ) -> Result<Box<dyn Transport>, WarehouseError> {
        let auth_kind = credentials.kind();

        let client = match credentials {
            Credentials::ApplicationDefault => BigQueryClient::from_application_default_credentials()
                .await
                .map_err(|e| connect_error(format!(
                    "Failed to authenticate with ADC: {}. \
                     Ensure GOOGLE_APPLICATION_CREDENTIALS is set or run 'gcloud auth application-default login'",
                    e
                )))?,
            Credentials::ServiceAccount(sa) => {
                let sa_key: gcp_bigquery_client::yup_oauth2::ServiceAccountKey =
                    serde_json::from_slice(sa.as_json()).map_err(|e| {
                        WarehouseError::CredentialParse(format!(
                            "Failed to parse service account JSON: {}",
                            e
                        ))
                    })?;

                BigQueryClient::from_service_account_key(sa_key, self.options.readonly)
                    .await
                    .map_err(|e| connect_error(format!(
                        "Failed to authenticate with service account {}: {}",
                        sa.client_email(),
                        e
                    )))?
            }
            Credentials::AuthorizedUser(user) => {
                let auth = UserAuthenticator::new(&user, self.options.readonly).await?;
                BigQueryClient::from_authenticator(Arc::new(auth))
                    .await
                    .map_err(|e| connect_error(format!(
                        "Failed to authenticate as user client {}: {}",
                        user.client_id(),
                        e
                    )))?
            }
        };

        info!(project_id = %project_id, auth = auth_kind, "BigQuery client connected");

        Ok(Box::new(BigQueryTransport {
            client: Arc::new(client),
            project_id: project_id.to_string(),
            options: self.options.clone(),
        }))
    }

    #[cfg(not(feature = "bigquery"))]
    async fn connect(
        &self,
        _project_id: &str,
        _credentials: Credentials,
    ) -> Result<Box<dyn Transport>, WarehouseError> {
        Err(WarehouseError::Config(
            "BigQuery support not compiled. Rebuild with: cargo build --features bigquery".to_string(),
        ))
    }
}

/// Network-level failures are connection errors; everything else the auth
/// layer reports is an authentication failure.
#[cfg(feature = "bigquery")]
fn connect_error(msg: String) -> WarehouseError {
    let lower = msg.to_lowercase();
    if ["error sending request", "connection", "dns", "timed out", "tcp"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        WarehouseError::Connection(msg)
    } else {
        WarehouseError::Authentication(msg)
    }
}

#[cfg(feature = "bigquery")]
const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

/// OAuth scopes requested for a connection
#[cfg(feature = "bigquery")]
fn scopes(readonly: bool) -> Vec<String> {
    if readonly {
        vec![format!("{}.readonly", BIGQUERY_SCOPE)]
    } else {
        vec![BIGQUERY_SCOPE.to_string()]
    }
}

/// Refresh-token authenticator built from in-memory user credentials
#[cfg(feature = "bigquery")]
#[derive(Clone)]
struct UserAuthenticator {
    auth: DefaultAuthenticator,
    scopes: Vec<String>,
}

#[cfg(feature = "bigquery")]
impl UserAuthenticator {
    async fn new(user: &AuthorizedUserCredentials, readonly: bool) -> Result<Self, WarehouseError> {
        let secret: AuthorizedUserSecret = serde_json::from_slice(user.as_json()).map_err(|e| {
            WarehouseError::CredentialParse(format!("Failed to parse authorized user JSON: {}", e))
        })?;

        let auth = AuthorizedUserAuthenticator::builder(secret)
            .build()
            .await
            .map_err(|e| WarehouseError::Authentication(format!(
                "Failed to build authorized user authenticator: {}",
                e
            )))?;

        Ok(Self {
            auth,
            scopes: scopes(readonly),
        })
    }
}

#[cfg(feature = "bigquery")]
#[async_trait::async_trait]
impl Authenticator for UserAuthenticator {
    async fn access_token(&self) -> Result<String, BQError> {
        let token = self.auth.token(self.scopes.as_slice()).await?;
        token.token().map(str::to_string).ok_or(BQError::NoToken)
    }
}

#[cfg(feature = "bigquery")]
fn query_error(e: impl std::fmt::Display) -> WarehouseError {
    WarehouseError::QueryExecution(e.to_string())
}

/// An authenticated BigQuery connection
#[cfg(feature = "bigquery")]
pub struct BigQueryTransport {
    client: Arc<BigQueryClient>,
    project_id: String,
    options: BigQueryOptions,
}

#[cfg(feature = "bigquery")]
impl BigQueryTransport {
    fn request(&self, query: &str) -> QueryRequest {
        let mut request = QueryRequest::new(query.to_string());
        request.location = self.options.location.clone();
        request.max_results = self.options.max_results();
        request.timeout_ms = self.options.timeout_ms();
        request
    }
}

#[cfg(feature = "bigquery")]
#[async_trait::async_trait]
impl Transport for BigQueryTransport {
    fn name(&self) -> &'static str {
        "BigQuery"
    }

    async fn open_cursor(&self, query: &str) -> Result<Box<dyn RowCursor>, WarehouseError> {
        debug!(project_id = %self.project_id, query_len = query.len(), "Submitting query");

        let response = self
            .client
            .job()
            .query(&self.project_id, self.request(query))
            .await
            .map_err(query_error)?;

        let mut buffer = PageBuffer::new(&self.project_id, self.options.location.clone());
        buffer.absorb(Page::from(response));

        Ok(Box::new(BigQueryCursor {
            client: Arc::clone(&self.client),
            options: self.options.clone(),
            buffer,
        }))
    }

    async fn dry_run(&self, query: &str) -> Result<DryRunStatus, WarehouseError> {
        let mut request = self.request(query);
        request.dry_run = Some(true);

        let response = self
            .client
            .job()
            .query(&self.project_id, request)
            .await
            .map_err(query_error)?;

        let status = dry_run_status(&response)?;
        debug!(
            project_id = %self.project_id,
            total_bytes_processed = status.total_bytes_processed,
            "Dry run planned"
        );
        Ok(status)
    }

    async fn close(&self) -> Result<(), WarehouseError> {
        // HTTP connections and cached tokens go away with the client
        info!(project_id = %self.project_id, "BigQuery client closed");
        Ok(())
    }
}

/// Pull the byte estimate out of a dry-run response
#[cfg(feature = "bigquery")]
fn dry_run_status(response: &QueryResponse) -> Result<DryRunStatus, WarehouseError> {
    let raw = response.total_bytes_processed.as_deref().ok_or_else(|| {
        WarehouseError::QueryExecution("dry run response has no totalBytesProcessed".to_string())
    })?;

    let total_bytes_processed = raw.parse::<i64>().map_err(|e| {
        WarehouseError::QueryExecution(format!("invalid totalBytesProcessed '{}': {}", raw, e))
    })?;

    Ok(DryRunStatus {
        total_bytes_processed,
        cache_hit: response.cache_hit.unwrap_or(false),
    })
}

/// The parts of a query or results response the cursor needs
#[cfg(feature = "bigquery")]
struct Page {
    schema: Option<TableSchema>,
    rows: Vec<TableRow>,
    page_token: Option<String>,
    job_complete: bool,
    total_rows: Option<u64>,
    job_id: Option<String>,
    job_project: Option<String>,
    location: Option<String>,
}

#[cfg(feature = "bigquery")]
impl From<QueryResponse> for Page {
    fn from(r: QueryResponse) -> Self {
        let job = r.job_reference.unwrap_or_default();
        Self {
            schema: r.schema,
            rows: r.rows.unwrap_or_default(),
            page_token: r.page_token,
            job_complete: r.job_complete.unwrap_or(false),
            total_rows: r.total_rows.and_then(|n| n.parse().ok()),
            job_id: job.job_id,
            job_project: job.project_id,
            location: job.location,
        }
    }
}

#[cfg(feature = "bigquery")]
impl From<GetQueryResultsResponse> for Page {
    fn from(r: GetQueryResultsResponse) -> Self {
        let job = r.job_reference.unwrap_or_default();
        Self {
            schema: r.schema,
            rows: r.rows.unwrap_or_default(),
            page_token: r.page_token,
            job_complete: r.job_complete.unwrap_or(false),
            total_rows: r.total_rows.and_then(|n| n.parse().ok()),
            job_id: job.job_id,
            job_project: job.project_id,
            location: job.location,
        }
    }
}

/// Cursor state that does not depend on the HTTP client
#[cfg(feature = "bigquery")]
struct PageBuffer {
    project_id: String,
    job_id: Option<String>,
    location: Option<String>,
    schema: Schema,
    rows: VecDeque<TableRow>,
    page_token: Option<String>,
    job_complete: bool,
    total_rows: Option<u64>,
}

#[cfg(feature = "bigquery")]
impl PageBuffer {
    fn new(project_id: &str, location: Option<String>) -> Self {
        Self {
            project_id: project_id.to_string(),
            job_id: None,
            location,
            schema: Schema::default(),
            rows: VecDeque::new(),
            page_token: None,
            job_complete: false,
            total_rows: None,
        }
    }

    fn absorb(&mut self, page: Page) {
        if let Some(schema) = page.schema.as_ref() {
            self.schema = convert_schema(schema);
        }
        self.rows.extend(page.rows);
        self.page_token = page.page_token;
        self.job_complete = page.job_complete;
        self.total_rows = page.total_rows.or(self.total_rows);
        self.job_id = page.job_id.or(self.job_id.take());
        if let Some(project) = page.job_project {
            self.project_id = project;
        }
        if page.location.is_some() {
            self.location = page.location;
        }
    }

    /// Decode the next buffered row, if any
    fn pop_row(&mut self) -> Option<Result<Row, WarehouseError>> {
        let row = self.rows.pop_front()?;
        let cells: Vec<_> = row
            .columns
            .unwrap_or_default()
            .into_iter()
            .map(|cell| cell.value)
            .collect();
        Some(decode_row(&self.schema, &cells))
    }

    /// Nothing buffered and nothing left on the server
    fn is_exhausted(&self) -> bool {
        self.rows.is_empty() && self.job_complete && self.page_token.is_none()
    }
}

/// Map a REST schema to the core schema
#[cfg(feature = "bigquery")]
fn convert_schema(schema: &TableSchema) -> Schema {
    Schema::from_fields(
        schema
            .fields
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(convert_field)
            .collect(),
    )
}

#[cfg(feature = "bigquery")]
fn convert_field(field: &TableFieldSchema) -> Field {
    // The client's FieldType serializes to the REST type name
    let field_type = serde_json::to_value(&field.r#type)
        .ok()
        .and_then(|v| v.as_str().map(FieldType::from_type_name))
        .unwrap_or(FieldType::Unknown);

    Field {
        name: field.name.clone(),
        field_type,
        mode: FieldMode::from_mode_name(field.mode.as_deref()),
        fields: field
            .fields
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(convert_field)
            .collect(),
    }
}

/// Paged cursor over a query job's results
#[cfg(feature = "bigquery")]
pub struct BigQueryCursor {
    client: Arc<BigQueryClient>,
    options: BigQueryOptions,
    buffer: PageBuffer,
}

#[cfg(feature = "bigquery")]
impl BigQueryCursor {
    async fn fetch_page(&mut self) -> Result<(), WarehouseError> {
        let job_id = self.buffer.job_id.clone().ok_or_else(|| {
            WarehouseError::QueryExecution("query response has no job reference".to_string())
        })?;

        let parameters = GetQueryResultsParameters {
            page_token: self.buffer.page_token.clone(),
            location: self.buffer.location.clone(),
            max_results: self.options.max_results(),
            timeout_ms: self.options.timeout_ms(),
            ..Default::default()
        };

        let response = self
            .client
            .job()
            .get_query_results(&self.buffer.project_id, &job_id, parameters)
            .await
            .map_err(query_error)?;

        self.buffer.absorb(Page::from(response));
        debug!(
            job_id = %job_id,
            buffered = self.buffer.rows.len(),
            job_complete = self.buffer.job_complete,
            "Fetched result page"
        );
        Ok(())
    }
}

#[cfg(feature = "bigquery")]
#[async_trait::async_trait]
impl RowCursor for BigQueryCursor {
    fn total_rows(&self) -> Option<u64> {
        self.buffer.total_rows
    }

    fn schema(&self) -> &Schema {
        &self.buffer.schema
    }

    async fn next(&mut self) -> Result<Fetch, WarehouseError> {
        loop {
            if let Some(row) = self.buffer.pop_row() {
                return row.map(Fetch::Row);
            }
            if self.buffer.is_exhausted() {
                return Ok(Fetch::Exhausted);
            }
            self.fetch_page().await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let config = ClientConfig::new("p").with_location("EU").with_page_size(250);
        let options = BigQueryOptions::from_config(&config);

        assert_eq!(options.location.as_deref(), Some("EU"));
        assert_eq!(options.page_size, Some(250));
        assert!(!options.readonly);
    }

    #[tokio::test]
    #[cfg(not(feature = "bigquery"))]
    async fn test_connect_without_feature() {
        let result = BigQueryConnector::default()
            .connect("p", Credentials::ApplicationDefault)
            .await;
        assert!(matches!(result, Err(WarehouseError::Config(_))));
    }

    #[cfg(feature = "bigquery")]
    mod rest {
        use super::super::*;
        use bqlink_core::Value;
        use pretty_assertions::assert_eq;
        use serde_json::json;

        fn query_response(body: serde_json::Value) -> QueryResponse {
            serde_json::from_value(body).unwrap()
        }

        #[test]
        fn test_convert_nested_schema() {
            let schema: TableSchema = serde_json::from_value(json!({
                "fields": [
                    {"name": "name", "type": "STRING", "mode": "REQUIRED"},
                    {"name": "tags", "type": "STRING", "mode": "REPEATED"},
                    {"name": "address", "type": "RECORD", "fields": [
                        {"name": "city", "type": "STRING"},
                        {"name": "zip", "type": "INTEGER"}
                    ]}
                ]
            }))
            .unwrap();

            let converted = convert_schema(&schema);
            assert_eq!(converted.column_names(), vec!["name", "tags", "address"]);
            assert_eq!(converted.fields[0].mode, FieldMode::Required);
            assert_eq!(converted.fields[1].mode, FieldMode::Repeated);
            assert_eq!(converted.fields[2].field_type, FieldType::Record);
            assert_eq!(converted.fields[2].fields[1].field_type, FieldType::Integer);
        }

        #[test]
        fn test_first_page_decodes_rows() {
            let response = query_response(json!({
                "jobComplete": true,
                "totalRows": "2",
                "jobReference": {"projectId": "proj", "jobId": "job_1", "location": "US"},
                "schema": {"fields": [
                    {"name": "name", "type": "STRING"},
                    {"name": "age", "type": "INTEGER"}
                ]},
                "rows": [
                    {"f": [{"v": "Alice"}, {"v": "30"}]},
                    {"f": [{"v": "Bob"}, {"v": "25"}]}
                ]
            }));

            let mut buffer = PageBuffer::new("proj", None);
            buffer.absorb(Page::from(response));

            assert_eq!(buffer.total_rows, Some(2));
            assert_eq!(buffer.job_id.as_deref(), Some("job_1"));
            assert_eq!(buffer.location.as_deref(), Some("US"));

            let first = buffer.pop_row().unwrap().unwrap();
            assert_eq!(first, vec![Value::from("Alice"), Value::Int(30)]);
            let second = buffer.pop_row().unwrap().unwrap();
            assert_eq!(second, vec![Value::from("Bob"), Value::Int(25)]);

            assert!(buffer.pop_row().is_none());
            assert!(buffer.is_exhausted());
        }

        #[test]
        fn test_incomplete_job_is_not_exhausted() {
            let response = query_response(json!({
                "jobComplete": false,
                "jobReference": {"projectId": "proj", "jobId": "job_2"}
            }));

            let mut buffer = PageBuffer::new("proj", None);
            buffer.absorb(Page::from(response));

            assert!(buffer.pop_row().is_none());
            assert!(!buffer.is_exhausted());
            assert!(buffer.schema.is_empty());
        }

        fn results_response(body: serde_json::Value) -> GetQueryResultsResponse {
            serde_json::from_value(body).unwrap()
        }

        #[test]
        fn test_rows_accumulate_across_result_pages() {
            // The job was still running when jobs.query returned
            let mut buffer = PageBuffer::new("proj", None);
            buffer.absorb(Page::from(query_response(json!({
                "jobComplete": false,
                "jobReference": {"projectId": "proj", "jobId": "job_4", "location": "EU"}
            }))));
            assert!(!buffer.is_exhausted());

            buffer.absorb(Page::from(results_response(json!({
                "jobComplete": true,
                "totalRows": "3",
                "pageToken": "page-3",
                "jobReference": {"projectId": "proj", "jobId": "job_4", "location": "EU"},
                "schema": {"fields": [
                    {"name": "n", "type": "INTEGER"},
                    {"name": "label", "type": "STRING"}
                ]},
                "rows": [
                    {"f": [{"v": "1"}, {"v": "one"}]},
                    {"f": [{"v": "2"}, {"v": "two"}]}
                ]
            }))));

            assert_eq!(buffer.schema.column_names(), vec!["n", "label"]);
            assert_eq!(buffer.total_rows, Some(3));
            assert_eq!(buffer.page_token.as_deref(), Some("page-3"));
            assert_eq!(buffer.pop_row().unwrap().unwrap(), vec![Value::Int(1), Value::from("one")]);

            // Later pages may omit the schema; the first one seen is kept
            buffer.absorb(Page::from(results_response(json!({
                "jobComplete": true,
                "jobReference": {"projectId": "proj", "jobId": "job_4"},
                "rows": [{"f": [{"v": "3"}, {"v": "three"}]}]
            }))));

            assert_eq!(buffer.job_id.as_deref(), Some("job_4"));
            assert_eq!(buffer.location.as_deref(), Some("EU"));
            assert_eq!(buffer.total_rows, Some(3));
            assert_eq!(buffer.pop_row().unwrap().unwrap(), vec![Value::Int(2), Value::from("two")]);
            assert_eq!(buffer.pop_row().unwrap().unwrap(), vec![Value::Int(3), Value::from("three")]);
            assert!(buffer.pop_row().is_none());
            assert!(buffer.is_exhausted());
        }

        #[test]
        fn test_page_token_keeps_cursor_open() {
            let response = query_response(json!({
                "jobComplete": true,
                "pageToken": "next",
                "jobReference": {"projectId": "proj", "jobId": "job_3"},
                "schema": {"fields": [{"name": "n", "type": "INTEGER"}]},
                "rows": [{"f": [{"v": "1"}]}]
            }));

            let mut buffer = PageBuffer::new("proj", None);
            buffer.absorb(Page::from(response));

            assert!(buffer.pop_row().unwrap().is_ok());
            assert!(!buffer.is_exhausted());
            assert_eq!(buffer.page_token.as_deref(), Some("next"));
        }

        #[test]
        fn test_dry_run_status() {
            let response = query_response(json!({
                "jobComplete": true,
                "totalBytesProcessed": "1048576",
                "cacheHit": false
            }));
            let status = dry_run_status(&response).unwrap();
            assert_eq!(status.total_bytes_processed, 1_048_576);
            assert!(!status.cache_hit);

            let missing = query_response(json!({"jobComplete": true}));
            assert!(matches!(
                dry_run_status(&missing),
                Err(WarehouseError::QueryExecution(_))
            ));
        }

        #[test]
        fn test_authorized_user_secret_accepted_by_auth_library() {
            let json = br#"{
                "type": "authorized_user",
                "client_id": "client.apps.googleusercontent.com",
                "client_secret": "secret",
                "refresh_token": "1//refresh"
            }"#;

            let Ok(Credentials::AuthorizedUser(user)) = Credentials::from_json(json) else {
                panic!("expected user credentials");
            };
            let secret: AuthorizedUserSecret = serde_json::from_slice(user.as_json()).unwrap();
            assert_eq!(secret.client_id, "client.apps.googleusercontent.com");
            assert_eq!(secret.refresh_token, "1//refresh");
        }

        #[test]
        fn test_scopes() {
            assert_eq!(scopes(false), vec!["https://www.googleapis.com/auth/bigquery"]);
            assert_eq!(scopes(true), vec!["https://www.googleapis.com/auth/bigquery.readonly"]);
        }

        #[test]
        fn test_connect_error_classification() {
            assert!(matches!(
                connect_error("error sending request for url".to_string()),
                WarehouseError::Connection(_)
            ));
            assert!(matches!(
                connect_error("invalid_grant: account not found".to_string()),
                WarehouseError::Authentication(_)
            ));
        }
    }
}
