//! Warehouse client handle
//!
//! [`WarehouseClient`] owns one [`Transport`]. Every factory resolves its
//! credentials and funnels through [`WarehouseClient::connect`], so the
//! construction path only changes how the handle authenticates, never how
//! queries behave.

use crate::bigquery::{BigQueryConnector, BigQueryOptions};
use crate::transport::{Connector, Fetch, Transport};
use bqlink_core::{
    structure_row, ClientConfig, CredentialSource, QueryContext, Row, Schema, StructuredRow,
    WarehouseError,
};
use std::path::Path;
use tracing::{debug, info};

/// Upper bound on rows pre-allocated from the service's row-count hint
const MAX_PREALLOCATED_ROWS: usize = 64 * 1024;

/// Schema and positional rows of a query result
#[derive(Debug, Clone, PartialEq)]
pub struct RawQueryOutput {
    pub schema: Schema,
    pub rows: Vec<Row>,
}

/// Column names and name-keyed rows of a query result
///
/// `contents[i][&columns[j]]` is the value of column `j` in row `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub contents: Vec<StructuredRow>,
}

/// A live handle to the warehouse
///
/// Results are fully materialized in memory before they are returned, which
/// suits bounded result sets only.
pub struct WarehouseClient {
    transport: Box<dyn Transport>,
}

impl WarehouseClient {
    /// Connect with Application Default Credentials
    pub async fn new(ctx: &QueryContext, project_id: &str) -> Result<Self, WarehouseError> {
        Self::connect(
            &BigQueryConnector::default(),
            ctx,
            project_id,
            CredentialSource::ApplicationDefault,
        )
        .await
    }

    /// Connect with service-account or user credential JSON held in memory
    pub async fn with_credentials(
        ctx: &QueryContext,
        credentials: &[u8],
        project_id: &str,
    ) -> Result<Self, WarehouseError> {
        Self::connect(
            &BigQueryConnector::default(),
            ctx,
            project_id,
            CredentialSource::Json(credentials.to_vec()),
        )
        .await
    }

    /// Connect with a credential JSON file, read once from local disk
    pub async fn with_credentials_path(
        ctx: &QueryContext,
        credentials_path: impl AsRef<Path>,
        project_id: &str,
    ) -> Result<Self, WarehouseError> {
        Self::connect(
            &BigQueryConnector::default(),
            ctx,
            project_id,
            CredentialSource::File(credentials_path.as_ref().to_path_buf()),
        )
        .await
    }

    /// Connect as described by a [`ClientConfig`]
    pub async fn from_config(ctx: &QueryContext, config: &ClientConfig) -> Result<Self, WarehouseError> {
        config.validate()?;

        let connector = BigQueryConnector::new(BigQueryOptions::from_config(config));
        Self::connect(&connector, ctx, &config.project_id, config.credential_source()).await
    }

    /// Resolve credentials and connect through any [`Connector`]
    ///
    /// Credential files are read synchronously before the context is
    /// consulted for the network step.
    pub async fn connect(
        connector: &dyn Connector,
        ctx: &QueryContext,
        project_id: &str,
        source: CredentialSource,
    ) -> Result<Self, WarehouseError> {
        if project_id.trim().is_empty() {
            return Err(WarehouseError::Connection(
                "cannot connect without a project id".to_string(),
            ));
        }

        let credentials = source.resolve()?;
        let auth_kind = credentials.kind();

        let transport = ctx.run(connector.connect(project_id, credentials)).await?;
        info!(
            project_id = %project_id,
            auth = auth_kind,
            transport = transport.name(),
            "Warehouse client created"
        );

        Ok(Self::from_transport(transport))
    }

    /// Wrap an already connected transport
    pub fn from_transport(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Name of the underlying transport
    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Release the connection; the handle cannot be used afterwards
    pub async fn close(self) -> Result<(), WarehouseError> {
        let name = self.transport.name();
        self.transport.close().await?;
        info!(transport = name, "Warehouse client closed");
        Ok(())
    }

    /// Run a query and drain every row into memory
    ///
    /// The query text is passed through verbatim. The first cursor error
    /// aborts the drain and the rows read so far are dropped.
    pub async fn raw_query(&self, ctx: &QueryContext, query: &str) -> Result<RawQueryOutput, WarehouseError> {
        let mut cursor = ctx.run(self.transport.open_cursor(query)).await?;

        let hint = cursor
            .total_rows()
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX).min(MAX_PREALLOCATED_ROWS))
            .unwrap_or(0);
        let mut rows = Vec::with_capacity(hint);

        loop {
            match ctx.run(cursor.next()).await? {
                Fetch::Row(row) => rows.push(row),
                Fetch::Exhausted => break,
            }
        }

        // Only stable once the cursor has been drained
        let schema = cursor.schema().clone();
        debug!(rows = rows.len(), columns = schema.len(), "Query drained");

        Ok(RawQueryOutput { schema, rows })
    }

    /// Run a query and key every row by column name
    pub async fn query(&self, ctx: &QueryContext, query: &str) -> Result<QueryOutput, WarehouseError> {
        let RawQueryOutput { schema, rows } = self.raw_query(ctx, query).await?;

        let columns = schema.column_names();
        let contents = rows
            .into_iter()
            .map(|row| structure_row(&columns, row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryOutput { columns, contents })
    }

    /// Plan a query without running it and return the bytes it would scan
    pub async fn query_dry_run(&self, ctx: &QueryContext, query: &str) -> Result<i64, WarehouseError> {
        let status = ctx.run(self.transport.dry_run(query)).await?;
        Ok(status.total_bytes_processed)
    }
}

impl std::fmt::Debug for WarehouseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarehouseClient")
            .field("transport", &self.transport.name())
            .finish()
    }
}
