//! Transport traits the client drives
//!
//! The client never talks to the network itself. A [`Connector`] turns
//! credentials into a [`Transport`]; the transport submits queries, opens
//! [`RowCursor`]s and reports dry-run statistics. Pooling, retries and token
//! refresh all live behind these traits.

use bqlink_core::{Credentials, Row, Schema, WarehouseError};

/// One step of a cursor
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch {
    /// The next row, in service order
    Row(Row),

    /// Normal end of the result set; not an error
    Exhausted,
}

/// Statistics reported for a dry-run job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DryRunStatus {
    /// Bytes the query would scan if it were run
    pub total_bytes_processed: i64,

    /// Whether the service would answer from its result cache
    pub cache_hit: bool,
}

/// Forward-only, server-backed iterator over result rows
#[async_trait::async_trait]
pub trait RowCursor: Send {
    /// Row count reported by the service, if any
    ///
    /// Only an allocation hint; the cursor may yield more or fewer rows.
    fn total_rows(&self) -> Option<u64>;

    /// Schema as currently known
    ///
    /// Only reliable after the first fetch or a full drain, since the
    /// service may not report it before the job completes.
    fn schema(&self) -> &Schema;

    /// Fetch the next row or learn that the result set is exhausted
    async fn next(&mut self) -> Result<Fetch, WarehouseError>;
}

/// An authenticated connection to the warehouse
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Transport name (e.g., "BigQuery", "Mock")
    fn name(&self) -> &'static str;

    /// Submit a query and return a cursor over its results
    async fn open_cursor(&self, query: &str) -> Result<Box<dyn RowCursor>, WarehouseError>;

    /// Submit a query flagged as a dry run and return the job statistics
    async fn dry_run(&self, query: &str) -> Result<DryRunStatus, WarehouseError>;

    /// Release connection resources
    async fn close(&self) -> Result<(), WarehouseError>;
}

/// Builds transports from resolved credentials
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        project_id: &str,
        credentials: Credentials,
    ) -> Result<Box<dyn Transport>, WarehouseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_is_not_a_row() {
        assert_ne!(Fetch::Exhausted, Fetch::Row(Vec::new()));
        assert_eq!(DryRunStatus::default().total_bytes_processed, 0);
    }
}
