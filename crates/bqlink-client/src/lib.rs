//! BigQuery client adapter
//!
//! A thin handle over a BigQuery connection with three ways to authenticate
//! and three query operations:
//!
//! - [`WarehouseClient::query`]: column names plus name-keyed rows
//! - [`WarehouseClient::raw_query`]: schema plus positional rows
//! - [`WarehouseClient::query_dry_run`]: bytes the query would scan
//!
//! ## Features
//!
//! - `bigquery` (default) - the `gcp-bigquery-client` backed transport
//!
//! ## Example
//!
//! ```rust,ignore
//! use bqlink_client::WarehouseClient;
//! use bqlink_core::QueryContext;
//!
//! let ctx = QueryContext::new();
//! let client = WarehouseClient::with_credentials_path(&ctx, "key.json", "my-project").await?;
//! let out = client.query(&ctx, "SELECT name, age FROM `my-project.ds.people`").await?;
//! for row in &out.contents {
//!     println!("{:?}", row["name"]);
//! }
//! client.close().await?;
//! ```

pub mod bigquery;
pub mod client;
pub mod mock;
pub mod transport;

pub use bigquery::{BigQueryConnector, BigQueryOptions};
pub use client::{QueryOutput, RawQueryOutput, WarehouseClient};
pub use mock::{MockConnector, MockResponse, MockStep, MockTransport, MockTransportBuilder};
pub use transport::{Connector, DryRunStatus, Fetch, RowCursor, Transport};
