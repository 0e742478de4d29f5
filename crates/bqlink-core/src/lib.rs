//! bqlink core
//!
//! Domain types shared by the warehouse client: result schemas, the closed
//! value type rows decode into, credentials, configuration, cancellation
//! contexts and the error taxonomy. Nothing here touches the network.

pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod schema;
pub mod value;

pub use config::{ClientConfig, ConfigError, CredentialsConfig};
pub use context::QueryContext;
pub use credentials::{
    read_credentials, AuthorizedUserCredentials, CredentialSource, Credentials,
    ServiceAccountCredentials,
};
pub use error::WarehouseError;
pub use schema::{Field, FieldMode, FieldType, Schema};
pub use value::{decode_cell, decode_row, structure_row, Row, StructuredRow, Value};
