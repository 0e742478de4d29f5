//! Error taxonomy shared by every warehouse operation

/// Errors that can occur while constructing a client or running a query
///
/// Every operation returns the first error it hits. Nothing is retried and
/// no partial result travels alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WarehouseError {
    /// Local credential or config file could not be opened or read in full
    #[error("IO error: {0}")]
    Io(String),

    /// Credential bytes are not a usable service credential
    #[error("Credential parse error: {0}")]
    CredentialParse(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Submission, cursor iteration or job status retrieval failed
    #[error("Query failed: {0}")]
    QueryExecution(String),

    /// The caller's context was cancelled mid-operation
    #[error("Operation cancelled")]
    Cancelled,

    /// The caller's context deadline passed mid-operation
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WarehouseError {
    /// True when the caller's context ended the operation, as opposed to a
    /// failure reported by the service or the local environment.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    pub(crate) fn query(msg: impl std::fmt::Display) -> Self {
        Self::QueryExecution(msg.to_string())
    }
}

impl From<std::io::Error> for WarehouseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_distinct_from_service_errors() {
        assert!(WarehouseError::Cancelled.is_cancellation());
        assert!(WarehouseError::DeadlineExceeded.is_cancellation());
        assert!(!WarehouseError::QueryExecution("boom".into()).is_cancellation());
        assert!(!WarehouseError::Connection("refused".into()).is_cancellation());
    }

    #[test]
    fn io_errors_convert() {
        let err: WarehouseError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file").into();
        assert!(matches!(err, WarehouseError::Io(msg) if msg.contains("no such file")));
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            WarehouseError::QueryExecution("syntax error".into()).to_string(),
            "Query failed: syntax error"
        );
        assert_eq!(WarehouseError::Cancelled.to_string(), "Operation cancelled");
    }
}
