//! Cancellation and deadline propagation for warehouse calls

use crate::error::WarehouseError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Caller-supplied operation context
///
/// Every network step an operation performs is raced against the context.
/// Cancelling the token or passing the deadline aborts the in-flight step
/// and surfaces [`WarehouseError::Cancelled`] or
/// [`WarehouseError::DeadlineExceeded`].
///
/// Contexts are cheap to clone; clones share the same token.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl QueryContext {
    /// A context that never cancels on its own
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token, e.g. one shared with a shutdown signal
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Builder: expire at an absolute instant
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Builder: expire after `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context cancelled together with this one, but which can also
    /// be cancelled on its own
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the context has already ended
    pub fn check(&self) -> Result<(), WarehouseError> {
        if self.token.is_cancelled() {
            return Err(WarehouseError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(WarehouseError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Run `fut` until it completes or the context ends, whichever is first
    ///
    /// Cancellation is checked before the future is polled, so an already
    /// cancelled context never starts the step.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, WarehouseError>
    where
        F: Future<Output = Result<T, WarehouseError>>,
    {
        self.check()?;

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(WarehouseError::Cancelled),
            _ = expired => Err(WarehouseError::DeadlineExceeded),
            result = fut => result,
        }
    }
}
