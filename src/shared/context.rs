//! Per-call cancellation and deadline
//!
//! Every partner directory call receives a [`CallContext`]. The store
//! future is raced against the context's cancellation token and deadline;
//! whichever loses is dropped, so an aborted call leaves no partial write.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::shared::types::{DomainError, DomainResult};

#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl CallContext {
    /// A context that never times out and is only canceled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context from a parent token (e.g. the server shutdown token).
    /// Canceling the parent cancels this context, not the other way round.
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self {
            cancel: parent.child_token(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `operation` to completion unless the context is canceled or
    /// the deadline passes first.
    pub async fn run<F, T>(&self, operation: &'static str, fut: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        if self.is_canceled() {
            return Err(DomainError::Canceled);
        }

        match self.timeout() {
            Some(limit) => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(DomainError::Canceled),
                    result = tokio::time::timeout(limit, fut) => match result {
                        Ok(inner) => inner,
                        Err(_) => Err(DomainError::Timeout(operation.to_string())),
                    },
                }
            }
            None => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(DomainError::Canceled),
                    result = fut => result,
                }
            }
        }
    }
}
