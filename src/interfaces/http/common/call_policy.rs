//! Per-request call context construction

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::shared::CallContext;

/// Deadline and parent cancellation applied to every directory call a
/// request makes.
#[derive(Debug, Clone, Default)]
pub struct CallPolicy {
    pub store_timeout: Option<Duration>,
    /// Server shutdown token; canceling it aborts in-flight store calls
    pub shutdown: CancellationToken,
}

impl CallPolicy {
    pub fn new(store_timeout: Option<Duration>, shutdown: CancellationToken) -> Self {
        Self {
            store_timeout,
            shutdown,
        }
    }

    pub fn context(&self) -> CallContext {
        let ctx = CallContext::child_of(&self.shutdown);
        match self.store_timeout {
            Some(limit) => ctx.with_timeout(limit),
            None => ctx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_carries_timeout_and_follows_shutdown() {
        let shutdown = CancellationToken::new();
        let policy = CallPolicy::new(Some(Duration::from_millis(250)), shutdown.clone());

        let ctx = policy.context();
        assert_eq!(ctx.timeout(), Some(Duration::from_millis(250)));
        assert!(!ctx.is_canceled());

        shutdown.cancel();
        assert!(ctx.is_canceled());
    }
}
