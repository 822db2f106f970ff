//! Report delivery collaborators.

use async_trait::async_trait;

use crate::error::NotifyResult;

/// Alert channel. Called at most once per run, only when something is in stock.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> NotifyResult<()>;

    /// Get the notifier name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Receives the full report body once per run, unconditionally.
#[async_trait]
pub trait ReportLog: Send + Sync {
    async fn record(&self, body: &str) -> NotifyResult<()>;
}
