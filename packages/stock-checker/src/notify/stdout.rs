use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use stock_judge::{NotifyResult, ReportLog};

/// Writes the report body to stdout. Logs go to stderr, so stdout carries
/// nothing but reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutReportLog;

#[async_trait]
impl ReportLog for StdoutReportLog {
    async fn record(&self, body: &str) -> NotifyResult<()> {
        let mut out = tokio::io::stdout();
        out.write_all(body.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
        Ok(())
    }
}
