//! Report dispatch: always log, alert only when something is in stock.

use tracing::{info, warn};

use crate::error::NotifyResult;
use crate::traits::notify::{Notifier, ReportLog};
use crate::types::report::Report;

/// What [`dispatch`] did with the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Logged; nothing in stock
    Logged,

    /// Logged and the notifier was alerted
    Notified,

    /// Something is in stock but no notifier was configured
    AlertSuppressed,
}

/// Hand the report to its collaborators.
///
/// The log is written first and its failure only warned about. A notifier
/// failure is returned, after the log has been written.
pub async fn dispatch(
    report: &Report,
    log: &dyn ReportLog,
    notifier: Option<&dyn Notifier>,
) -> NotifyResult<DispatchOutcome> {
    let body = report.body();

    if let Err(e) = log.record(&body).await {
        warn!(error = %e, "Failed to write report log");
    }

    if !report.any_in_stock {
        return Ok(DispatchOutcome::Logged);
    }

    let Some(notifier) = notifier else {
        info!("Items in stock, alerting disabled");
        return Ok(DispatchOutcome::AlertSuppressed);
    };

    let subject = report.alert_subject();
    notifier.notify(&subject, &body).await?;
    info!(notifier = notifier.name(), subject = %subject, "Alert sent");

    Ok(DispatchOutcome::Notified)
}
