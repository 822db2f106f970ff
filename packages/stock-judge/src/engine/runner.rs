//! Run aggregator: one session, one page, every target in catalog order.

use chrono::Utc;
use tracing::{info, warn};

use super::judge::Judge;
use crate::error::{CheckError, CheckResult};
use crate::traits::browser::{Browser, Session};
use crate::traits::store::DiagnosticStore;
use crate::types::config::JudgeConfig;
use crate::types::report::{Report, ReportBuilder};
use crate::types::target::{Catalog, Target};

/// Checks a whole catalog and builds the report.
///
/// # Example
///
/// ```rust,ignore
/// let checker = StockChecker::new(browser, FsDiagnosticStore::new("artifacts"), config);
/// let report = checker.run_all(&catalog).await?;
/// if report.any_in_stock {
///     // alert
/// }
/// ```
pub struct StockChecker<B, S> {
    browser: B,
    store: S,
    config: JudgeConfig,
}

impl<B: Browser, S: DiagnosticStore> StockChecker<B, S> {
    pub fn new(browser: B, store: S, config: JudgeConfig) -> Self {
        Self {
            browser,
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Judge every target and build the report.
    ///
    /// Only setup failures (invalid catalog or config, session or page
    /// creation) are returned as errors. The session is closed on every path
    /// once it has been opened.
    pub async fn run_all(&self, catalog: &Catalog) -> CheckResult<Report> {
        catalog.validate()?;
        self.config.validate()?;

        info!(
            targets = catalog.len(),
            browser = self.browser.name(),
            store = self.store.name(),
            "Starting stock check"
        );

        let mut session = self
            .browser
            .launch(&self.config.session)
            .await
            .map_err(CheckError::Launch)?;

        let result = self.run_in_session(&session, catalog).await;

        if let Err(e) = session.close().await {
            warn!(error = %e, "Failed to close browsing session");
        }

        result
    }

    async fn run_in_session(&self, session: &B::Session, catalog: &Catalog) -> CheckResult<Report> {
        let page = session.new_page().await.map_err(CheckError::Page)?;
        let judge = Judge::new(&self.config, &self.store);
        let mut report =
            ReportBuilder::new(&self.config.subject, Utc::now(), &self.config.report_zone);

        for (category, urls) in catalog.categories() {
            if urls.is_empty() {
                continue;
            }
            report.category(category);

            for url in urls {
                let target = Target::new(url.as_str(), category);
                let judgment = judge.judge(&page, &target).await;

                info!(
                    url = %judgment.target.url,
                    state = %judgment.state,
                    elapsed_ms = judgment.elapsed.as_millis() as u64,
                    "Target judged"
                );
                report.push(judgment);
            }
        }

        let report = report.finish();
        info!(
            judged = report.judgments.len(),
            any_in_stock = report.any_in_stock,
            "Stock check complete"
        );
        Ok(report)
    }
}
