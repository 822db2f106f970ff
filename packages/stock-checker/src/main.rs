//! Stock checker
//!
//! Checks every page in the watchlist once, prints the report to stdout,
//! writes diagnostics for pages that could not be judged and mails an alert
//! when anything is in stock. Meant to be run from cron or a CI schedule.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use stock_checker::{ChromiumBrowser, Config, SmtpNotifier, StdoutReportLog, Watchlist};
use stock_judge::{dispatch, FsDiagnosticStore, JudgeConfig, Notifier, StockChecker};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stock-checker")]
#[command(about = "Check product pages for stock and mail an alert when something can be bought")]
struct Cli {
    /// Watchlist JSON file (overrides WATCHLIST_PATH)
    #[arg(long)]
    watchlist: Option<PathBuf>,

    /// Directory for diagnostic screenshots and markup (overrides ARTIFACTS_DIR)
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Print the report without sending mail; SMTP settings are not required
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout is reserved for the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stock_judge=info,chromiumoxide=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env(!cli.dry_run).context("Failed to load configuration")?;
    if let Some(path) = cli.watchlist {
        config.watchlist_path = path;
    }
    if let Some(dir) = cli.artifacts {
        config.artifacts_dir = dir;
    }
    if cli.headed {
        config.chromium.headless = false;
    }

    let watchlist = Watchlist::load(&config.watchlist_path).await?;
    tracing::info!(
        watchlist = %config.watchlist_path.display(),
        targets = watchlist.targets.len(),
        dry_run = cli.dry_run,
        "Starting stock checker"
    );

    let judge_config = JudgeConfig::new(watchlist.signals)
        .with_subject(watchlist.subject)
        .with_wait_budget(config.wait_budget)
        .with_navigation_timeout(config.navigation_timeout)
        .with_capture_timeout(config.capture_timeout)
        .with_report_zone(config.report_zone.clone())
        .with_session(config.session_profile());

    let checker = StockChecker::new(
        ChromiumBrowser::new(config.chromium.clone()),
        FsDiagnosticStore::new(&config.artifacts_dir),
        judge_config,
    );

    let report = checker
        .run_all(&watchlist.targets)
        .await
        .context("Stock check failed")?;

    let notifier = config.smtp.map(SmtpNotifier::new);
    let outcome = dispatch(
        &report,
        &StdoutReportLog,
        notifier.as_ref().map(|n| n as &dyn Notifier),
    )
    .await
    .context("Failed to send stock alert")?;

    tracing::info!(
        outcome = ?outcome,
        any_in_stock = report.any_in_stock,
        "Done"
    );
    Ok(())
}
