//! Stock checker application.
//!
//! Wires the `stock-judge` engine to a real browser (Chromium over CDP), a
//! filesystem diagnostic store, stdout for the report and SMTP for alerts.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`watchlist`] - Watchlist file (signals and targets)
//! - [`browser`] - Chromium browsing capability
//! - [`notify`] - SMTP notifier and stdout report log

pub mod browser;
pub mod config;
pub mod notify;
pub mod watchlist;

pub use browser::ChromiumBrowser;
pub use config::{ChromiumOptions, Config, SmtpConfig};
pub use notify::{SmtpNotifier, StdoutReportLog};
pub use watchlist::Watchlist;
