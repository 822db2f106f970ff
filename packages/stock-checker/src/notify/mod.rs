//! Report delivery.
//!
//! - [`smtp`] - Mail alert over SMTP
//! - [`stdout`] - Report log on standard output

pub mod smtp;
pub mod stdout;

pub use smtp::SmtpNotifier;
pub use stdout::StdoutReportLog;
