//! Judgment pipeline.
//!
//! - [`navigation`] - Navigation gate
//! - [`detector`] - Race-based signal detector
//! - [`resolver`] - Priority resolver
//! - [`capture`] - Diagnostic capturer
//! - [`judge`] - Per-target boundary
//! - [`runner`] - Run aggregator
//! - [`dispatch`] - Report dispatch

pub mod capture;
pub mod detector;
pub mod dispatch;
pub mod judge;
pub mod navigation;
pub mod resolver;
pub mod runner;

pub use capture::{artifact_id, capture};
pub use detector::await_any_signal;
pub use dispatch::{dispatch, DispatchOutcome};
pub use judge::Judge;
pub use navigation::{navigate, NavigationOutcome};
pub use resolver::{resolve, Resolution};
pub use runner::StockChecker;
