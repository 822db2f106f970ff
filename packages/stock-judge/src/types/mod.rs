//! Domain types for the judgment engine.

pub mod config;
pub mod judgment;
pub mod report;
pub mod signal;
pub mod target;

pub use config::{JudgeConfig, ReportZone};
pub use judgment::{FailureKind, Judgment, StockState};
pub use report::Report;
pub use signal::{Matcher, Signal, SignalRole, SignalSet};
pub use target::{Catalog, Target};
