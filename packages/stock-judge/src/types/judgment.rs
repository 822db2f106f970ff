//! Per-target outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::target::Target;

/// The public outcome for one target. Callers only ever see these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockState {
    InStock,
    OutOfStock,
    FetchFailed,
}

impl StockState {
    /// Label used in report lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InStock => "⭐ IN STOCK ⭐",
            Self::OutOfStock => "out of stock",
            Self::FetchFailed => "fetch failed",
        }
    }

    pub fn is_in_stock(&self) -> bool {
        matches!(self, Self::InStock)
    }
}

impl fmt::Display for StockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a target ended up `FetchFailed`. Only surfaces in diagnostic tags and
/// logs, never in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Non-success response, navigation error or navigation timeout
    Transport,

    /// Neither signal category visible once the budget was spent
    InconclusiveRender,

    /// Anything else that went wrong during judgment
    Unexpected,
}

impl FailureKind {
    /// Tag used to name diagnostic artifacts.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Transport => "http_error",
            Self::InconclusiveRender => "unknown",
            Self::Unexpected => "exception",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The judgment for one target in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub target: Target,
    pub state: StockState,

    /// Name of the signal the resolver saw, if any
    pub matched_signal: Option<String>,

    /// Set only when `state` is `FetchFailed`
    pub failure: Option<FailureKind>,

    /// Wall time spent on this target
    pub elapsed: Duration,
}

impl Judgment {
    pub fn resolved(
        target: Target,
        state: StockState,
        matched_signal: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            target,
            state,
            matched_signal: Some(matched_signal.into()),
            failure: None,
            elapsed,
        }
    }

    pub fn failed(target: Target, kind: FailureKind, elapsed: Duration) -> Self {
        Self {
            target,
            state: StockState::FetchFailed,
            matched_signal: None,
            failure: Some(kind),
            elapsed,
        }
    }

    /// `- <url> — <label>`
    pub fn report_line(&self) -> String {
        format!("- {} — {}", self.target.url, self.state.label())
    }
}
