//! Per-target judgment: navigate, detect, resolve, and capture on failure.
//!
//! This is the target boundary. Whatever happens inside (a transport failure,
//! a browser error, a panic in a driver) comes out as exactly one
//! [`Judgment`], and a failed judgment triggers exactly one capture.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use super::capture::capture;
use super::detector::await_any_signal;
use super::navigation::{navigate, NavigationOutcome};
use super::resolver::{resolve, Resolution};
use crate::error::BrowseResult;
use crate::traits::browser::Page;
use crate::traits::store::DiagnosticStore;
use crate::types::config::JudgeConfig;
use crate::types::judgment::{FailureKind, Judgment, StockState};
use crate::types::target::Target;

enum Verdict {
    Resolved(StockState, String),
    Failed(FailureKind),
}

/// Judges targets on a page using one configuration and one diagnostic store.
pub struct Judge<'a, S: ?Sized> {
    config: &'a JudgeConfig,
    store: &'a S,
}

impl<'a, S: DiagnosticStore + ?Sized> Judge<'a, S> {
    pub fn new(config: &'a JudgeConfig, store: &'a S) -> Self {
        Self { config, store }
    }

    /// Judge one target. Never fails.
    pub async fn judge<P: Page + ?Sized>(&self, page: &P, target: &Target) -> Judgment {
        let started = Instant::now();

        let verdict = match AssertUnwindSafe(self.evaluate(page, target))
            .catch_unwind()
            .await
        {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                warn!(url = %target.url, error = %e, "Target check failed");
                Verdict::Failed(FailureKind::Unexpected)
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(url = %target.url, panic = %message, "Target check panicked");
                Verdict::Failed(FailureKind::Unexpected)
            }
        };

        match verdict {
            Verdict::Resolved(state, signal) => {
                Judgment::resolved(target.clone(), state, signal, started.elapsed())
            }
            Verdict::Failed(kind) => {
                self.capture_diagnostics(page, target, kind).await;
                Judgment::failed(target.clone(), kind, started.elapsed())
            }
        }
    }

    async fn evaluate<P: Page + ?Sized>(&self, page: &P, target: &Target) -> BrowseResult<Verdict> {
        if let NavigationOutcome::TransportFailure { .. } =
            navigate(page, target, self.config.navigation_timeout).await
        {
            return Ok(Verdict::Failed(FailureKind::Transport));
        }

        let signals = &self.config.signals;
        let first = await_any_signal(page, signals.all(), self.config.wait_budget).await;
        debug!(url = %target.url, first = ?first.map(|s| s.name.as_str()), "Detector returned");

        let verdict = match resolve(page, signals.out_of_stock(), signals.available()).await? {
            Resolution::OutOfStock { signal } => Verdict::Resolved(StockState::OutOfStock, signal),
            Resolution::InStock { signal } => Verdict::Resolved(StockState::InStock, signal),
            Resolution::Inconclusive => Verdict::Failed(FailureKind::InconclusiveRender),
        };
        Ok(verdict)
    }

    async fn capture_diagnostics<P: Page + ?Sized>(
        &self,
        page: &P,
        target: &Target,
        kind: FailureKind,
    ) {
        if let Err(e) = capture(page, self.store, target, kind, self.config.capture_timeout).await {
            warn!(url = %target.url, tag = kind.tag(), error = %e, "Diagnostic capture failed");
        }
    }
}
