//! Stock-State Judgment Engine
//!
//! Decides, for a list of product pages, whether each item can be bought right
//! now. Pages are rendered client-side, so the UI that answers the question
//! ("sold out" text, an "add to cart" button) shows up late and sometimes both
//! at once. The engine navigates, races a set of waits against one budget, then
//! re-checks every signal in a fixed priority order.
//!
//! # Flow per target
//!
//! ```text
//! navigate ──► await_any_signal ──► resolve ──► Judgment
//!    │                                 │
//!    └── transport failure             └── inconclusive
//!              │                                │
//!              └────────► capture (best-effort) ◄┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use stock_judge::{Catalog, JudgeConfig, Matcher, SignalSet, StockChecker};
//! use stock_judge::stores::MemoryDiagnosticStore;
//!
//! let signals = SignalSet::new(
//!     vec![Matcher::text("SOLD OUT")],
//!     Matcher::button("ADD TO CART"),
//! );
//! let catalog = Catalog::new().with_category("Washers", ["https://example.com/p/1"]);
//!
//! let store = MemoryDiagnosticStore::new();
//! let checker = StockChecker::new(browser, store, JudgeConfig::new(signals));
//! let report = checker.run_all(&catalog).await?;
//! println!("{}", report.body());
//! ```
//!
//! # Modules
//!
//! - [`types`] - Targets, signals, judgments, reports and engine configuration
//! - [`traits`] - Capability seams (browser, diagnostic store, notifier, report log)
//! - [`engine`] - Navigation gate, signal detector, priority resolver, capturer, runner
//! - [`stores`] - Diagnostic store implementations
//! - [`testing`] - Scripted browser and recording collaborators for tests

pub mod engine;
pub mod error;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    BrowseError, BrowseResult, CaptureError, CheckError, CheckResult, ConfigError, NotifyError,
    NotifyResult, StoreError, StoreResult,
};
pub use traits::{
    browser::{Browser, NavigationResponse, Page, Session, SessionProfile},
    notify::{Notifier, ReportLog},
    store::{Artifact, DiagnosticStore},
};
pub use types::{
    config::{JudgeConfig, ReportZone},
    judgment::{FailureKind, Judgment, StockState},
    report::Report,
    signal::{Matcher, Signal, SignalRole, SignalSet},
    target::{Catalog, Target},
};

pub use engine::{
    artifact_id, await_any_signal, capture, dispatch, navigate, resolve, DispatchOutcome, Judge,
    NavigationOutcome, Resolution, StockChecker,
};

pub use stores::{FsDiagnosticStore, MemoryDiagnosticStore};
