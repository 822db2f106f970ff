//! Typed errors for the judgment engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so the binary can match
//! on what went wrong and decide what is fatal.

use std::time::Duration;

use thiserror::Error;

use crate::types::signal::SignalRole;

/// Failures reported by a browsing capability.
#[derive(Debug, Error)]
pub enum BrowseError {
    /// The browser process or session could not be started
    #[error("browser launch failed: {0}")]
    Launch(String),

    /// Navigation did not produce a response
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// An operation ran past its deadline
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A page script or query failed to evaluate
    #[error("script evaluation failed: {0}")]
    Script(String),

    /// The page rejected a selector; retrying will not help
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// Transport or protocol level failure talking to the browser
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The session or page was already closed
    #[error("session closed")]
    Closed,
}

/// Errors from a diagnostic store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from a diagnostic capture. Always logged and discarded by the engine.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Neither the screenshot nor the markup could be taken
    #[error("nothing captured: {0}")]
    Browse(#[from] BrowseError),

    /// One half of the bundle was written, the other could not be taken
    #[error("partial capture, {missing} missing: {source}")]
    Partial {
        missing: &'static str,
        #[source]
        source: BrowseError,
    },

    /// Writing the bundle failed
    #[error("store write failed: {0}")]
    Store(#[from] StoreError),

    /// The capture did not finish in time
    #[error("capture timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors while handing the report to its collaborators.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The outgoing message could not be built (bad address, bad header)
    #[error("invalid message: {0}")]
    Message(String),

    /// The delivery channel rejected or dropped the message
    #[error("delivery failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Writing the report log failed
    #[error("report log failed: {0}")]
    Log(#[from] std::io::Error),
}

/// Invalid catalog or engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid target URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("target URL listed more than once: {url}")]
    DuplicateUrl { url: String },

    #[error("empty matcher for {role:?} signal")]
    EmptyMatcher { role: SignalRole },

    #[error("navigation timeout {navigation:?} must exceed the wait budget {budget:?}")]
    TimeoutOrder {
        navigation: Duration,
        budget: Duration,
    },
}

/// Errors that abort a whole run. Per-target failures never surface here.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("could not open browsing session: {0}")]
    Launch(#[source] BrowseError),

    #[error("could not open page: {0}")]
    Page(#[source] BrowseError),
}

/// Result type alias for browsing operations.
pub type BrowseResult<T> = std::result::Result<T, BrowseError>;

/// Result type alias for diagnostic store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for report delivery.
pub type NotifyResult<T> = std::result::Result<T, NotifyError>;

/// Result type alias for whole-run operations.
pub type CheckResult<T> = std::result::Result<T, CheckError>;
