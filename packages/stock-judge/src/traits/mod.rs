//! Core trait abstractions.
//!
//! - [`browser`] - Browsing capability (session, page)
//! - [`store`] - Diagnostic store
//! - [`notify`] - Notifier and report log

pub mod browser;
pub mod notify;
pub mod store;

pub use browser::{Browser, NavigationResponse, Page, Session, SessionProfile};
pub use notify::{Notifier, ReportLog};
pub use store::{Artifact, DiagnosticStore};
