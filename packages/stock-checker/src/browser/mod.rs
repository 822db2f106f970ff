//! Browsing capability backed by a real browser.

pub mod chromium;

pub use chromium::{ChromiumBrowser, ChromiumPage, ChromiumSession};
