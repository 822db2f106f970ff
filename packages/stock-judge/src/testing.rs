//! Testing utilities including mock implementations.
//!
//! These let applications exercise the engine without launching a browser.
//! Page timing runs on `tokio::time`, so tests using
//! `#[tokio::test(start_paused = true)]` see waits resolve instantly while the
//! engine still observes the scripted delays.
//!
//! ```rust,ignore
//! let browser = MockBrowser::new()
//!     .with_script("https://example.com/a", PageScript::ok().showing(Matcher::text("SOLD OUT")))
//!     .with_script("https://example.com/b", PageScript::status(503));
//!
//! let checker = StockChecker::new(browser.clone(), MemoryDiagnosticStore::new(), config);
//! let report = checker.run_all(&catalog).await?;
//! assert_eq!(browser.close_count(), 1);
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{BrowseError, BrowseResult, NotifyError, NotifyResult};
use crate::traits::browser::{Browser, NavigationResponse, Page, Session, SessionProfile};
use crate::traits::notify::{Notifier, ReportLog};
use crate::types::signal::Matcher;

/// How a scripted page behaves once navigated to.
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    status: Option<u16>,
    navigation_error: Option<String>,
    navigation_delay: Duration,
    visible: Vec<(Matcher, Duration)>,
    failing: Vec<Matcher>,
    failing_visibility: bool,
    panicking_visibility: bool,
    failing_screenshot: bool,
    failing_content: bool,
}

impl PageScript {
    /// A page answering 200 that shows nothing recognizable.
    pub fn ok() -> Self {
        Self::status(200)
    }

    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Navigation itself fails (DNS, TLS, connection reset).
    pub fn navigation_error(reason: impl Into<String>) -> Self {
        Self {
            navigation_error: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }

    /// `matcher` is visible as soon as the document is parsed.
    pub fn showing(self, matcher: Matcher) -> Self {
        self.showing_after(matcher, Duration::ZERO)
    }

    /// `matcher` becomes visible `delay` after the document is parsed.
    pub fn showing_after(mut self, matcher: Matcher, delay: Duration) -> Self {
        self.visible.push((matcher, delay));
        self
    }

    /// Waits and visibility queries for `matcher` fail immediately.
    pub fn failing_on(mut self, matcher: Matcher) -> Self {
        self.failing.push(matcher);
        self
    }

    /// Every visibility query fails.
    pub fn failing_visibility(mut self) -> Self {
        self.failing_visibility = true;
        self
    }

    /// Every visibility query panics.
    pub fn panicking_visibility(mut self) -> Self {
        self.panicking_visibility = true;
        self
    }

    pub fn failing_screenshot(mut self) -> Self {
        self.failing_screenshot = true;
        self
    }

    pub fn failing_content(mut self) -> Self {
        self.failing_content = true;
        self
    }

    fn appears_after(&self, matcher: &Matcher) -> Option<Duration> {
        self.visible
            .iter()
            .filter(|(m, _)| m == matcher)
            .map(|(_, delay)| *delay)
            .min()
    }
}

/// Record of a call made to a mock page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCall {
    Goto(String),
    WaitFor(Matcher),
    IsVisible(Matcher),
    Screenshot,
    Content,
}

#[derive(Debug, Clone)]
struct Loaded {
    url: String,
    script: PageScript,
    at: Instant,
}

/// A scripted page. Unknown URLs fail navigation.
#[derive(Clone, Default)]
pub struct MockPage {
    scripts: Arc<RwLock<HashMap<String, PageScript>>>,
    calls: Arc<RwLock<Vec<PageCall>>>,
    current: Arc<RwLock<Option<Loaded>>>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how the page behaves when navigated to `url`.
    pub fn with_script(self, url: impl Into<String>, script: PageScript) -> Self {
        self.scripts.write().unwrap().insert(url.into(), script);
        self
    }

    /// Get all calls made to this page.
    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.read().unwrap().clone()
    }

    fn record(&self, call: PageCall) {
        self.calls.write().unwrap().push(call);
    }

    fn loaded(&self) -> Option<Loaded> {
        self.current.read().unwrap().clone()
    }
}

#[async_trait]
impl Page for MockPage {
    async fn goto(&self, url: &str, timeout: Duration) -> BrowseResult<NavigationResponse> {
        self.record(PageCall::Goto(url.to_string()));

        let script = self.scripts.read().unwrap().get(url).cloned().ok_or_else(|| {
            BrowseError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }
        })?;

        if script.navigation_delay >= timeout {
            tokio::time::sleep(timeout).await;
            return Err(BrowseError::Timeout(timeout));
        }
        tokio::time::sleep(script.navigation_delay).await;

        if let Some(reason) = &script.navigation_error {
            return Err(BrowseError::Navigation {
                url: url.to_string(),
                reason: reason.clone(),
            });
        }

        let status = script.status;
        *self.current.write().unwrap() = Some(Loaded {
            url: url.to_string(),
            script,
            at: Instant::now(),
        });

        Ok(NavigationResponse::new(url, status))
    }

    async fn wait_for(&self, matcher: &Matcher, timeout: Duration) -> BrowseResult<()> {
        self.record(PageCall::WaitFor(matcher.clone()));

        let Some(loaded) = self.loaded() else {
            return Err(BrowseError::Closed);
        };
        if loaded.script.failing.contains(matcher) {
            return Err(BrowseError::Script(format!("invalid matcher {matcher}")));
        }

        let elapsed = loaded.at.elapsed();
        match loaded.script.appears_after(matcher) {
            Some(delay) if delay.saturating_sub(elapsed) <= timeout => {
                tokio::time::sleep(delay.saturating_sub(elapsed)).await;
                Ok(())
            }
            _ => {
                tokio::time::sleep(timeout).await;
                Err(BrowseError::Timeout(timeout))
            }
        }
    }

    async fn is_visible(&self, matcher: &Matcher) -> BrowseResult<bool> {
        self.record(PageCall::IsVisible(matcher.clone()));

        let Some(loaded) = self.loaded() else {
            return Ok(false);
        };
        if loaded.script.panicking_visibility {
            panic!("visibility query crashed on {}", loaded.url);
        }
        if loaded.script.failing_visibility || loaded.script.failing.contains(matcher) {
            return Err(BrowseError::Script(format!("query failed for {matcher}")));
        }

        Ok(loaded
            .script
            .appears_after(matcher)
            .is_some_and(|delay| loaded.at.elapsed() >= delay))
    }

    async fn screenshot(&self) -> BrowseResult<Vec<u8>> {
        self.record(PageCall::Screenshot);

        match self.loaded() {
            Some(loaded) if loaded.script.failing_screenshot => {
                Err(BrowseError::Protocol("screenshot failed".to_string()))
            }
            _ => Ok(b"\x89PNG\r\n\x1a\n".to_vec()),
        }
    }

    async fn content(&self) -> BrowseResult<String> {
        self.record(PageCall::Content);

        match self.loaded() {
            Some(loaded) if loaded.script.failing_content => {
                Err(BrowseError::Protocol("content failed".to_string()))
            }
            Some(loaded) => Ok(format!("<html><!-- {} --></html>", loaded.url)),
            None => Ok("<html></html>".to_string()),
        }
    }
}

#[derive(Default)]
struct BrowserState {
    launches: usize,
    closes: usize,
    fail_launch: bool,
    fail_new_page: bool,
    fail_close: bool,
    profiles: Vec<SessionProfile>,
}

/// A mock browser handing out [`MockPage`]s that share its scripts and call log.
#[derive(Clone, Default)]
pub struct MockBrowser {
    state: Arc<RwLock<BrowserState>>,
    page: MockPage,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, url: impl Into<String>, script: PageScript) -> Self {
        self.page.scripts.write().unwrap().insert(url.into(), script);
        self
    }

    pub fn failing_launch(self) -> Self {
        self.state.write().unwrap().fail_launch = true;
        self
    }

    pub fn failing_new_page(self) -> Self {
        self.state.write().unwrap().fail_new_page = true;
        self
    }

    pub fn failing_close(self) -> Self {
        self.state.write().unwrap().fail_close = true;
        self
    }

    pub fn launch_count(&self) -> usize {
        self.state.read().unwrap().launches
    }

    pub fn close_count(&self) -> usize {
        self.state.read().unwrap().closes
    }

    /// Profiles sessions were launched with.
    pub fn profiles(&self) -> Vec<SessionProfile> {
        self.state.read().unwrap().profiles.clone()
    }

    /// Every call made to pages of this browser.
    pub fn calls(&self) -> Vec<PageCall> {
        self.page.calls()
    }
}

#[async_trait]
impl Browser for MockBrowser {
    type Session = MockSession;

    async fn launch(&self, profile: &SessionProfile) -> BrowseResult<MockSession> {
        let mut state = self.state.write().unwrap();
        if state.fail_launch {
            return Err(BrowseError::Launch("mock launch failure".to_string()));
        }
        state.launches += 1;
        state.profiles.push(profile.clone());

        Ok(MockSession {
            browser: self.clone(),
            closed: false,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Session of a [`MockBrowser`].
pub struct MockSession {
    browser: MockBrowser,
    closed: bool,
}

#[async_trait]
impl Session for MockSession {
    type Page = MockPage;

    async fn new_page(&self) -> BrowseResult<MockPage> {
        if self.closed {
            return Err(BrowseError::Closed);
        }
        if self.browser.state.read().unwrap().fail_new_page {
            return Err(BrowseError::Protocol("mock page failure".to_string()));
        }
        Ok(self.browser.page.clone())
    }

    async fn close(&mut self) -> BrowseResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut state = self.browser.state.write().unwrap();
        state.closes += 1;
        if state.fail_close {
            return Err(BrowseError::Protocol("mock close failure".to_string()));
        }
        Ok(())
    }
}

/// Notifier that records what it was asked to send.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<(String, String)>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails after being recorded.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// `(subject, body)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.read().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, body: &str) -> NotifyResult<()> {
        self.sent
            .write()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        if self.fail {
            return Err(NotifyError::Transport("mock delivery failure".into()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Report log kept in memory.
#[derive(Clone, Default)]
pub struct MemoryReportLog {
    entries: Arc<RwLock<Vec<String>>>,
}

impl MemoryReportLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.read().unwrap().clone()
    }
}

#[async_trait]
impl ReportLog for MemoryReportLog {
    async fn record(&self, body: &str) -> NotifyResult<()> {
        self.entries.write().unwrap().push(body.to_string());
        Ok(())
    }
}
