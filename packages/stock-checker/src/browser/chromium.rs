//! Chromium over the DevTools protocol.
//!
//! Navigation stops at DOMContentLoaded instead of the load event: product
//! pages keep fetching trackers long after the cart UI has rendered. The main
//! document's HTTP status comes from the Navigation Timing entry.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetTimezoneOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, CaptureScreenshotFormat, NavigateParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser as CdpBrowser, BrowserConfig, Page as CdpPage};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use stock_judge::{
    BrowseError, BrowseResult, Browser, Matcher, NavigationResponse, Page, Session,
    SessionProfile,
};

use crate::config::ChromiumOptions;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

const STALE_MARKER: &str = "__stockWatchStale";

const DOCUMENT_STATE_SCRIPT: &str = r#"(() => {
  if (window.__stockWatchStale) return null;
  if (document.readyState === 'loading') return null;
  const nav = performance.getEntriesByType('navigation')[0];
  return {
    url: location.href,
    status: nav && nav.responseStatus ? nav.responseStatus : null,
  };
})()"#;

/// Returns `{ visible, invalid }`. Text and button patterns arrive already
/// lowercased and whitespace-collapsed; page text gets the same treatment.
const VISIBILITY_SCRIPT: &str = r#"((kind, pattern) => {
  const normalize = (s) => (s || '').replace(/\s+/g, ' ').trim().toLowerCase();
  const shown = (el) => {
    const style = window.getComputedStyle(el);
    if (style.visibility === 'hidden' || style.display === 'none') return false;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
  };
  const root = document.body || document.documentElement;
  if (!root) return { visible: false };
  if (kind === 'css') {
    let found;
    try {
      found = document.querySelectorAll(pattern);
    } catch (e) {
      return { visible: false, invalid: true };
    }
    return { visible: Array.from(found).some(shown) };
  }
  const text = (el) => normalize(el.innerText || el.value || el.textContent);
  if (kind === 'button') {
    const buttons = root.querySelectorAll(
      'button, [role="button"], input[type="submit"], input[type="button"]'
    );
    return {
      visible: Array.from(buttons).filter((el) => text(el).includes(pattern)).some(shown),
    };
  }
  const skip = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE']);
  const hits = [root, ...root.querySelectorAll('*')]
    .filter((el) => !skip.has(el.tagName) && text(el).includes(pattern));
  const deepest = hits.filter((el) => !hits.some((other) => other !== el && el.contains(other)));
  return { visible: deepest.some(shown) };
})"#;

/// Candidate binaries, checked in order after `CHROME_BIN`.
const CHROME_CANDIDATES: [&str; 8] = [
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/snap/chromium/current/usr/lib/chromium-browser/chrome",
    "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe",
];

fn find_chrome_binary(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "CHROME_BIN does not exist, probing defaults");
    }

    CHROME_CANDIDATES
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Lowercase and collapse whitespace runs, matching the page-side `normalize`.
fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Poll `check` until it reports visible or `timeout` runs out.
///
/// Evaluation errors count as "not yet": redirects and re-hydration destroy
/// the execution context for a moment. An invalid selector or a closed
/// session ends the wait at once.
async fn poll_until_visible<F, Fut>(
    mut check: F,
    interval: Duration,
    timeout: Duration,
) -> BrowseResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = BrowseResult<bool>>,
{
    let poll = async {
        loop {
            match check().await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e @ (BrowseError::InvalidSelector(_) | BrowseError::Closed)) => {
                    return Err(e);
                }
                Err(e) => trace!(error = %e, "Visibility check failed, retrying"),
            }
            tokio::time::sleep(interval).await;
        }
    };
    tokio::time::timeout(timeout, poll)
        .await
        .map_err(|_| BrowseError::Timeout(timeout))?
}

fn protocol(e: CdpError) -> BrowseError {
    BrowseError::Protocol(e.to_string())
}

/// Launches a local Chromium per session.
#[derive(Debug, Clone)]
pub struct ChromiumBrowser {
    options: ChromiumOptions,
}

impl ChromiumBrowser {
    pub fn new(options: ChromiumOptions) -> Self {
        Self { options }
    }

    fn launch_args(&self, profile: &SessionProfile) -> Vec<String> {
        let mut args = vec![
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--lang={}", profile.locale),
        ];
        if self.options.no_sandbox {
            args.push("--no-sandbox".to_string());
        }
        args
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    type Session = ChromiumSession;

    async fn launch(&self, profile: &SessionProfile) -> BrowseResult<ChromiumSession> {
        let binary = find_chrome_binary(self.options.executable.as_deref());

        let mut builder = BrowserConfig::builder();
        if let Some(ref bin) = binary {
            builder = builder.chrome_executable(bin);
        }
        if !self.options.headless {
            builder = builder.with_head();
        }
        let config = builder
            .args(self.launch_args(profile))
            .build()
            .map_err(BrowseError::Launch)?;

        info!(
            binary = ?binary,
            headless = self.options.headless,
            "Launching Chromium"
        );

        let (browser, mut handler) = CdpBrowser::launch(config)
            .await
            .map_err(|e| BrowseError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!(error = %e, "CDP handler event error");
                }
            }
            debug!("Chromium event loop exited");
        });

        Ok(ChromiumSession {
            browser,
            handler,
            profile: profile.clone(),
            closed: false,
        })
    }

    fn name(&self) -> &str {
        "chromium"
    }
}

/// A running Chromium process and its CDP event loop.
pub struct ChromiumSession {
    browser: CdpBrowser,
    handler: JoinHandle<()>,
    profile: SessionProfile,
    closed: bool,
}

impl ChromiumSession {
    async fn apply_profile(&self, page: &CdpPage) -> BrowseResult<()> {
        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(self.profile.user_agent.clone())
            .accept_language(self.profile.locale.clone())
            .build()
            .map_err(BrowseError::Protocol)?;
        page.execute(user_agent).await.map_err(protocol)?;

        page.execute(SetTimezoneOverrideParams::new(self.profile.timezone.clone()))
            .await
            .map_err(protocol)?;

        for script in &self.profile.init_scripts {
            page.execute(AddScriptToEvaluateOnNewDocumentParams::new(script.clone()))
                .await
                .map_err(protocol)?;
        }
        Ok(())
    }
}

#[async_trait]
impl Session for ChromiumSession {
    type Page = ChromiumPage;

    async fn new_page(&self) -> BrowseResult<ChromiumPage> {
        if self.closed {
            return Err(BrowseError::Closed);
        }
        let page = self.browser.new_page("about:blank").await.map_err(protocol)?;
        self.apply_profile(&page).await?;
        debug!(
            locale = %self.profile.locale,
            timezone = %self.profile.timezone,
            "Page ready"
        );
        Ok(ChromiumPage { page })
    }

    async fn close(&mut self) -> BrowseResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = self.browser.close().await.map(|_| ()).map_err(protocol);
        self.handler.abort();
        info!("Chromium closed");
        result
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[derive(Debug, Deserialize)]
struct Visibility {
    visible: bool,
    #[serde(default)]
    invalid: bool,
}

#[derive(Debug, Deserialize)]
struct DocumentState {
    url: String,
    status: Option<u16>,
}

/// One Chromium tab.
pub struct ChromiumPage {
    page: CdpPage,
}

impl ChromiumPage {
    async fn eval<T: DeserializeOwned>(&self, script: &str) -> BrowseResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowseError::Script(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| BrowseError::Script(e.to_string()))
    }

    async fn navigate(&self, url: &str) -> BrowseResult<NavigationResponse> {
        // The old document keeps answering until the new one commits; mark it
        // so it is never mistaken for the target.
        self.eval::<bool>(&format!("window.{STALE_MARKER} = true; true"))
            .await?;

        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| BrowseError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        if let Some(reason) = response.result.error_text.clone() {
            return Err(BrowseError::Navigation {
                url: url.to_string(),
                reason,
            });
        }

        loop {
            match self.eval::<Option<DocumentState>>(DOCUMENT_STATE_SCRIPT).await {
                Ok(Some(state)) => return Ok(NavigationResponse::new(state.url, state.status)),
                Ok(None) => {}
                // Context swaps mid-navigation make evaluation fail briefly.
                Err(e) => trace!(error = %e, "Document not ready"),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    fn visibility_script(matcher: &Matcher) -> BrowseResult<String> {
        let (kind, pattern) = match matcher {
            Matcher::Text { text } => ("text", normalize_text(text)),
            Matcher::Button { label } => ("button", normalize_text(label)),
            Matcher::Css { selector } => ("css", selector.clone()),
        };
        let pattern =
            serde_json::to_string(&pattern).map_err(|e| BrowseError::Script(e.to_string()))?;
        Ok(format!("{VISIBILITY_SCRIPT}(\"{kind}\", {pattern})"))
    }
}

#[async_trait]
impl Page for ChromiumPage {
    async fn goto(&self, url: &str, timeout: Duration) -> BrowseResult<NavigationResponse> {
        tokio::time::timeout(timeout, self.navigate(url))
            .await
            .map_err(|_| BrowseError::Timeout(timeout))?
    }

    async fn wait_for(&self, matcher: &Matcher, timeout: Duration) -> BrowseResult<()> {
        poll_until_visible(|| self.is_visible(matcher), POLL_INTERVAL, timeout).await
    }

    async fn is_visible(&self, matcher: &Matcher) -> BrowseResult<bool> {
        let script = Self::visibility_script(matcher)?;
        let visibility = self.eval::<Visibility>(&script).await?;
        if visibility.invalid {
            return Err(BrowseError::InvalidSelector(matcher.pattern().to_string()));
        }
        Ok(visibility.visible)
    }

    async fn screenshot(&self) -> BrowseResult<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.page.screenshot(params).await.map_err(protocol)
    }

    async fn content(&self) -> BrowseResult<String> {
        self.page.content().await.map_err(protocol)
    }
}
