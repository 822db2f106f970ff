//! Browsing capability consumed by the engine.
//!
//! The engine only needs a handful of page operations: navigate, wait for a
//! signal, ask whether a signal is visible, and take a screenshot and markup
//! dump for diagnostics. Everything CDP- or driver-specific lives behind these
//! traits, so the resolver never sees a selector string.
//!
//! ```rust,ignore
//! let mut session = browser.launch(&SessionProfile::default()).await?;
//! let page = session.new_page().await?;
//! let response = page.goto("https://example.com/p/1", Duration::from_secs(60)).await?;
//! if response.is_success() && page.is_visible(&Matcher::text("SOLD OUT")).await? {
//!     // ...
//! }
//! session.close().await?;
//! ```

use async_trait::async_trait;
use std::time::Duration;

use crate::error::BrowseResult;
use crate::types::signal::Matcher;

/// What a navigation produced at the transport level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationResponse {
    /// URL the page ended up on
    pub url: String,

    /// HTTP status of the main document, if one was received
    pub status: Option<u16>,
}

impl NavigationResponse {
    pub fn new(url: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            url: url.into(),
            status,
        }
    }

    /// A response arrived and its status is 2xx.
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }
}

/// Identity the browsing session presents to sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProfile {
    /// BCP 47 locale, e.g. `ja-JP`
    pub locale: String,

    /// IANA timezone, e.g. `Asia/Tokyo`
    pub timezone: String,

    /// User-Agent header and `navigator.userAgent`
    pub user_agent: String,

    /// Scripts evaluated in every new document before page scripts run
    pub init_scripts: Vec<String>,
}

/// Hides the automation flag some storefronts check before rendering the cart.
pub const HIDE_WEBDRIVER_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => false });";

impl Default for SessionProfile {
    fn default() -> Self {
        Self {
            locale: "ja-JP".to_string(),
            timezone: "Asia/Tokyo".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/125 Safari/537.36"
                .to_string(),
            init_scripts: vec![HIDE_WEBDRIVER_SCRIPT.to_string()],
        }
    }
}

impl SessionProfile {
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Starts browsing sessions.
#[async_trait]
pub trait Browser: Send + Sync {
    type Session: Session;

    /// Start a session with the given profile.
    async fn launch(&self, profile: &SessionProfile) -> BrowseResult<Self::Session>;

    /// Get the browser name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

/// One browsing session. Must be closed explicitly.
#[async_trait]
pub trait Session: Send + Sync {
    type Page: Page;

    /// Open a page (tab) in this session.
    async fn new_page(&self) -> BrowseResult<Self::Page>;

    /// Tear the session down. Closing twice is not an error.
    async fn close(&mut self) -> BrowseResult<()>;
}

/// Page operations the engine depends on.
///
/// All operations are read-only apart from `goto`, so an abandoned
/// `wait_for` can simply be dropped.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate and wait until the document is parsed (not fully loaded).
    async fn goto(&self, url: &str, timeout: Duration) -> BrowseResult<NavigationResponse>;

    /// Resolve once `matcher` is visible, or fail after `timeout`.
    async fn wait_for(&self, matcher: &Matcher, timeout: Duration) -> BrowseResult<()>;

    /// Whether `matcher` is visible right now.
    async fn is_visible(&self, matcher: &Matcher) -> BrowseResult<bool>;

    /// Full-page PNG.
    async fn screenshot(&self) -> BrowseResult<Vec<u8>>;

    /// Full rendered markup.
    async fn content(&self) -> BrowseResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_success_range() {
        assert!(NavigationResponse::new("u", Some(200)).is_success());
        assert!(NavigationResponse::new("u", Some(204)).is_success());
        assert!(!NavigationResponse::new("u", Some(304)).is_success());
        assert!(!NavigationResponse::new("u", Some(500)).is_success());
        assert!(!NavigationResponse::new("u", None).is_success());
    }

    #[test]
    fn test_default_profile_hides_webdriver() {
        let profile = SessionProfile::default();
        assert_eq!(profile.locale, "ja-JP");
        assert_eq!(profile.timezone, "Asia/Tokyo");
        assert_eq!(profile.init_scripts, vec![HIDE_WEBDRIVER_SCRIPT.to_string()]);
    }
}
