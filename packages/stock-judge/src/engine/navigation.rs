//! Navigation gate: load the page and check the transport before judging it.

use std::time::Duration;
use tracing::{debug, warn};

use crate::traits::browser::{NavigationResponse, Page};
use crate::types::target::Target;

/// Result of the navigation gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// A 2xx response arrived and the document is parsed
    Ok(NavigationResponse),

    /// Non-success status, navigation error or timeout
    TransportFailure {
        status: Option<u16>,
        reason: String,
    },
}

impl NavigationOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// Navigate `page` to the target and classify the transport outcome.
///
/// The deadline is enforced here as well as handed to the page, so a driver
/// that ignores its timeout still cannot hold the run.
pub async fn navigate<P: Page + ?Sized>(
    page: &P,
    target: &Target,
    timeout: Duration,
) -> NavigationOutcome {
    debug!(url = %target.url, timeout = ?timeout, "Navigating");

    let response = match tokio::time::timeout(timeout, page.goto(&target.url, timeout)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!(url = %target.url, error = %e, "Navigation failed");
            return NavigationOutcome::TransportFailure {
                status: None,
                reason: e.to_string(),
            };
        }
        Err(_) => {
            warn!(url = %target.url, timeout = ?timeout, "Navigation timed out");
            return NavigationOutcome::TransportFailure {
                status: None,
                reason: format!("navigation timed out after {timeout:?}"),
            };
        }
    };

    if response.is_success() {
        NavigationOutcome::Ok(response)
    } else {
        warn!(url = %target.url, status = ?response.status, "Non-success response");
        NavigationOutcome::TransportFailure {
            status: response.status,
            reason: match response.status {
                Some(status) => format!("HTTP {status}"),
                None => "no response".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPage, PageScript};

    #[tokio::test]
    async fn test_success_status_passes() {
        let page = MockPage::new().with_script("https://example.com/ok", PageScript::ok());
        let target = Target::new("https://example.com/ok", "A");

        let outcome = navigate(&page, &target, Duration::from_secs(60)).await;
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_server_error_is_transport_failure() {
        let page = MockPage::new().with_script("https://example.com/500", PageScript::status(500));
        let target = Target::new("https://example.com/500", "A");

        let outcome = navigate(&page, &target, Duration::from_secs(60)).await;
        assert_eq!(
            outcome,
            NavigationOutcome::TransportFailure {
                status: Some(500),
                reason: "HTTP 500".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_navigation_error_is_transport_failure() {
        let page = MockPage::new().with_script(
            "https://example.com/dns",
            PageScript::navigation_error("net::ERR_NAME_NOT_RESOLVED"),
        );
        let target = Target::new("https://example.com/dns", "A");

        let outcome = navigate(&page, &target, Duration::from_secs(60)).await;
        match outcome {
            NavigationOutcome::TransportFailure { status, reason } => {
                assert_eq!(status, None);
                assert!(reason.contains("ERR_NAME_NOT_RESOLVED"));
            }
            other => panic!("expected transport failure, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_navigation_times_out() {
        let page = MockPage::new().with_script(
            "https://example.com/slow",
            PageScript::ok().with_navigation_delay(Duration::from_secs(600)),
        );
        let target = Target::new("https://example.com/slow", "A");

        let outcome = navigate(&page, &target, Duration::from_secs(60)).await;
        assert!(matches!(
            outcome,
            NavigationOutcome::TransportFailure { status: None, .. }
        ));
    }
}
