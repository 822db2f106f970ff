//! Diagnostic capture for targets that could not be judged.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::info;

use crate::error::CaptureError;
use crate::traits::browser::Page;
use crate::traits::store::{Artifact, DiagnosticStore};
use crate::types::judgment::FailureKind;
use crate::types::target::Target;

const MAX_ID_LEN: usize = 90;

static RE_UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid regex"));

/// Filesystem-safe identifier for a URL.
///
/// ```rust,ignore
/// assert_eq!(artifact_id("https://a.com/p?x=1"), "https_a_com_p_x_1");
/// ```
pub fn artifact_id(url: &str) -> String {
    let mut id = RE_UNSAFE.replace_all(url, "_").into_owned();
    // Only ASCII survives the replacement, so byte truncation is safe.
    id.truncate(MAX_ID_LEN);
    id
}

/// Grab a screenshot and the markup of whatever the page currently shows and
/// hand both to the store. Returns the bundle stem on success.
///
/// The two grabs are independent: if one fails the other is still written and
/// the call reports [`CaptureError::Partial`].
pub async fn capture<P, S>(
    page: &P,
    store: &S,
    target: &Target,
    kind: FailureKind,
    timeout: Duration,
) -> Result<String, CaptureError>
where
    P: Page + ?Sized,
    S: DiagnosticStore + ?Sized,
{
    tokio::time::timeout(timeout, capture_inner(page, store, target, kind))
        .await
        .map_err(|_| CaptureError::Timeout(timeout))?
}

async fn capture_inner<P, S>(
    page: &P,
    store: &S,
    target: &Target,
    kind: FailureKind,
) -> Result<String, CaptureError>
where
    P: Page + ?Sized,
    S: DiagnosticStore + ?Sized,
{
    let screenshot = page.screenshot().await;
    let markup = page.content().await;

    let (screenshot, markup, missing) = match (screenshot, markup) {
        (Ok(png), Ok(html)) => (Some(png), Some(html), None),
        (Ok(png), Err(e)) => (Some(png), None, Some(("markup", e))),
        (Err(e), Ok(html)) => (None, Some(html), Some(("screenshot", e))),
        (Err(e), Err(_)) => return Err(CaptureError::Browse(e)),
    };

    let artifact = Artifact {
        id: artifact_id(&target.url),
        kind,
        url: target.url.clone(),
        markup,
        screenshot,
    };
    store.write(&artifact).await?;

    let stem = artifact.stem();
    info!(url = %target.url, artifact = %stem, store = store.name(), "Diagnostics captured");

    match missing {
        Some((missing, source)) => Err(CaptureError::Partial { missing, source }),
        None => Ok(stem),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::navigation::navigate;
    use crate::stores::MemoryDiagnosticStore;
    use crate::testing::{MockPage, PageScript};

    const URL: &str = "https://example.com/p/1?color=white";

    async fn loaded(script: PageScript) -> MockPage {
        let page = MockPage::new().with_script(URL, script);
        navigate(&page, &Target::new(URL, "A"), Duration::from_secs(60)).await;
        page
    }

    #[test]
    fn test_artifact_id_collapses_runs() {
        assert_eq!(
            artifact_id("https://example.com/p/1?color=white"),
            "https_example_com_p_1_color_white"
        );
        assert_eq!(artifact_id("a--//b"), "a_b");
    }

    #[test]
    fn test_artifact_id_replaces_non_ascii() {
        assert_eq!(artifact_id("https://例え.jp/洗濯機"), "https_jp_");
    }

    #[test]
    fn test_artifact_id_is_capped() {
        let url = format!("https://example.com/{}", "a".repeat(200));
        let id = artifact_id(&url);
        assert_eq!(id.len(), 90);
        assert!(id.starts_with("https_example_com_aaa"));
    }

    #[tokio::test]
    async fn test_capture_writes_both_parts() {
        let page = loaded(PageScript::ok()).await;
        let store = MemoryDiagnosticStore::new();
        let target = Target::new(URL, "A");

        let stem = capture(
            &page,
            &store,
            &target,
            FailureKind::InconclusiveRender,
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        assert_eq!(stem, "https_example_com_p_1_color_white_unknown");
        let artifacts = store.artifacts();
        assert_eq!(artifacts.len(), 1);
        assert!(artifacts[0].markup.is_some());
        assert!(artifacts[0].screenshot.is_some());
    }

    #[tokio::test]
    async fn test_partial_capture_still_writes() {
        let page = loaded(PageScript::ok().failing_screenshot()).await;
        let store = MemoryDiagnosticStore::new();
        let target = Target::new(URL, "A");

        let result = capture(
            &page,
            &store,
            &target,
            FailureKind::Transport,
            Duration::from_secs(30),
        )
        .await;

        assert!(matches!(
            result,
            Err(CaptureError::Partial {
                missing: "screenshot",
                ..
            })
        ));
        let artifacts = store.artifacts();
        assert_eq!(artifacts.len(), 1);
        assert!(artifacts[0].screenshot.is_none());
        assert!(artifacts[0].markup.is_some());
    }

    #[tokio::test]
    async fn test_nothing_captured_writes_nothing() {
        let page = loaded(PageScript::ok().failing_screenshot().failing_content()).await;
        let store = MemoryDiagnosticStore::new();
        let target = Target::new(URL, "A");

        let result = capture(
            &page,
            &store,
            &target,
            FailureKind::Unexpected,
            Duration::from_secs(30),
        )
        .await;

        assert!(matches!(result, Err(CaptureError::Browse(_))));
        assert_eq!(store.count(), 0);
    }
}
