//! Integration tests for a full stock-check run.
//!
//! These drive `StockChecker::run_all` against a scripted browser and verify:
//! 1. One judgment per target, in catalog order
//! 2. Out-of-stock precedence over the available signal
//! 3. Transport failures short-circuit before any signal checks
//! 4. Exactly one diagnostic capture per failed target
//! 5. The session is closed on every path

use std::time::Duration;

use stock_judge::{
    dispatch,
    testing::{MemoryReportLog, MockBrowser, PageCall, PageScript, RecordingNotifier},
    Catalog, CheckError, DispatchOutcome, FailureKind, FsDiagnosticStore, JudgeConfig, Matcher,
    MemoryDiagnosticStore, SignalSet, StockChecker, StockState,
};

const IN_STOCK: &str = "https://shop.example.com/p/washer-1";
const SOLD_OUT: &str = "https://shop.example.com/p/washer-2";
const BROKEN: &str = "https://shop.example.com/p/fridge-1";
const BLANK: &str = "https://shop.example.com/p/fridge-2";

/// Helper for the usual SOLD OUT / ADD TO CART signal set.
fn config() -> JudgeConfig {
    JudgeConfig::new(SignalSet::new(
        vec![Matcher::text("SOLD OUT")],
        Matcher::button("ADD TO CART"),
    ))
    .with_subject("Factory Refresh stock check")
}

fn scripted_browser() -> MockBrowser {
    MockBrowser::new()
        .with_script(
            IN_STOCK,
            PageScript::ok().showing_after(Matcher::button("ADD TO CART"), Duration::from_secs(2)),
        )
        .with_script(
            SOLD_OUT,
            PageScript::ok()
                .showing_after(Matcher::text("SOLD OUT"), Duration::from_millis(500))
                .showing_after(Matcher::button("ADD TO CART"), Duration::from_secs(1)),
        )
        .with_script(BROKEN, PageScript::status(500))
        .with_script(BLANK, PageScript::ok())
}

#[tokio::test(start_paused = true)]
async fn test_three_targets_capture_only_the_failure() {
    let browser = scripted_browser();
    let checker = StockChecker::new(browser.clone(), MemoryDiagnosticStore::new(), config());
    let catalog = Catalog::new()
        .with_category("Washers", [IN_STOCK, SOLD_OUT])
        .with_category("Fridges", [BROKEN]);

    let report = checker.run_all(&catalog).await.unwrap();

    let states: Vec<_> = report.judgments.iter().map(|j| j.state).collect();
    assert_eq!(
        states,
        vec![
            StockState::InStock,
            StockState::OutOfStock,
            StockState::FetchFailed
        ]
    );
    assert!(report.any_in_stock);

    let artifacts = checker.store().artifacts();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].url, BROKEN);
    assert_eq!(artifacts[0].tag(), "http_error");

    assert_eq!(browser.launch_count(), 1);
    assert_eq!(browser.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_report_lines_follow_catalog_order() {
    let checker = StockChecker::new(scripted_browser(), MemoryDiagnosticStore::new(), config());
    let catalog = Catalog::new()
        .with_category("Washers", [IN_STOCK, SOLD_OUT])
        .with_category("Fridges", [BROKEN, BLANK]);

    let report = checker.run_all(&catalog).await.unwrap();

    assert_eq!(report.lines.len(), 1 + 2 + 4);
    assert!(report.lines[0].ends_with(" JST]"));
    assert_eq!(
        &report.lines[1..],
        &[
            "■ Washers".to_string(),
            format!("- {IN_STOCK} — ⭐ IN STOCK ⭐"),
            format!("- {SOLD_OUT} — out of stock"),
            "■ Fridges".to_string(),
            format!("- {BROKEN} — fetch failed"),
            format!("- {BLANK} — fetch failed"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_sold_out_wins_when_both_render() {
    let browser = MockBrowser::new().with_script(
        SOLD_OUT,
        PageScript::ok()
            .showing(Matcher::button("ADD TO CART"))
            .showing(Matcher::text("SOLD OUT")),
    );
    let checker = StockChecker::new(browser, MemoryDiagnosticStore::new(), config());
    let catalog = Catalog::new().with_category("Washers", [SOLD_OUT]);

    let report = checker.run_all(&catalog).await.unwrap();

    assert_eq!(report.judgments[0].state, StockState::OutOfStock);
    assert_eq!(
        report.judgments[0].matched_signal.as_deref(),
        Some("text=SOLD OUT")
    );
    assert!(!report.any_in_stock);
    assert_eq!(checker.store().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_server_error_never_checks_signals() {
    let browser = MockBrowser::new().with_script(BROKEN, PageScript::status(500));
    let checker = StockChecker::new(browser.clone(), MemoryDiagnosticStore::new(), config());
    let catalog = Catalog::new().with_category("Fridges", [BROKEN]);

    let report = checker.run_all(&catalog).await.unwrap();

    assert_eq!(report.judgments[0].failure, Some(FailureKind::Transport));
    assert!(!browser
        .calls()
        .iter()
        .any(|call| matches!(call, PageCall::IsVisible(_) | PageCall::WaitFor(_))));
}

#[tokio::test(start_paused = true)]
async fn test_blank_page_is_inconclusive() {
    let checker = StockChecker::new(
        MockBrowser::new().with_script(BLANK, PageScript::ok()),
        MemoryDiagnosticStore::new(),
        config(),
    );
    let catalog = Catalog::new().with_category("Fridges", [BLANK]);

    let report = checker.run_all(&catalog).await.unwrap();

    assert_eq!(report.judgments[0].state, StockState::FetchFailed);
    assert_eq!(
        report.judgments[0].failure,
        Some(FailureKind::InconclusiveRender)
    );
    assert_eq!(checker.store().artifacts()[0].tag(), "unknown");
}

#[tokio::test(start_paused = true)]
async fn test_one_crashing_target_does_not_stop_the_run() {
    let browser = scripted_browser().with_script(
        BLANK,
        PageScript::ok()
            .showing(Matcher::text("SOLD OUT"))
            .failing_visibility(),
    );
    let checker = StockChecker::new(browser.clone(), MemoryDiagnosticStore::new(), config());
    let catalog = Catalog::new().with_category("Mixed", [BLANK, IN_STOCK]);

    let report = checker.run_all(&catalog).await.unwrap();

    assert_eq!(report.judgments.len(), 2);
    assert_eq!(report.judgments[0].failure, Some(FailureKind::Unexpected));
    assert_eq!(report.judgments[1].state, StockState::InStock);
    assert_eq!(checker.store().artifacts()[0].tag(), "exception");
    assert_eq!(browser.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_any_in_stock_false_without_in_stock_judgment() {
    let checker = StockChecker::new(scripted_browser(), MemoryDiagnosticStore::new(), config());
    let catalog = Catalog::new().with_category("Mixed", [SOLD_OUT, BROKEN, BLANK]);

    let report = checker.run_all(&catalog).await.unwrap();

    assert!(!report.any_in_stock);
    assert_eq!(report.judgments.len(), 3);
    assert_eq!(checker.store().count(), 2);
}

#[tokio::test]
async fn test_empty_catalog_reports_header_only() {
    let browser = MockBrowser::new();
    let checker = StockChecker::new(browser.clone(), MemoryDiagnosticStore::new(), config());

    let report = checker.run_all(&Catalog::new()).await.unwrap();

    assert!(!report.any_in_stock);
    assert_eq!(report.lines.len(), 1);
    assert_eq!(browser.close_count(), 1);
}

#[tokio::test]
async fn test_duplicate_url_is_rejected() {
    let browser = MockBrowser::new();
    let checker = StockChecker::new(browser.clone(), MemoryDiagnosticStore::new(), config());
    let catalog = Catalog::new()
        .with_category("Washers", [IN_STOCK])
        .with_category("Fridges", [IN_STOCK]);

    let result = checker.run_all(&catalog).await;

    assert!(matches!(result, Err(CheckError::Config(_))));
    assert_eq!(browser.launch_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_run_then_dispatch_alerts_once() {
    let checker = StockChecker::new(scripted_browser(), MemoryDiagnosticStore::new(), config());
    let catalog = Catalog::new().with_category("Washers", [IN_STOCK, SOLD_OUT]);
    let report = checker.run_all(&catalog).await.unwrap();

    let log = MemoryReportLog::new();
    let notifier = RecordingNotifier::new();
    let outcome = dispatch(&report, &log, Some(&notifier)).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::Notified);
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "⚠️ Factory Refresh stock check (in stock)");
    assert_eq!(sent[0].1, log.entries()[0]);
}

#[tokio::test(start_paused = true)]
async fn test_fs_store_receives_failed_bundle() {
    let tmp = tempfile::tempdir().unwrap();
    let checker = StockChecker::new(
        MockBrowser::new().with_script(BROKEN, PageScript::status(503)),
        FsDiagnosticStore::new(tmp.path()),
        config(),
    );
    let catalog = Catalog::new().with_category("Fridges", [BROKEN]);

    checker.run_all(&catalog).await.unwrap();

    let stem = "https_shop_example_com_p_fridge_1_http_error";
    assert!(tmp.path().join(format!("{stem}.png")).exists());
    assert!(tmp.path().join(format!("{stem}.html")).exists());
}

#[tokio::test(start_paused = true)]
async fn test_session_profile_is_passed_to_browser() {
    let browser = MockBrowser::new();
    let checker = StockChecker::new(browser.clone(), MemoryDiagnosticStore::new(), config());

    checker.run_all(&Catalog::new()).await.unwrap();

    let profiles = browser.profiles();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].timezone, "Asia/Tokyo");
}
