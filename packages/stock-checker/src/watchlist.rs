//! The watchlist file: what to check and how to recognize stock.
//!
//! ```json
//! {
//!   "subject": "Factory Refresh stock check",
//!   "signals": {
//!     "out_of_stock": [{ "kind": "text", "text": "在庫なし" }],
//!     "available": { "kind": "button", "label": "買い物かごに入れる" }
//!   },
//!   "targets": {
//!     "洗濯機": ["https://example.com/p/1"]
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use stock_judge::{Catalog, SignalSet};

fn default_subject() -> String {
    "Stock check".to_string()
}

/// Parsed and validated watchlist.
#[derive(Debug, Clone, Deserialize)]
pub struct Watchlist {
    /// Base mail subject
    #[serde(default = "default_subject")]
    pub subject: String,

    pub signals: SignalSet,

    /// Category label to URLs, in file order
    pub targets: Catalog,
}

impl Watchlist {
    /// Read and validate a watchlist file.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read watchlist {}", path.display()))?;

        Self::from_json(&raw).with_context(|| format!("Invalid watchlist {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        // Signals and targets validate themselves while deserializing.
        serde_json::from_str(raw).context("Failed to parse watchlist JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stock_judge::Matcher;

    const SAMPLE: &str = r#"{
        "subject": "Factory Refresh stock check",
        "signals": {
            "out_of_stock": [
                { "kind": "text", "text": "在庫がありません" },
                { "kind": "text", "text": "在庫なし" }
            ],
            "available": { "kind": "button", "label": "買い物かごに入れる" }
        },
        "targets": {
            "洗濯機": ["https://example.com/w/1", "https://example.com/w/2"],
            "冷蔵庫": ["https://example.com/r/1"]
        }
    }"#;

    #[test]
    fn test_parse_keeps_category_order() {
        let watchlist = Watchlist::from_json(SAMPLE).unwrap();

        let categories: Vec<_> = watchlist.targets.categories().map(|(c, _)| c).collect();
        assert_eq!(categories, vec!["洗濯機", "冷蔵庫"]);
        assert_eq!(watchlist.targets.len(), 3);
        assert_eq!(watchlist.subject, "Factory Refresh stock check");
    }

    #[test]
    fn test_parse_signals_in_priority_order() {
        let watchlist = Watchlist::from_json(SAMPLE).unwrap();

        let out_of_stock: Vec<_> = watchlist
            .signals
            .out_of_stock()
            .iter()
            .map(|s| s.matcher.clone())
            .collect();
        assert_eq!(
            out_of_stock,
            vec![Matcher::text("在庫がありません"), Matcher::text("在庫なし")]
        );
        assert_eq!(
            watchlist.signals.available().matcher,
            Matcher::button("買い物かごに入れる")
        );
    }

    #[test]
    fn test_subject_defaults() {
        let raw = r##"{
            "signals": { "available": { "kind": "css", "selector": "#buy" } },
            "targets": {}
        }"##;
        let watchlist = Watchlist::from_json(raw).unwrap();
        assert_eq!(watchlist.subject, "Stock check");
        assert!(watchlist.targets.is_empty());
    }

    #[test]
    fn test_duplicate_url_rejected() {
        let raw = r#"{
            "signals": { "available": { "kind": "text", "text": "Buy" } },
            "targets": { "A": ["https://example.com/1"], "B": ["https://example.com/1"] }
        }"#;
        assert!(Watchlist::from_json(raw).is_err());
    }

    #[test]
    fn test_empty_matcher_rejected() {
        let raw = r#"{
            "signals": { "available": { "kind": "text", "text": "  " } },
            "targets": {}
        }"#;
        assert!(Watchlist::from_json(raw).is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let watchlist = Watchlist::load(&path).await.unwrap();
        assert_eq!(watchlist.targets.len(), 3);

        let missing = Watchlist::load(&dir.path().join("nope.json")).await;
        assert!(missing.is_err());
    }
}
