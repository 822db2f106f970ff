//! Targets and the catalog they come from.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

use crate::error::ConfigError;

/// One product page to judge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Identity within a run
    pub url: String,

    /// Report grouping label
    pub category: String,
}

impl Target {
    pub fn new(url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            category: category.into(),
        }
    }
}

/// Category label to ordered URLs, in the order the caller supplied them.
///
/// Deserializing validates the catalog; the builder methods do not, so
/// [`StockChecker::run_all`](crate::StockChecker::run_all) validates again
/// before opening a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, Vec<String>>", into = "IndexMap<String, Vec<String>>")]
pub struct Catalog {
    categories: IndexMap<String, Vec<String>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a category (or extend an existing one) with URLs.
    pub fn with_category(
        mut self,
        label: impl Into<String>,
        urls: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.categories
            .entry(label.into())
            .or_default()
            .extend(urls.into_iter().map(Into::into));
        self
    }

    /// Categories in catalog order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(label, urls)| (label.as_str(), urls.as_slice()))
    }

    /// All targets, flattened in catalog order.
    pub fn targets(&self) -> impl Iterator<Item = Target> + '_ {
        self.categories
            .iter()
            .flat_map(|(label, urls)| urls.iter().map(move |url| Target::new(url, label)))
    }

    /// Number of targets across all categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every URL must be absolute http(s) and appear once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for target in self.targets() {
            let parsed = Url::parse(&target.url).map_err(|e| ConfigError::InvalidUrl {
                url: target.url.clone(),
                reason: e.to_string(),
            })?;

            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl {
                    url: target.url.clone(),
                    reason: format!("unsupported scheme {}", parsed.scheme()),
                });
            }

            if !seen.insert(target.url.clone()) {
                return Err(ConfigError::DuplicateUrl { url: target.url });
            }
        }
        Ok(())
    }
}

impl TryFrom<IndexMap<String, Vec<String>>> for Catalog {
    type Error = ConfigError;

    fn try_from(categories: IndexMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        let catalog = Self { categories };
        catalog.validate()?;
        Ok(catalog)
    }
}

impl From<Catalog> for IndexMap<String, Vec<String>> {
    fn from(catalog: Catalog) -> Self {
        catalog.categories
    }
}
