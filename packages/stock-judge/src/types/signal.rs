//! UI signals that count as evidence for a stock state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// How a signal is located on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Matcher {
    /// The deepest element whose rendered text contains `text`, ignoring
    /// case and runs of whitespace
    Text { text: String },

    /// A button (or `role="button"`) whose label contains `label`, with the
    /// same case and whitespace rules as `Text`
    Button { label: String },

    /// Any element matching a CSS selector
    Css { selector: String },
}

impl Matcher {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn button(label: impl Into<String>) -> Self {
        Self::Button {
            label: label.into(),
        }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            selector: selector.into(),
        }
    }

    /// The raw pattern, whatever the kind.
    pub fn pattern(&self) -> &str {
        match self {
            Self::Text { text } => text,
            Self::Button { label } => label,
            Self::Css { selector } => selector,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pattern().trim().is_empty()
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { text } => write!(f, "text={text}"),
            Self::Button { label } => write!(f, "button:has-text({label:?})"),
            Self::Css { selector } => write!(f, "css={selector}"),
        }
    }
}

/// Which state a signal is evidence for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalRole {
    OutOfStock,
    Available,
}

/// A named matcher with its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub name: String,
    pub role: SignalRole,
    pub matcher: Matcher,
}

impl Signal {
    pub fn out_of_stock(matcher: Matcher) -> Self {
        Self::new(SignalRole::OutOfStock, matcher)
    }

    pub fn available(matcher: Matcher) -> Self {
        Self::new(SignalRole::Available, matcher)
    }

    fn new(role: SignalRole, matcher: Matcher) -> Self {
        Self {
            name: matcher.to_string(),
            role,
            matcher,
        }
    }
}

/// The configured signals: out-of-stock signals in priority order, then the
/// single available signal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSignalSet")]
pub struct SignalSet {
    out_of_stock: Vec<Signal>,
    available: Signal,
}

impl SignalSet {
    pub fn new(out_of_stock: impl IntoIterator<Item = Matcher>, available: Matcher) -> Self {
        Self {
            out_of_stock: out_of_stock.into_iter().map(Signal::out_of_stock).collect(),
            available: Signal::available(available),
        }
    }

    /// Out-of-stock signals, highest priority first.
    pub fn out_of_stock(&self) -> &[Signal] {
        &self.out_of_stock
    }

    pub fn available(&self) -> &Signal {
        &self.available
    }

    /// Every signal, out-of-stock first.
    pub fn all(&self) -> impl Iterator<Item = &Signal> {
        self.out_of_stock
            .iter()
            .chain(std::iter::once(&self.available))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for signal in self.all() {
            if signal.matcher.is_empty() {
                return Err(ConfigError::EmptyMatcher { role: signal.role });
            }
        }
        Ok(())
    }
}

/// Wire shape of a signal set in the watchlist file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSignalSet {
    #[serde(default)]
    pub out_of_stock: Vec<Matcher>,
    pub available: Matcher,
}

impl TryFrom<RawSignalSet> for SignalSet {
    type Error = ConfigError;

    fn try_from(raw: RawSignalSet) -> Result<Self, Self::Error> {
        let set = SignalSet::new(raw.out_of_stock, raw.available);
        set.validate()?;
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_yields_out_of_stock_first() {
        let set = SignalSet::new(
            vec![Matcher::text("SOLD OUT"), Matcher::text("No stock")],
            Matcher::button("ADD TO CART"),
        );

        let roles: Vec<_> = set.all().map(|s| s.role).collect();
        assert_eq!(
            roles,
            vec![
                SignalRole::OutOfStock,
                SignalRole::OutOfStock,
                SignalRole::Available
            ]
        );
        assert_eq!(set.all().count(), 3);
        assert_eq!(set.out_of_stock()[1].name, "text=No stock");
    }

    #[test]
    fn test_matcher_display() {
        assert_eq!(Matcher::text("SOLD OUT").to_string(), "text=SOLD OUT");
        assert_eq!(
            Matcher::button("ADD TO CART").to_string(),
            "button:has-text(\"ADD TO CART\")"
        );
        assert_eq!(Matcher::css("#buy").to_string(), "css=#buy");
    }

    #[test]
    fn test_deserialize_signal_set() {
        let json = r#"{
            "out_of_stock": [
                {"kind": "text", "text": "在庫がありません"},
                {"kind": "text", "text": "在庫なし"}
            ],
            "available": {"kind": "button", "label": "買い物かごに入れる"}
        }"#;

        let set: SignalSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.out_of_stock().len(), 2);
        assert_eq!(set.available().matcher, Matcher::button("買い物かごに入れる"));
    }

    #[test]
    fn test_deserialize_rejects_empty_matcher() {
        let json = r#"{
            "out_of_stock": [{"kind": "text", "text": "  "}],
            "available": {"kind": "button", "label": "Buy"}
        }"#;

        let err = serde_json::from_str::<SignalSet>(json).unwrap_err();
        assert!(err.to_string().contains("empty matcher"));
    }
}
