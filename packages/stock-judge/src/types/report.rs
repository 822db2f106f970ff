//! The per-run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::ReportZone;
use super::judgment::Judgment;

/// Human-readable lines grouped by category, plus the aggregate flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Base subject, without alert decoration
    pub subject: String,

    /// Header, category and target lines in order
    pub lines: Vec<String>,

    /// Structured judgments in the same order as the target lines
    pub judgments: Vec<Judgment>,

    /// True when at least one judgment is `InStock`
    pub any_in_stock: bool,
}

impl Report {
    /// Report body as delivered to the log and the notifier.
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }

    /// Subject used when the notifier is alerted.
    pub fn alert_subject(&self) -> String {
        format!("⚠️ {} (in stock)", self.subject)
    }
}

/// `[2026/10/16 09:00:00 JST]`
pub fn header_line(now: DateTime<Utc>, zone: &ReportZone) -> String {
    let local = now.with_timezone(&zone.offset);
    format!("[{} {}]", local.format("%Y/%m/%d %H:%M:%S"), zone.label)
}

/// `■ <category>`
pub fn category_line(label: &str) -> String {
    format!("■ {label}")
}

/// Append-only report assembly, owned by the run aggregator.
#[derive(Debug)]
pub(crate) struct ReportBuilder {
    subject: String,
    lines: Vec<String>,
    judgments: Vec<Judgment>,
    any_in_stock: bool,
}

impl ReportBuilder {
    pub(crate) fn new(subject: impl Into<String>, now: DateTime<Utc>, zone: &ReportZone) -> Self {
        Self {
            subject: subject.into(),
            lines: vec![header_line(now, zone)],
            judgments: Vec::new(),
            any_in_stock: false,
        }
    }

    pub(crate) fn category(&mut self, label: &str) {
        self.lines.push(category_line(label));
    }

    pub(crate) fn push(&mut self, judgment: Judgment) {
        if judgment.state.is_in_stock() {
            self.any_in_stock = true;
        }
        self.lines.push(judgment.report_line());
        self.judgments.push(judgment);
    }

    pub(crate) fn finish(self) -> Report {
        Report {
            subject: self.subject,
            lines: self.lines,
            judgments: self.judgments,
            any_in_stock: self.any_in_stock,
        }
    }
}
