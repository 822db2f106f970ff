//! Engine configuration.

use chrono::{FixedOffset, Offset, Utc};
use std::time::Duration;

use crate::error::ConfigError;
use crate::traits::browser::SessionProfile;

use super::signal::SignalSet;

/// Default content-wait budget per target.
pub const DEFAULT_WAIT_BUDGET: Duration = Duration::from_secs(15);

/// Default transport ceiling for one navigation.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Default ceiling for one diagnostic capture.
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);

/// Zone the report header timestamp is rendered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportZone {
    pub offset: FixedOffset,
    pub label: String,
}

impl ReportZone {
    pub fn new(offset: FixedOffset, label: impl Into<String>) -> Self {
        Self {
            offset,
            label: label.into(),
        }
    }

    /// Zone from a whole-hour offset; out-of-range offsets fall back to UTC.
    pub fn from_hours(hours: i32, label: impl Into<String>) -> Self {
        let offset = FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix());
        Self::new(offset, label)
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix(), "UTC")
    }
}

impl Default for ReportZone {
    /// Japan Standard Time.
    fn default() -> Self {
        Self::from_hours(9, "JST")
    }
}

/// Everything the engine needs for one run, passed in at construction.
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Signals in priority order
    pub signals: SignalSet,

    /// How long to wait for any signal to appear on one page
    pub wait_budget: Duration,

    /// Transport ceiling for one navigation; must exceed `wait_budget`
    pub navigation_timeout: Duration,

    /// Ceiling for one diagnostic capture
    pub capture_timeout: Duration,

    /// Locale, timezone and identity of the browsing session
    pub session: SessionProfile,

    /// Base subject for the report
    pub subject: String,

    /// Zone for the report header timestamp
    pub report_zone: ReportZone,
}

impl JudgeConfig {
    /// Create a config with default timeouts.
    pub fn new(signals: SignalSet) -> Self {
        Self {
            signals,
            wait_budget: DEFAULT_WAIT_BUDGET,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            capture_timeout: DEFAULT_CAPTURE_TIMEOUT,
            session: SessionProfile::default(),
            subject: "Stock check".to_string(),
            report_zone: ReportZone::default(),
        }
    }

    pub fn with_wait_budget(mut self, budget: Duration) -> Self {
        self.wait_budget = budget;
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout = timeout;
        self
    }

    pub fn with_session(mut self, session: SessionProfile) -> Self {
        self.session = session;
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_report_zone(mut self, zone: ReportZone) -> Self {
        self.report_zone = zone;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.signals.validate()?;
        if self.navigation_timeout <= self.wait_budget {
            return Err(ConfigError::TimeoutOrder {
                navigation: self.navigation_timeout,
                budget: self.wait_budget,
            });
        }
        Ok(())
    }
}
