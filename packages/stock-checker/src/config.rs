use anyhow::{bail, Context, Result};
use chrono::FixedOffset;
use dotenvy::dotenv;
use secrecy::SecretString;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use stock_judge::types::config::{
    DEFAULT_CAPTURE_TIMEOUT, DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_WAIT_BUDGET,
};
use stock_judge::{ReportZone, SessionProfile};

const SMTP_KEYS: [&str; 6] = [
    "SMTP_HOST",
    "SMTP_PORT",
    "SMTP_USER",
    "SMTP_PASS",
    "MAIL_FROM",
    "MAIL_TO",
];

/// Application configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    /// `None` when alerting is disabled (`--dry-run`)
    pub smtp: Option<SmtpConfig>,
    pub chromium: ChromiumOptions,
    pub watchlist_path: PathBuf,
    pub artifacts_dir: PathBuf,
    pub wait_budget: Duration,
    pub navigation_timeout: Duration,
    pub capture_timeout: Duration,
    /// Zone of the report header timestamp, independent of `timezone`
    pub report_zone: ReportZone,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub user_agent: Option<String>,
}

/// SMTP delivery settings.
#[derive(Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from: String,
    /// Comma-separated `MAIL_TO`, split and trimmed
    pub to: Vec<String>,
}

impl SmtpConfig {
    /// Port 465 means implicit TLS; anything else upgrades with STARTTLS.
    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }
}

/// How to start Chromium.
#[derive(Debug, Clone, Default)]
pub struct ChromiumOptions {
    pub headless: bool,
    /// Explicit binary (`CHROME_BIN`); probed when unset
    pub executable: Option<PathBuf>,
    pub no_sandbox: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env(require_smtp: bool) -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok(), require_smtp)
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F, require_smtp: bool) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let smtp = if require_smtp {
            let missing: Vec<&str> = SMTP_KEYS
                .into_iter()
                .filter(|key| get(*key).is_none())
                .collect();
            if !missing.is_empty() {
                bail!("missing mail settings: {}", missing.join(", "));
            }

            let required = |key: &str| get(key).with_context(|| format!("{key} must be set"));
            Some(SmtpConfig {
                host: required("SMTP_HOST")?,
                port: required("SMTP_PORT")?
                    .trim()
                    .parse()
                    .context("SMTP_PORT must be a valid port number")?,
                username: required("SMTP_USER")?,
                password: SecretString::from(required("SMTP_PASS")?),
                from: required("MAIL_FROM")?,
                to: required("MAIL_TO")?
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect(),
            })
        } else {
            None
        };

        let headless = match get("HEADLESS") {
            Some(v) => parse_bool(&v).context("HEADLESS must be true or false")?,
            None => true,
        };

        let no_sandbox = match get("NO_SANDBOX") {
            Some(v) => parse_bool(&v).context("NO_SANDBOX must be true or false")?,
            None => get("CI").is_some(),
        };

        Ok(Self {
            smtp,
            chromium: ChromiumOptions {
                headless,
                executable: get("CHROME_BIN").map(PathBuf::from),
                no_sandbox,
            },
            watchlist_path: get("WATCHLIST_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("watchlist.json")),
            artifacts_dir: get("ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("artifacts")),
            wait_budget: seconds(get("WAIT_BUDGET_SECS"), DEFAULT_WAIT_BUDGET)
                .context("WAIT_BUDGET_SECS must be a number of seconds")?,
            navigation_timeout: seconds(get("NAV_TIMEOUT_SECS"), DEFAULT_NAVIGATION_TIMEOUT)
                .context("NAV_TIMEOUT_SECS must be a number of seconds")?,
            capture_timeout: seconds(get("CAPTURE_TIMEOUT_SECS"), DEFAULT_CAPTURE_TIMEOUT)
                .context("CAPTURE_TIMEOUT_SECS must be a number of seconds")?,
            report_zone: report_zone(get("REPORT_UTC_OFFSET"), get("REPORT_ZONE_LABEL"))
                .context("REPORT_UTC_OFFSET must look like +09:00")?,
            locale: get("BROWSER_LOCALE"),
            timezone: get("BROWSER_TIMEZONE"),
            user_agent: get("BROWSER_USER_AGENT"),
        })
    }

    /// Default session profile with any env overrides applied.
    pub fn session_profile(&self) -> SessionProfile {
        let mut profile = SessionProfile::default();
        if let Some(locale) = &self.locale {
            profile = profile.with_locale(locale);
        }
        if let Some(timezone) = &self.timezone {
            profile = profile.with_timezone(timezone);
        }
        if let Some(user_agent) = &self.user_agent {
            profile = profile.with_user_agent(user_agent);
        }
        profile
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: {other}"),
    }
}

/// Header zone from an offset such as `+09:00` and an optional label.
/// An offset without a label is labelled `UTC+09:00`.
fn report_zone(offset: Option<String>, label: Option<String>) -> Result<ReportZone> {
    let zone = match offset {
        Some(raw) => {
            let offset: FixedOffset = raw.trim().parse()?;
            ReportZone::new(offset, format!("UTC{offset}"))
        }
        None => ReportZone::default(),
    };
    Ok(match label {
        Some(label) => ReportZone::new(zone.offset, label.trim()),
        None => zone,
    })
}

fn seconds(value: Option<String>, default: Duration) -> Result<Duration> {
    match value {
        Some(v) => Ok(Duration::try_from_secs_f64(v.trim().parse::<f64>()?)?),
        None => Ok(default),
    }
}
