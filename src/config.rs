use crate::error::ConfigError;

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SOURCE: &str = "http://www.ulsanpilot.co.kr/main/pilot_forecast.php";
pub const DEFAULT_TABLE_IDS: [&str; 2] = ["cz_or_assign_s01", "cz_or_assign_s02"];
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RESTRICTION_KEYWORDS: [&str; 2] = ["Heavy Weather", "Dense Fog"];
pub const DEFAULT_MAX_LINES_PER_PUSH: usize = 3;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where the schedule page is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSource {
    Url(String),
    File(PathBuf),
}

impl ScheduleSource {
    /// `http://` and `https://` values are URLs, anything else a file path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub source: ScheduleSource,
    pub table_ids: Vec<String>,
    pub check_interval: Duration,
    pub fetch_timeout: Duration,
    /// Per-request bound for FCM token exchange and sends.
    pub delivery_timeout: Duration,
    pub restriction_keywords: Vec<String>,
    pub max_lines_per_push: usize,
    /// Service-account JSON; `None` disables push delivery.
    pub fcm_credentials: Option<String>,
    pub log_level: String,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_ids.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one schedule table id is required".to_string(),
            ));
        }
        if self.check_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "check interval must be greater than zero".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "fetch timeout must be greater than zero".to_string(),
            ));
        }
        if self.delivery_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "delivery timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_lines_per_push == 0 {
            return Err(ConfigError::Invalid(
                "max lines per push must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            source: ScheduleSource::parse(DEFAULT_SOURCE),
            table_ids: DEFAULT_TABLE_IDS.iter().map(|id| id.to_string()).collect(),
            check_interval: DEFAULT_CHECK_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            restriction_keywords: DEFAULT_RESTRICTION_KEYWORDS
                .iter()
                .map(|keyword| keyword.to_string())
                .collect(),
            max_lines_per_push: DEFAULT_MAX_LINES_PER_PUSH,
            fcm_credentials: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Optional TOML file; every key falls back to the flag or default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bind: Option<SocketAddr>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub source: Option<String>,
    pub table_ids: Option<Vec<String>>,
    pub check_interval: Option<String>,
    pub fetch_timeout: Option<String>,
    pub delivery_timeout: Option<String>,
    pub restriction_keywords: Option<Vec<String>>,
    pub max_lines_per_push: Option<usize>,
    pub fcm_credentials_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }
}

/// Parses `90`, `90s`, `5m` or `1h`.
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    let raw = raw.trim();
    let invalid = || ConfigError::Invalid(format!("invalid duration '{raw}'"));
    let (digits, multiplier) = match raw.char_indices().last() {
        Some((idx, 's')) => (&raw[..idx], 1),
        Some((idx, 'm')) => (&raw[..idx], 60),
        Some((idx, 'h')) => (&raw[..idx], 3600),
        Some(_) => (raw, 1),
        None => return Err(invalid()),
    };
    let value: u64 = digits.trim().parse().map_err(|_| invalid())?;
    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

/// Reads service-account JSON from disk.
pub fn read_credentials_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })
}
