//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::safety::DEFAULT_POLL_INTERVAL;
use crate::session::DEFAULT_REVALIDATE_INTERVAL;
use crate::store::file::DEFAULT_QUOTA_BYTES;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

const FALLBACK_STORE_PATH: &str = ".eventa-store.json";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Configuration shared by the API client, the store and the pollers.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub api_url: String,
    /// Location of the persistent key-value file.
    pub store_path: PathBuf,
    /// How often the session is re-validated.
    pub session_interval: Duration,
    /// How often the safety feed polls.
    pub safety_interval: Duration,
    pub store_quota_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            store_path: default_store_path(),
            session_interval: DEFAULT_REVALIDATE_INTERVAL,
            safety_interval: DEFAULT_POLL_INTERVAL,
            store_quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl ClientConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                       | Default                          |
    /// |--------------------------------|----------------------------------|
    /// | `EVENTA_API_URL`               | `http://localhost:5000/api`      |
    /// | `EVENTA_STORE_PATH`            | `<config dir>/eventa/store.json` |
    /// | `EVENTA_SESSION_INTERVAL_SECS` | `10`                             |
    /// | `EVENTA_SAFETY_INTERVAL_SECS`  | `10`                             |
    /// | `EVENTA_STORE_QUOTA_BYTES`     | `5242880`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = match get("EVENTA_API_URL") {
            Some(raw) => normalize_api_url(&raw)
                .map_err(|message| ConfigError::invalid("EVENTA_API_URL", message))?,
            None => defaults.api_url,
        };

        Ok(Self {
            api_url,
            store_path: get("EVENTA_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            session_interval: interval(&get, "EVENTA_SESSION_INTERVAL_SECS")?
                .unwrap_or(defaults.session_interval),
            safety_interval: interval(&get, "EVENTA_SAFETY_INTERVAL_SECS")?
                .unwrap_or(defaults.safety_interval),
            store_quota_bytes: match get("EVENTA_STORE_QUOTA_BYTES") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    let message = format!("not a byte count: {raw}");
                    ConfigError::invalid("EVENTA_STORE_QUOTA_BYTES", message)
                })?,
                None => defaults.store_quota_bytes,
            },
        })
    }
}

/// Check that `raw` is an http(s) URL and drop any trailing slash.
pub fn normalize_api_url(raw: &str) -> Result<String, String> {
    let parsed = Url::parse(raw.trim()).map_err(|e| format!("{raw}: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw.trim().trim_end_matches('/').to_string()),
        other => Err(format!("unsupported scheme `{other}`")),
    }
}

fn interval(
    get: impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = get(key) else {
        return Ok(None);
    };
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, format!("not a number of seconds: {raw}")))?;
    if secs == 0 {
        return Err(ConfigError::invalid(key, "interval must be at least one second"));
    }
    Ok(Some(Duration::from_secs(secs)))
}

/// `<config dir>/eventa/store.json`, or `./.eventa-store.json` when the
/// platform has no config directory.
pub fn default_store_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("eventa").join("store.json"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_STORE_PATH))
}
