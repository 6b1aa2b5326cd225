//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::{Error, Result};

/// Backend used when `HRMS_API_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://api.thrivebrands-hrms.com/";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 15;

/// Settings shared by the HTTP client, the gateway and the refresh exchange.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root. Always ends with `/` so relative paths join under it.
    pub base_url: Url,
    /// Timeout applied to every resource request.
    pub request_timeout: Duration,
    /// Upper bound on one refresh exchange; expiry ends the session.
    pub refresh_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL"),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            refresh_timeout: Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS),
            user_agent: format!("hrms-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at `base_url` with default timeouts.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Build a config from `HRMS_API_URL`, `HRMS_REQUEST_TIMEOUT_SECS` and
    /// `HRMS_REFRESH_TIMEOUT_SECS`, falling back to defaults for unset values.
    ///
    /// Callers that want `.env` support load it first (`dotenvy::dotenv()`).
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("HRMS_API_URL") {
            config.base_url = normalize_base_url(&url)?;
        }
        if let Some(secs) = read_secs("HRMS_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_secs("HRMS_REFRESH_TIMEOUT_SECS")? {
            config.refresh_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Resolve `path` (optionally carrying a query string) against the base URL.
    pub fn endpoint(&self, path: &str) -> std::result::Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }
}

fn read_secs(var: &str) -> Result<Option<u64>> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| Error::config(format!("{var} must be a number of seconds: {e}"))),
        Err(_) => Ok(None),
    }
}

fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw).map_err(|e| Error::config(format!("Invalid API URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::config(format!("API URL '{raw}' cannot be a base")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
