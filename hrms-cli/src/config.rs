use std::path::{Path, PathBuf};
use std::time::Duration;

use hrms_client::ClientConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

const APP_DIR: &str = "hrms";
const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.json";

/// Settings read from `config.toml`. Unset fields fall back to the
/// environment, then to library defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub refresh_timeout_secs: Option<u64>,
    /// Log filter directive, e.g. `hrms_client=debug`.
    pub log_filter: Option<String>,
    /// Write rotated log files here in addition to the console.
    pub log_dir: Option<PathBuf>,
    /// Where the session is persisted between runs.
    pub session_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load the config file, or defaults if it does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                CliError::Config(format!("Failed to parse {}: {e}", path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()
                .ok_or_else(|| CliError::Config("No configuration directory available".into()))?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.show()?)?;
        Ok(path)
    }

    /// Overwrite the config file with defaults.
    pub fn reset(path: Option<&Path>) -> Result<PathBuf> {
        Self::default().save(path)
    }

    pub fn show(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {e}")))
    }

    /// Environment settings with this file's values and `api_url_override`
    /// applied on top.
    pub fn client_config(&self, api_url_override: Option<&str>) -> Result<ClientConfig> {
        let mut config = ClientConfig::from_env()?;

        if let Some(url) = api_url_override.or(self.api_url.as_deref()) {
            config = ClientConfig {
                request_timeout: config.request_timeout,
                refresh_timeout: config.refresh_timeout,
                ..ClientConfig::new(url)?
            };
        }
        if let Some(secs) = self.request_timeout_secs {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.refresh_timeout_secs {
            config = config.with_refresh_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn session_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.session_file {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join(SESSION_FILE))
            .ok_or_else(|| {
                CliError::Config("No data directory available for the session file".into())
            })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
