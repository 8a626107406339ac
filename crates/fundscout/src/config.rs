//! Configuration management for Fundscout
//!
//! Defaults, then an optional YAML file, then `FUNDSCOUT_*` environment
//! variables. Command-line flags are applied last by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::endpoint::Endpoints;
use crate::progress::ProgressSettings;

pub const ENV_SERVER_URL: &str = "FUNDSCOUT_SERVER_URL";
pub const ENV_API_BASE: &str = "FUNDSCOUT_API_BASE";
pub const ENV_PAGE_PATH: &str = "FUNDSCOUT_PAGE_PATH";
pub const ENV_MOUNT_PREFIX: &str = "FUNDSCOUT_MOUNT_PREFIX";
pub const ENV_TIMEOUT_SECS: &str = "FUNDSCOUT_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Could not read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Could not parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("Invalid URL {value:?}: {source}")]
  InvalidUrl {
    value: String,
    #[source]
    source: url::ParseError,
  },

  #[error("Invalid configuration: {0}")]
  Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Origin the page is served from
  pub server_url: String,
  /// Explicit API base (absolute, or a path on `server_url`); skips the
  /// mount-prefix resolution when set
  pub api_base: Option<String>,
  /// Path of the page the form lives on
  pub page_path: String,
  /// Prefix the app is mounted under behind the reverse proxy
  pub mount_prefix: String,
  /// Request timeout in seconds
  pub timeout_secs: u64,
  /// Where exported PDFs are written
  pub download_dir: PathBuf,
  pub progress: ProgressSettings,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      server_url: "http://localhost:5000".to_string(),
      api_base: None,
      page_path: "/".to_string(),
      mount_prefix: "/film-funding".to_string(),
      timeout_secs: 120,
      download_dir: PathBuf::from("."),
      progress: ProgressSettings::default(),
    }
  }
}

impl Config {
  /// Load from `path` (if any) and the process environment, then validate
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    let mut config = match path {
      Some(path) => Self::from_file(path)?,
      None => Self::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path)
      .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    Self::from_yaml(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
  }

  pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
    if content.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(content)
  }

  /// Apply `FUNDSCOUT_*` values found through `lookup`
  pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(server_url) = lookup(ENV_SERVER_URL) {
      self.server_url = server_url;
    }
    if let Some(api_base) = lookup(ENV_API_BASE) {
      self.api_base = Some(api_base).filter(|base| !base.trim().is_empty());
    }
    if let Some(page_path) = lookup(ENV_PAGE_PATH) {
      self.page_path = page_path;
    }
    if let Some(mount_prefix) = lookup(ENV_MOUNT_PREFIX) {
      self.mount_prefix = mount_prefix;
    }
    if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
      self.timeout_secs = timeout.trim().parse().map_err(|_| {
        ConfigError::Invalid(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))
      })?;
    }
    Ok(())
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.timeout_secs == 0 {
      return Err(ConfigError::Invalid("timeout_secs must be greater than zero".to_string()));
    }
    if self.progress.tick_ms == 0 {
      return Err(ConfigError::Invalid("progress.tick_ms must be greater than zero".to_string()));
    }
    if self.progress.ceiling > 100 {
      return Err(ConfigError::Invalid("progress.ceiling cannot exceed 100".to_string()));
    }
    if !self.page_path.starts_with('/') {
      return Err(ConfigError::Invalid(format!(
        "page_path must start with '/' (got {:?})",
        self.page_path
      )));
    }
    self.endpoints().map(|_| ())
  }

  pub fn server(&self) -> Result<Url, ConfigError> {
    parse_url(&self.server_url)
  }

  pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
    let server = self.server()?;
    let invalid = |source| ConfigError::InvalidUrl {
      value: self.api_base.clone().unwrap_or_else(|| self.page_path.clone()),
      source,
    };

    match &self.api_base {
      Some(api_base) => {
        let base = server.join(api_base).map_err(invalid)?;
        Endpoints::from_base(&base).map_err(invalid)
      }
      None => Endpoints::for_page(&server, &self.page_path, &self.mount_prefix).map_err(invalid),
    }
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
  Url::parse(value.trim())
    .map_err(|source| ConfigError::InvalidUrl { value: value.to_string(), source })
}
