use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "PROJPAGE_API_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub query: QueryConfig,
  #[serde(default)]
  pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Server origin; `/api/projects` is resolved against it
  #[serde(default = "default_base_url")]
  pub base_url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
  /// How long a fetched page is served from cache without a new request
  #[serde(default = "default_stale_time_ms")]
  pub stale_time_ms: u64,
  /// Keep showing the last page while the next one loads
  #[serde(default = "default_true")]
  pub keep_previous_data: bool,
  /// Refetch a stale page when the terminal regains focus
  #[serde(default = "default_true")]
  pub refetch_on_focus: bool,
}

impl Default for QueryConfig {
  fn default() -> Self {
    Self {
      stale_time_ms: default_stale_time_ms(),
      keep_previous_data: true,
      refetch_on_focus: true,
    }
  }
}

impl QueryConfig {
  pub fn stale_time(&self) -> Duration {
    Duration::from_millis(self.stale_time_ms)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
  #[serde(default = "default_tick_rate_ms")]
  pub tick_rate_ms: u64,
  /// Whether the cache inspector starts open
  #[serde(default = "default_true")]
  pub devtools_open: bool,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      tick_rate_ms: default_tick_rate_ms(),
      devtools_open: true,
    }
  }
}

impl UiConfig {
  pub fn tick_rate(&self) -> Duration {
    Duration::from_millis(self.tick_rate_ms)
  }
}

fn default_base_url() -> String {
  "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

fn default_stale_time_ms() -> u64 {
  5000
}

fn default_tick_rate_ms() -> u64 {
  100
}

fn default_true() -> bool {
  true
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./projpage.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/projpage/config.yaml
  ///
  /// Falls back to defaults when no file is found. `PROJPAGE_API_URL`
  /// overrides the base URL either way.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    if let Ok(url) = std::env::var(API_URL_ENV) {
      config.api.base_url = url;
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("projpage.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("projpage").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty file deserializes as null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }
}
