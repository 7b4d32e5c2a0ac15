//! Runtime configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `GHWATCH_*` environment variables (`__` separates sections, so
//! `GHWATCH_MONITORING__CHECK_INTERVAL_MINUTES=5`). Secrets never live in the
//! file; the file names the environment variables that hold them.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use ghwatch_core::{detect::DEFAULT_ITEM_LIMIT, message::DEFAULT_WEB_URL, watchlist::WatchlistConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub store_path: PathBuf,
  pub github:     GitHubSettings,
  pub telegram:   TelegramSettings,
  pub monitoring: MonitoringSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
  pub api_url:              String,
  /// Base for item deep links in notifications.
  pub web_url:              String,
  pub token_env:            String,
  /// Env var holding the token's RFC 3339 expiry instant, if tracked.
  pub token_expires_at_env: Option<String>,
  pub watched_repos:        Vec<String>,
  pub item_limit:           u32,
  pub timeout_secs:         u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
  pub enabled:       bool,
  pub api_url:       String,
  pub bot_token_env: String,
  pub chat_id_env:   String,
  pub timeout_secs:  u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringSettings {
  pub auto_watch_user_repos:  bool,
  pub max_repos_to_watch:     u32,
  pub check_interval_minutes: u64,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path: PathBuf::from("ghwatch.db"),
      github:     GitHubSettings::default(),
      telegram:   TelegramSettings::default(),
      monitoring: MonitoringSettings::default(),
    }
  }
}

impl Default for GitHubSettings {
  fn default() -> Self {
    Self {
      api_url:              ghwatch_github::DEFAULT_API_URL.to_owned(),
      web_url:              DEFAULT_WEB_URL.to_owned(),
      token_env:            "GITHUB_TOKEN".to_owned(),
      token_expires_at_env: Some("GITHUB_TOKEN_EXPIRES_AT".to_owned()),
      watched_repos:        Vec::new(),
      item_limit:           DEFAULT_ITEM_LIMIT,
      timeout_secs:         30,
    }
  }
}

impl Default for TelegramSettings {
  fn default() -> Self {
    Self {
      enabled:       true,
      api_url:       ghwatch_telegram::DEFAULT_API_URL.to_owned(),
      bot_token_env: "TELEGRAM_BOT_TOKEN".to_owned(),
      chat_id_env:   "TELEGRAM_CHAT_ID".to_owned(),
      timeout_secs:  10,
    }
  }
}

impl Default for MonitoringSettings {
  fn default() -> Self {
    Self { auto_watch_user_repos: true, max_repos_to_watch: 20, check_interval_minutes: 20 }
  }
}

impl Settings {
  /// Load settings from `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("GHWATCH")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("github.watched_repos"),
      )
      .build()
      .context("failed to read config file")?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }

  pub fn watchlist(&self) -> WatchlistConfig {
    WatchlistConfig {
      configured: self.github.watched_repos.clone(),
      auto_watch: self.monitoring.auto_watch_user_repos,
      max_repos:  self.monitoring.max_repos_to_watch,
    }
  }

  pub fn check_interval(&self) -> Duration {
    Duration::from_secs(self.monitoring.check_interval_minutes.max(1) * 60)
  }
}

/// Read a secret from the named environment variable; empty counts as unset.
pub fn env_secret(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
