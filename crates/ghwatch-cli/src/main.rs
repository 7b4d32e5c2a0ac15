//! `ghwatch` — watch GitHub repositories and push new or updated issues and
//! pull requests to Telegram.
//!
//! # Usage
//!
//! ```
//! ghwatch check                 # one pass
//! ghwatch run --interval 20     # repeat until SIGINT/SIGTERM
//! ghwatch watch acme/widgets
//! ghwatch repo acme/widgets     # open issues and PRs, live
//! ghwatch status
//! ```
//!
//! Settings come from `ghwatch.toml` (or `--config`) and `GHWATCH_*`
//! environment variables. Tokens are read from the variables the settings
//! name, `GITHUB_TOKEN`, `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` by default.

mod dashboard;
mod expiry;
mod pass;
mod report;
mod schedule;
mod settings;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context as _, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use ghwatch_core::{repository::split_full_name, source::RemoteSource, store::MonitorStore};
use ghwatch_github::{GitHubClient, GitHubConfig};
use ghwatch_store_sqlite::SqliteStore;
use ghwatch_telegram::{TelegramConfig, TelegramTransport};
use tokio::sync::watch;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

use crate::{
  pass::{PassReport, PassSettings, run_pass},
  settings::{Settings, env_secret},
};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "ghwatch", version, about = "GitHub repository monitor")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "ghwatch.toml", env = "GHWATCH_CONFIG")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Run a single pass: detect changes, then send pending notifications.
  Check {
    /// Print the pass report as JSON instead of text.
    #[arg(long)]
    json: bool,
  },
  /// Run passes continuously until interrupted.
  Run {
    /// Minutes between passes (defaults to monitoring.check_interval_minutes).
    #[arg(short, long)]
    interval: Option<u64>,
  },
  /// Show open issue and PR counts across your repositories.
  Dashboard {
    #[arg(short, long, default_value_t = 10)]
    limit: u32,
  },
  /// Show the latest open issues and pull requests of one repository.
  Repo { repo: String },
  /// Show store statistics and the watch list.
  Status,
  /// Start watching a repository (`owner/name`).
  Watch { repo: String },
  /// Stop watching a repository (`owner/name`).
  Unwatch { repo: String },
  /// Make failed notifications pending again.
  RetryFailed,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  match cli.command {
    Command::Check { json } => {
      let app = App::connect(settings).await?;
      let report = app.pass().await?;
      if json {
        print_json(&report)?;
      } else {
        print_report(&report);
      }
    }
    Command::Run { interval } => {
      let interval = interval
        .map(|m| Duration::from_secs(m.max(1) * 60))
        .unwrap_or_else(|| settings.check_interval());
      let app = App::connect(settings).await?;
      app.run(interval).await;
    }
    Command::Dashboard { limit } => {
      let github = github_client(&settings)?;
      let viewer = github.fetch_viewer().await.context("failed to fetch the authenticated user")?;
      let rows = dashboard::collect(&github, limit)
        .await
        .context("failed to list repositories")?;
      print!("{}", dashboard::render(&viewer, &rows, Utc::now()));
    }
    Command::Repo { repo } => {
      let (owner, name) = split_full_name(&repo)?;
      let full_name = format!("{owner}/{name}");
      let github = github_client(&settings)?;
      let detail = dashboard::collect_detail(&github, &full_name)
        .await
        .with_context(|| format!("failed to list open items of {full_name}"))?;
      print!("{}", dashboard::render_detail(&detail, Utc::now()));
    }
    Command::Status => {
      let store = open_store(&settings).await?;
      let stats = store.stats().await?;
      let watched = store.list_watched_repositories().await?;
      print!("{}", report::render_stats(&stats, &watched));
    }
    Command::Watch { repo } => {
      let (owner, name) = split_full_name(&repo)?;
      let github = github_client(&settings)?;
      let store = open_store(&settings).await?;
      let remote = github
        .fetch_repository(owner, name)
        .await
        .with_context(|| format!("failed to fetch {repo}"))?;
      let full_name = remote.full_name.clone();
      store.upsert_repository(remote).await?;
      store.set_watch_flag(&full_name, true).await?;
      println!("👀 Watching {full_name}");
    }
    Command::Unwatch { repo } => {
      let store = open_store(&settings).await?;
      if !store.set_watch_flag(&repo, false).await? {
        bail!("{repo} is not a known repository");
      }
      println!("Stopped watching {repo}");
    }
    Command::RetryFailed => {
      let store = open_store(&settings).await?;
      let reopened = store.reopen_failed_notifications().await?;
      println!("{reopened} failed notification(s) queued for retry");
    }
  }

  Ok(())
}

// ─── Wiring ───────────────────────────────────────────────────────────────────

/// Everything a pass needs, built once per process.
struct App {
  store:    SqliteStore,
  github:   GitHubClient,
  telegram: Option<TelegramTransport>,
  pass:     PassSettings,
}

impl App {
  async fn connect(settings: Settings) -> anyhow::Result<Self> {
    expiry::check_token_expiry(&settings.github);
    let github = github_client(&settings)?;
    let telegram = telegram_transport(&settings)?;
    let store = open_store(&settings).await?;
    Ok(Self { store, github, telegram, pass: PassSettings::from(&settings) })
  }

  async fn pass(&self) -> anyhow::Result<PassReport> {
    run_pass(&self.store, &self.github, self.telegram.as_ref(), &self.pass).await
  }

  /// Repeat passes until SIGINT or SIGTERM.
  async fn run(&self, interval: Duration) {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
      shutdown_signal().await;
      let _ = tx.send(true);
    });

    let app = self;
    schedule::run_until_shutdown(rx, interval, move || async move {
      match app.pass().await {
        Ok(report) => print_report(&report),
        Err(e) => error!(error = %format!("{e:#}"), "pass failed"),
      }
    })
    .await;
  }
}

fn github_client(settings: &Settings) -> anyhow::Result<GitHubClient> {
  let token_env = &settings.github.token_env;
  let Some(token) = env_secret(token_env) else {
    bail!("GitHub token not found; set {token_env}");
  };
  let mut config = GitHubConfig::new(token);
  config.api_url = settings.github.api_url.clone();
  config.timeout = Duration::from_secs(settings.github.timeout_secs);
  GitHubClient::new(config).context("failed to build GitHub client")
}

/// `None` when Telegram is disabled or its credentials are absent.
fn telegram_transport(settings: &Settings) -> anyhow::Result<Option<TelegramTransport>> {
  let telegram = &settings.telegram;
  if !telegram.enabled {
    return Ok(None);
  }
  let (Some(bot_token), Some(chat_id)) =
    (env_secret(&telegram.bot_token_env), env_secret(&telegram.chat_id_env))
  else {
    warn!(
      bot_token_env = %telegram.bot_token_env,
      chat_id_env = %telegram.chat_id_env,
      "Telegram credentials not set; notifications stay queued"
    );
    return Ok(None);
  };

  let mut config = TelegramConfig::new(bot_token, chat_id);
  config.api_url = telegram.api_url.clone();
  config.timeout = Duration::from_secs(telegram.timeout_secs);
  Ok(Some(TelegramTransport::new(config).context("failed to build Telegram client")?))
}

async fn open_store(settings: &Settings) -> anyhow::Result<SqliteStore> {
  let path = &settings.store_path;
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  SqliteStore::open(path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

async fn shutdown_signal() {
  let ctrl_c = tokio::signal::ctrl_c();
  #[cfg(unix)]
  {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
      Ok(mut sigterm) => tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down after this pass"),
        _ = sigterm.recv() => info!("received SIGTERM, shutting down after this pass"),
      },
      Err(e) => {
        warn!(error = %e, "could not install SIGTERM handler");
        ctrl_c.await.ok();
        info!("received SIGINT, shutting down after this pass");
      }
    }
  }
  #[cfg(not(unix))]
  {
    ctrl_c.await.ok();
    info!("received SIGINT, shutting down after this pass");
  }
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_report(report: &PassReport) {
  print!("{}", report::render_summary(&report.summary));
  if let Some(dispatch) = &report.dispatch {
    println!("{}", report::render_dispatch(dispatch));
  }
}

fn print_json(report: &PassReport) -> anyhow::Result<()> {
  let value = serde_json::json!({
    "origin": report.watchlist.origin,
    "repositories": report.watchlist.repos,
    "summary": report.summary,
    "dispatch": report.dispatch,
  });
  println!("{}", serde_json::to_string_pretty(&value)?);
  Ok(())
}
