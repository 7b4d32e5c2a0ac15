//! One monitoring pass: resolve the watch list, detect changes, drain the
//! outbox.

use anyhow::Context as _;
use ghwatch_core::{
  detect::{ChangeDetector, CheckSummary},
  dispatch::{DispatchSummary, Dispatcher},
  source::RemoteSource,
  store::MonitorStore,
  transport::Transport,
  watchlist::{self, Watchlist, WatchlistConfig, WatchlistOrigin},
};
use tracing::{info, warn};

use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct PassSettings {
  pub watchlist:  WatchlistConfig,
  pub item_limit: u32,
  pub web_url:    String,
}

impl From<&Settings> for PassSettings {
  fn from(settings: &Settings) -> Self {
    Self {
      watchlist:  settings.watchlist(),
      item_limit: settings.github.item_limit,
      web_url:    settings.github.web_url.clone(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct PassReport {
  pub watchlist: Watchlist,
  pub summary:   CheckSummary,
  /// `None` when no transport was configured.
  pub dispatch:  Option<DispatchSummary>,
}

/// Run a single pass. Store errors abort it; per-repository failures end up
/// in the summary.
pub async fn run_pass<S, R, T>(
  store: &S,
  source: &R,
  transport: Option<&T>,
  settings: &PassSettings,
) -> anyhow::Result<PassReport>
where
  S: MonitorStore,
  R: RemoteSource,
  T: Transport,
{
  let watchlist = watchlist::resolve(store, source, &settings.watchlist)
    .await
    .context("failed to resolve repositories to watch")?;

  if watchlist.origin == WatchlistOrigin::Empty {
    warn!("no repositories to watch; configure github.watched_repos or enable auto-watch");
  }
  info!(origin = ?watchlist.origin, repositories = watchlist.repos.len(), "checking repositories");

  let summary = ChangeDetector::new(store, source)
    .with_limit(settings.item_limit)
    .check_repositories(&watchlist.repos)
    .await
    .context("store error during change detection")?;

  let dispatch = match transport {
    Some(transport) => Some(
      Dispatcher::new(store, transport)
        .with_web_base(settings.web_url.as_str())
        .send_pending()
        .await
        .context("store error while sending notifications")?,
    ),
    None => None,
  };

  Ok(PassReport { watchlist, summary, dispatch })
}
