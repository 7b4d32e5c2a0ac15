//! Deciding which repositories a pass checks.
//!
//! Precedence: repositories already watched in the store, then an explicitly
//! configured list, then auto-discovery of the viewer's own repositories.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{repository::split_full_name, source::RemoteSource, store::MonitorStore};

/// Inputs to [`resolve`] taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistConfig {
  /// Explicit `owner/name` entries, used only when the store watches nothing.
  #[serde(default)]
  pub configured: Vec<String>,
  #[serde(default = "default_auto_watch")]
  pub auto_watch: bool,
  #[serde(default = "default_max_repos")]
  pub max_repos:  u32,
}

fn default_auto_watch() -> bool { true }
fn default_max_repos() -> u32 { 20 }

impl Default for WatchlistConfig {
  fn default() -> Self {
    Self { configured: Vec::new(), auto_watch: default_auto_watch(), max_repos: default_max_repos() }
  }
}

/// Where a resolved watch list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchlistOrigin {
  Store,
  Configured,
  Discovered,
  Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
  pub origin: WatchlistOrigin,
  pub repos:  Vec<String>,
}

#[derive(Debug, Error)]
pub enum ResolveError<E: std::error::Error + 'static> {
  #[error("store error: {0}")]
  Store(#[source] E),
}

/// Resolve the repositories to check, registering configured or discovered
/// repositories in the store as a side effect.
///
/// A configured entry whose metadata cannot be fetched is still returned so
/// the detector reports it. A failed discovery yields an empty list; only
/// store errors are returned.
pub async fn resolve<S, R>(
  store: &S,
  source: &R,
  config: &WatchlistConfig,
) -> Result<Watchlist, ResolveError<S::Error>>
where
  S: MonitorStore,
  R: RemoteSource,
{
  let watched = store.list_watched_repositories().await.map_err(ResolveError::Store)?;
  if !watched.is_empty() {
    return Ok(Watchlist { origin: WatchlistOrigin::Store, repos: watched });
  }

  if !config.configured.is_empty() {
    info!(count = config.configured.len(), "registering configured repositories");
    for full_name in &config.configured {
      let fetched = match split_full_name(full_name) {
        Ok((owner, name)) => source.fetch_repository(owner, name).await.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
      };
      match fetched {
        Ok(repo) => {
          store.upsert_repository(repo).await.map_err(ResolveError::Store)?;
        }
        Err(error) => warn!(repo = %full_name, %error, "could not fetch repository metadata"),
      }
    }
    return Ok(Watchlist { origin: WatchlistOrigin::Configured, repos: config.configured.clone() });
  }

  if config.auto_watch {
    info!("no watched repositories; discovering the viewer's repositories");
    let mut repos = match source.fetch_viewer_repositories(config.max_repos).await {
      Ok(repos) => repos,
      Err(error) => {
        warn!(%error, "repository discovery failed; nothing to check this pass");
        return Ok(Watchlist { origin: WatchlistOrigin::Empty, repos: Vec::new() });
      }
    };
    repos.truncate(config.max_repos as usize);

    let mut names = Vec::with_capacity(repos.len());
    for repo in repos {
      let full_name = repo.full_name.clone();
      store.upsert_repository(repo).await.map_err(ResolveError::Store)?;
      // An explicit unwatch survives rediscovery.
      let watched = store
        .get_repository(&full_name)
        .await
        .map_err(ResolveError::Store)?
        .is_some_and(|r| r.is_watched);
      if watched {
        names.push(full_name);
      } else {
        debug!(repo = %full_name, "skipping unwatched repository");
      }
    }
    info!(count = names.len(), "now watching discovered repositories");
    return Ok(Watchlist { origin: WatchlistOrigin::Discovered, repos: names });
  }

  Ok(Watchlist { origin: WatchlistOrigin::Empty, repos: Vec::new() })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{FakeRemote, MemoryStore, repo};

  #[tokio::test]
  async fn store_takes_precedence() {
    let store = MemoryStore::default();
    store.upsert_repository(repo("acme/widgets")).await.unwrap();
    let config = WatchlistConfig { configured: vec!["acme/other".into()], ..Default::default() };

    let list = resolve(&store, &FakeRemote::default(), &config).await.unwrap();
    assert_eq!(list.origin, WatchlistOrigin::Store);
    assert_eq!(list.repos, ["acme/widgets"]);
  }

  #[tokio::test]
  async fn configured_repositories_are_registered() {
    let store = MemoryStore::default();
    let remote = FakeRemote::default().with_repo(repo("acme/widgets"));
    let config = WatchlistConfig {
      configured: vec!["acme/widgets".into(), "acme/gone".into(), "bogus".into()],
      ..Default::default()
    };

    let list = resolve(&store, &remote, &config).await.unwrap();
    assert_eq!(list.origin, WatchlistOrigin::Configured);
    assert_eq!(list.repos.len(), 3);
    assert!(store.find_repository_id("acme/widgets").await.unwrap().is_some());
    assert!(store.find_repository_id("acme/gone").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn discovery_respects_limit() {
    let store = MemoryStore::default();
    let remote = FakeRemote::default()
      .with_viewer_repos(vec![repo("me/a"), repo("me/b"), repo("me/c")]);
    let config = WatchlistConfig { max_repos: 2, ..Default::default() };

    let list = resolve(&store, &remote, &config).await.unwrap();
    assert_eq!(list.origin, WatchlistOrigin::Discovered);
    assert_eq!(list.repos, ["me/a", "me/b"]);
    assert_eq!(store.list_watched_repositories().await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn discovery_skips_unwatched_repositories() {
    let store = MemoryStore::default();
    store.upsert_repository(repo("me/old")).await.unwrap();
    store.set_watch_flag("me/old", false).await.unwrap();
    let remote = FakeRemote::default().with_viewer_repos(vec![repo("me/old"), repo("me/new")]);

    let list = resolve(&store, &remote, &WatchlistConfig::default()).await.unwrap();
    assert_eq!(list.origin, WatchlistOrigin::Discovered);
    assert_eq!(list.repos, ["me/new"]);
    assert!(!store.get_repository("me/old").await.unwrap().unwrap().is_watched);
  }

  #[tokio::test]
  async fn failed_discovery_is_an_empty_pass() {
    let store = MemoryStore::default();
    let remote = FakeRemote::default().failing_discovery();

    let list = resolve(&store, &remote, &WatchlistConfig::default()).await.unwrap();
    assert_eq!(list.origin, WatchlistOrigin::Empty);
    assert!(list.repos.is_empty());
  }

  #[tokio::test]
  async fn nothing_to_watch() {
    let store = MemoryStore::default();
    let config = WatchlistConfig { auto_watch: false, ..Default::default() };
    let list = resolve(&store, &FakeRemote::default(), &config).await.unwrap();
    assert_eq!(list.origin, WatchlistOrigin::Empty);
    assert!(list.repos.is_empty());
  }
}
