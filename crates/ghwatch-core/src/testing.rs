//! In-process fakes for the collaborator traits.

use std::{
  collections::{HashMap, HashSet},
  sync::Mutex,
};

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use crate::{
  item::{ItemKind, RemoteItem, StateFilter, TrackedItem, UpsertOutcome},
  notification::{NewNotification, NotificationId, NotificationRecord},
  repository::{RemoteRepository, RepoId, Repository},
  source::RemoteSource,
  store::{MonitorStore, StoreStats},
  transport::Transport,
};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FakeError(pub String);

pub fn repo(full_name: &str) -> RemoteRepository {
  let (owner, name) = full_name.split_once('/').unwrap();
  RemoteRepository {
    remote_id:   None,
    full_name:   full_name.into(),
    owner:       owner.into(),
    name:        name.into(),
    description: None,
    pushed_at:   None,
  }
}

/// An open item whose `updated_at` is `hour` o'clock on a fixed day.
pub fn issue(number: u64, title: &str, hour: u32) -> RemoteItem {
  let at: DateTime<Utc> = Utc.with_ymd_and_hms(2026, 2, 8, hour, 0, 0).unwrap();
  RemoteItem {
    number,
    title: title.into(),
    state: "open".into(),
    created_at: at,
    updated_at: at,
    author: "octocat".into(),
    labels: vec![],
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
  repos:         Vec<Repository>,
  items:         HashMap<(ItemKind, RepoId, u64), TrackedItem>,
  notifications: Vec<NotificationRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

impl MemoryStore {
  pub fn all_notifications(&self) -> Vec<NotificationRecord> {
    self.inner.lock().unwrap().notifications.clone()
  }
}

impl MonitorStore for MemoryStore {
  type Error = FakeError;

  async fn upsert_repository(&self, repo: RemoteRepository) -> Result<RepoId, FakeError> {
    let mut inner = self.inner.lock().unwrap();
    let now = Utc::now();
    if let Some(existing) = inner.repos.iter_mut().find(|r| r.full_name == repo.full_name) {
      existing.description = repo.description;
      existing.pushed_at = repo.pushed_at;
      existing.last_checked_at = now;
      return Ok(existing.repo_id);
    }
    let repo_id = inner.repos.len() as RepoId + 1;
    inner.repos.push(Repository {
      repo_id,
      remote_id: repo.remote_id,
      full_name: repo.full_name,
      owner: repo.owner,
      name: repo.name,
      description: repo.description,
      pushed_at: repo.pushed_at,
      first_seen_at: now,
      last_checked_at: now,
      is_watched: true,
    });
    Ok(repo_id)
  }

  async fn find_repository_id(&self, full_name: &str) -> Result<Option<RepoId>, FakeError> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.repos.iter().find(|r| r.full_name == full_name).map(|r| r.repo_id))
  }

  async fn get_repository(&self, full_name: &str) -> Result<Option<Repository>, FakeError> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.repos.iter().find(|r| r.full_name == full_name).cloned())
  }

  async fn list_watched_repositories(&self) -> Result<Vec<String>, FakeError> {
    let inner = self.inner.lock().unwrap();
    let mut watched: Vec<&Repository> = inner.repos.iter().filter(|r| r.is_watched).collect();
    watched.sort_by(|a, b| b.pushed_at.cmp(&a.pushed_at));
    Ok(watched.into_iter().map(|r| r.full_name.clone()).collect())
  }

  async fn set_watch_flag(&self, full_name: &str, watched: bool) -> Result<bool, FakeError> {
    let mut inner = self.inner.lock().unwrap();
    Ok(match inner.repos.iter_mut().find(|r| r.full_name == full_name) {
      Some(r) => {
        r.is_watched = watched;
        true
      }
      None => false,
    })
  }

  async fn upsert_tracked_item(
    &self,
    repo_id: RepoId,
    kind: ItemKind,
    item: &RemoteItem,
  ) -> Result<UpsertOutcome, FakeError> {
    let mut inner = self.inner.lock().unwrap();
    let now = Utc::now();
    let key = (kind, repo_id, item.number);
    let previous = inner.items.get(&key).cloned();
    let outcome = UpsertOutcome::classify(previous.as_ref().map(|p| p.updated_at), item.updated_at);
    let row = match previous {
      Some(mut row) => {
        row.title = item.title.clone();
        row.state = item.state.clone();
        row.updated_at = item.updated_at;
        row.labels = item.labels.clone();
        row.last_checked_at = now;
        row
      }
      None => TrackedItem {
        repo_id,
        kind,
        number: item.number,
        title: item.title.clone(),
        state: item.state.clone(),
        created_at: item.created_at,
        updated_at: item.updated_at,
        author: Some(item.author.clone()),
        labels: item.labels.clone(),
        first_seen_at: now,
        last_checked_at: now,
      },
    };
    inner.items.insert(key, row);
    Ok(outcome)
  }

  async fn list_tracked_items(
    &self,
    repo_id: RepoId,
    kind: ItemKind,
  ) -> Result<Vec<TrackedItem>, FakeError> {
    let inner = self.inner.lock().unwrap();
    let mut items: Vec<TrackedItem> = inner
      .items
      .values()
      .filter(|i| i.repo_id == repo_id && i.kind == kind)
      .cloned()
      .collect();
    items.sort_by_key(|i| i.number);
    Ok(items)
  }

  async fn enqueue_notification(
    &self,
    input: NewNotification,
  ) -> Result<NotificationRecord, FakeError> {
    let mut inner = self.inner.lock().unwrap();
    let record = NotificationRecord {
      notification_id:   inner.notifications.len() as NotificationId + 1,
      notification_type: input.notification_type,
      repo_full_name:    input.repo_full_name,
      item_number:       input.item_number,
      title:             input.title,
      created_at:        Utc::now(),
      sent_at:           None,
      send_error:        None,
    };
    inner.notifications.push(record.clone());
    Ok(record)
  }

  async fn list_pending_notifications(&self) -> Result<Vec<NotificationRecord>, FakeError> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.notifications.iter().filter(|n| n.is_pending()).cloned().collect())
  }

  async fn mark_notification_outcome(
    &self,
    id: NotificationId,
    error: Option<String>,
  ) -> Result<(), FakeError> {
    let mut inner = self.inner.lock().unwrap();
    let record = inner
      .notifications
      .iter_mut()
      .find(|n| n.notification_id == id)
      .ok_or_else(|| FakeError(format!("no notification {id}")))?;
    record.sent_at = Some(Utc::now());
    record.send_error = error;
    Ok(())
  }

  async fn reopen_failed_notifications(&self) -> Result<u64, FakeError> {
    let mut inner = self.inner.lock().unwrap();
    let mut reopened = 0;
    for n in inner.notifications.iter_mut().filter(|n| n.send_error.is_some()) {
      n.sent_at = None;
      n.send_error = None;
      reopened += 1;
    }
    Ok(reopened)
  }

  async fn stats(&self) -> Result<StoreStats, FakeError> {
    let inner = self.inner.lock().unwrap();
    let count_kind = |k| inner.items.keys().filter(|(kind, _, _)| *kind == k).count() as u64;
    Ok(StoreStats {
      repositories:  inner.repos.len() as u64,
      watched:       inner.repos.iter().filter(|r| r.is_watched).count() as u64,
      issues:        count_kind(ItemKind::Issue),
      pull_requests: count_kind(ItemKind::PullRequest),
      pending:       inner.notifications.iter().filter(|n| n.is_pending()).count() as u64,
      sent:          inner
        .notifications
        .iter()
        .filter(|n| n.sent_at.is_some() && n.send_error.is_none())
        .count() as u64,
      failed:        inner.notifications.iter().filter(|n| n.send_error.is_some()).count() as u64,
    })
  }
}

// ─── Remote ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeRemote {
  issues:          HashMap<String, Vec<RemoteItem>>,
  prs:             HashMap<String, Vec<RemoteItem>>,
  repos:           HashMap<String, RemoteRepository>,
  viewer:          Vec<RemoteRepository>,
  failing:         HashSet<String>,
  /// Viewer listing returns an error.
  discovery_fails: bool,
}

impl FakeRemote {
  pub fn with_issues(mut self, repo: &str, items: Vec<RemoteItem>) -> Self {
    self.issues.insert(repo.into(), items);
    self
  }

  pub fn with_prs(mut self, repo: &str, items: Vec<RemoteItem>) -> Self {
    self.prs.insert(repo.into(), items);
    self
  }

  pub fn with_repo(mut self, repo: RemoteRepository) -> Self {
    self.repos.insert(repo.full_name.clone(), repo);
    self
  }

  pub fn with_viewer_repos(mut self, repos: Vec<RemoteRepository>) -> Self {
    self.viewer = repos;
    self
  }

  pub fn failing(mut self, repo: &str) -> Self {
    self.failing.insert(repo.into());
    self
  }

  pub fn failing_discovery(mut self) -> Self {
    self.discovery_fails = true;
    self
  }

  fn listing(
    &self,
    map: &HashMap<String, Vec<RemoteItem>>,
    repo: &str,
  ) -> Result<Vec<RemoteItem>, FakeError> {
    if self.failing.contains(repo) {
      return Err(FakeError(format!("GitHub API error 502 for {repo}")));
    }
    Ok(map.get(repo).cloned().unwrap_or_default())
  }
}

impl RemoteSource for FakeRemote {
  type Error = FakeError;

  async fn fetch_issues(
    &self,
    repo: &str,
    _state: StateFilter,
    _limit: u32,
  ) -> Result<Vec<RemoteItem>, FakeError> {
    self.listing(&self.issues, repo)
  }

  async fn fetch_pull_requests(
    &self,
    repo: &str,
    _state: StateFilter,
    _limit: u32,
  ) -> Result<Vec<RemoteItem>, FakeError> {
    self.listing(&self.prs, repo)
  }

  async fn fetch_repository(&self, owner: &str, name: &str) -> Result<RemoteRepository, FakeError> {
    let full_name = format!("{owner}/{name}");
    self.repos.get(&full_name).cloned().ok_or_else(|| FakeError(format!("404 {full_name}")))
  }

  async fn fetch_viewer_repositories(&self, _limit: u32) -> Result<Vec<RemoteRepository>, FakeError> {
    if self.discovery_fails {
      return Err(FakeError("GitHub API error 503 for /user/repos".into()));
    }
    Ok(self.viewer.clone())
  }
}

// ─── Transport ───────────────────────────────────────────────────────────────

/// Records delivered messages; fails the attempts whose 1-based index is
/// listed in `fail_on`.
#[derive(Default)]
pub struct FakeTransport {
  fail_on:   Vec<usize>,
  attempts:  Mutex<usize>,
  delivered: Mutex<Vec<String>>,
}

impl FakeTransport {
  pub fn failing_on(attempts: &[usize]) -> Self {
    Self { fail_on: attempts.to_vec(), ..Default::default() }
  }

  pub fn delivered(&self) -> Vec<String> { self.delivered.lock().unwrap().clone() }
}

impl Transport for FakeTransport {
  type Error = FakeError;

  async fn deliver(&self, text: &str) -> Result<(), FakeError> {
    let attempt = {
      let mut attempts = self.attempts.lock().unwrap();
      *attempts += 1;
      *attempts
    };
    if self.fail_on.contains(&attempt) {
      return Err(FakeError("chat rejected message".into()));
    }
    self.delivered.lock().unwrap().push(text.to_owned());
    Ok(())
  }
}
