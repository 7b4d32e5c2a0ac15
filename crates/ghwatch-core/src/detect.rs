//! Change detection — reconciling remote listings against stored state.
//!
//! For each repository the detector fetches the open issues and pull
//! requests, upserts every item into the store, and enqueues a notification
//! for each item the store reports as new or updated. Failures that concern a
//! single repository become entries in [`CheckSummary::errors`]; only store
//! failures abort the batch.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
  item::{ItemKind, RemoteItem, StateFilter},
  notification::{NewNotification, NotificationType},
  repository::RepoId,
  source::RemoteSource,
  store::MonitorStore,
};

/// Maximum number of items requested per listing.
pub const DEFAULT_ITEM_LIMIT: u32 = 50;

// ─── Summary ─────────────────────────────────────────────────────────────────

/// One detected change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
  pub repo:   String,
  pub number: u64,
  pub title:  String,
  /// Set for new items only.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum CheckErrorKind {
  /// The repository name has no row in the store.
  NotFound,
  /// Listing issues or pull requests failed.
  Fetch(String),
}

/// A failure isolated to one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckError {
  pub repo: String,
  #[serde(flatten)]
  pub kind: CheckErrorKind,
}

impl fmt::Display for CheckError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      CheckErrorKind::NotFound => write!(f, "{}: not found in store", self.repo),
      CheckErrorKind::Fetch(msg) => write!(f, "{}: {msg}", self.repo),
    }
  }
}

/// The aggregated result of [`ChangeDetector::check_repositories`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
  pub new_issues:     Vec<Change>,
  pub updated_issues: Vec<Change>,
  pub new_prs:        Vec<Change>,
  pub updated_prs:    Vec<Change>,
  pub errors:         Vec<CheckError>,
}

impl CheckSummary {
  pub fn total_changes(&self) -> usize {
    self.new_issues.len() + self.updated_issues.len() + self.new_prs.len() + self.updated_prs.len()
  }

  fn bucket(&mut self, kind: ItemKind, is_new: bool) -> &mut Vec<Change> {
    match (kind, is_new) {
      (ItemKind::Issue, true) => &mut self.new_issues,
      (ItemKind::Issue, false) => &mut self.updated_issues,
      (ItemKind::PullRequest, true) => &mut self.new_prs,
      (ItemKind::PullRequest, false) => &mut self.updated_prs,
    }
  }
}

// ─── Detector ────────────────────────────────────────────────────────────────

/// Reconciles remote listings against a [`MonitorStore`].
///
/// Holds no state of its own; everything it learns is written through the
/// store, so a pass can be interrupted and rerun at any point.
pub struct ChangeDetector<'a, S, R> {
  store:  &'a S,
  source: &'a R,
  limit:  u32,
}

impl<'a, S, R> ChangeDetector<'a, S, R>
where
  S: MonitorStore,
  R: RemoteSource,
{
  pub fn new(store: &'a S, source: &'a R) -> Self {
    Self { store, source, limit: DEFAULT_ITEM_LIMIT }
  }

  /// Override the per-listing item limit.
  pub fn with_limit(mut self, limit: u32) -> Self {
    self.limit = limit;
    self
  }

  /// Check `names` in order and return every change found.
  ///
  /// Repository-level failures are collected into the summary. A store
  /// error aborts the batch and is returned as-is.
  pub async fn check_repositories<N: AsRef<str>>(
    &self,
    names: &[N],
  ) -> Result<CheckSummary, S::Error> {
    let mut summary = CheckSummary::default();

    for name in names {
      let name = name.as_ref();
      let Some(repo_id) = self.store.find_repository_id(name).await? else {
        warn!(repo = name, "repository not found in store");
        summary.errors.push(CheckError { repo: name.to_owned(), kind: CheckErrorKind::NotFound });
        continue;
      };

      if let Err(message) = self.check_repository(repo_id, name, &mut summary).await? {
        warn!(repo = name, error = %message, "fetch failed");
        summary.errors.push(CheckError { repo: name.to_owned(), kind: CheckErrorKind::Fetch(message) });
      }
    }

    info!(
      repositories = names.len(),
      changes = summary.total_changes(),
      errors = summary.errors.len(),
      "check complete"
    );
    Ok(summary)
  }

  /// Returns `Ok(Err(message))` when a fetch failed; the outer `Result`
  /// carries store errors.
  async fn check_repository(
    &self,
    repo_id: RepoId,
    name: &str,
    summary: &mut CheckSummary,
  ) -> Result<Result<(), String>, S::Error> {
    for kind in [ItemKind::Issue, ItemKind::PullRequest] {
      let fetched = match kind {
        ItemKind::Issue => self.source.fetch_issues(name, StateFilter::Open, self.limit).await,
        ItemKind::PullRequest => {
          self.source.fetch_pull_requests(name, StateFilter::Open, self.limit).await
        }
      };
      let items = match fetched {
        Ok(items) => items,
        Err(e) => return Ok(Err(e.to_string())),
      };
      debug!(repo = name, %kind, count = items.len(), "fetched items");
      self.reconcile(repo_id, name, kind, &items, summary).await?;
    }
    Ok(Ok(()))
  }

  async fn reconcile(
    &self,
    repo_id: RepoId,
    name: &str,
    kind: ItemKind,
    items: &[RemoteItem],
    summary: &mut CheckSummary,
  ) -> Result<(), S::Error> {
    for item in items {
      let outcome = self.store.upsert_tracked_item(repo_id, kind, item).await?;
      if !outcome.is_change() {
        continue;
      }

      let notification_type = NotificationType::for_change(kind, outcome.is_new);
      self
        .store
        .enqueue_notification(NewNotification {
          notification_type,
          repo_full_name: name.to_owned(),
          item_number:    Some(item.number),
          title:          item.title.clone(),
        })
        .await?;

      debug!(repo = name, number = item.number, %notification_type, "change detected");
      summary.bucket(kind, outcome.is_new).push(Change {
        repo:   name.to_owned(),
        number: item.number,
        title:  item.title.clone(),
        author: outcome.is_new.then(|| item.author.clone()),
      });
    }
    Ok(())
  }
}
