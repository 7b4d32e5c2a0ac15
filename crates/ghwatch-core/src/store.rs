//! The `MonitorStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `ghwatch-store-sqlite`).
//! The detector, dispatcher and binary depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  item::{ItemKind, RemoteItem, TrackedItem, UpsertOutcome},
  notification::{NewNotification, NotificationId, NotificationRecord},
  repository::{RemoteRepository, RepoId, Repository},
};

/// Row counts across the store's collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
  pub repositories:  u64,
  pub watched:       u64,
  pub issues:        u64,
  pub pull_requests: u64,
  pub pending:       u64,
  pub sent:          u64,
  pub failed:        u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a durable monitor-state backend.
///
/// Every method is individually atomic and durable once its future resolves.
/// The store performs no retries; callers own retry policy.
pub trait MonitorStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Repositories ──────────────────────────────────────────────────────

  /// Insert-or-update keyed by `full_name` and return the durable id.
  ///
  /// On insert, `first_seen_at` and `last_checked_at` are set to now and the
  /// repository is watched. On conflict only the description, push time and
  /// `last_checked_at` change; id, `first_seen_at` and the watch flag are
  /// preserved.
  fn upsert_repository(
    &self,
    repo: RemoteRepository,
  ) -> impl Future<Output = Result<RepoId, Self::Error>> + Send + '_;

  /// Resolve a full name to its durable id. Returns `None` if unknown.
  fn find_repository_id<'a>(
    &'a self,
    full_name: &'a str,
  ) -> impl Future<Output = Result<Option<RepoId>, Self::Error>> + Send + 'a;

  /// Retrieve a repository by full name. Returns `None` if unknown.
  fn get_repository<'a>(
    &'a self,
    full_name: &'a str,
  ) -> impl Future<Output = Result<Option<Repository>, Self::Error>> + Send + 'a;

  /// Full names of all watched repositories, most recently pushed first.
  fn list_watched_repositories(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Flip the watch flag. Returns `false` if no repository matched.
  fn set_watch_flag<'a>(
    &'a self,
    full_name: &'a str,
    watched: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Tracked items ─────────────────────────────────────────────────────

  /// Insert-or-update an item keyed by `(repo_id, number)` within `kind`.
  ///
  /// Mutable fields are overwritten unconditionally; the returned outcome
  /// reports whether the row is new or strictly newer than before (see
  /// [`UpsertOutcome::classify`]). The read-compare-write runs as a single
  /// transaction.
  fn upsert_tracked_item<'a>(
    &'a self,
    repo_id: RepoId,
    kind: ItemKind,
    item: &'a RemoteItem,
  ) -> impl Future<Output = Result<UpsertOutcome, Self::Error>> + Send + 'a;

  /// All stored items of `kind` for a repository, ordered by number.
  fn list_tracked_items(
    &self,
    repo_id: RepoId,
    kind: ItemKind,
  ) -> impl Future<Output = Result<Vec<TrackedItem>, Self::Error>> + Send + '_;

  // ── Notification outbox ───────────────────────────────────────────────

  /// Append a pending notification and return the persisted record.
  fn enqueue_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<NotificationRecord, Self::Error>> + Send + '_;

  /// All pending notifications, oldest first.
  fn list_pending_notifications(
    &self,
  ) -> impl Future<Output = Result<Vec<NotificationRecord>, Self::Error>> + Send + '_;

  /// Record the terminal outcome of a delivery attempt.
  ///
  /// Sets `sent_at` to now and `send_error` to `error`. Callers must call this
  /// at most once per id.
  fn mark_notification_outcome(
    &self,
    id: NotificationId,
    error: Option<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Make every failed notification pending again. Returns how many rows
  /// were reopened. Never invoked by a normal pass.
  fn reopen_failed_notifications(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn stats(&self) -> impl Future<Output = Result<StoreStats, Self::Error>> + Send + '_;
}
