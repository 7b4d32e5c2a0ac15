//! Notification records — the durable outbox.
//!
//! A record is *pending* while `sent_at` is unset. The dispatcher moves it to
//! a terminal state exactly once, whether delivery succeeded or not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::item::ItemKind;

/// Durable store-assigned notification id (monotonically increasing).
pub type NotificationId = i64;

// ─── Type ────────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
  NewIssue,
  UpdatedIssue,
  NewPr,
  UpdatedPr,
}

impl NotificationType {
  /// The notification emitted for a new or updated item of `kind`.
  pub fn for_change(kind: ItemKind, is_new: bool) -> Self {
    match (kind, is_new) {
      (ItemKind::Issue, true) => Self::NewIssue,
      (ItemKind::Issue, false) => Self::UpdatedIssue,
      (ItemKind::PullRequest, true) => Self::NewPr,
      (ItemKind::PullRequest, false) => Self::UpdatedPr,
    }
  }

  pub fn item_kind(self) -> ItemKind {
    match self {
      Self::NewIssue | Self::UpdatedIssue => ItemKind::Issue,
      Self::NewPr | Self::UpdatedPr => ItemKind::PullRequest,
    }
  }

  /// Human-readable label used in rendered messages.
  pub fn label(self) -> &'static str {
    match self {
      Self::NewIssue => "New Issue",
      Self::UpdatedIssue => "Issue Updated",
      Self::NewPr => "New PR",
      Self::UpdatedPr => "PR Updated",
    }
  }

  pub fn icon(self) -> &'static str {
    match self {
      Self::NewIssue => "🆕",
      Self::UpdatedIssue | Self::UpdatedPr => "📝",
      Self::NewPr => "🔀",
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Input to [`MonitorStore::enqueue_notification`](crate::store::MonitorStore::enqueue_notification).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
  pub notification_type: NotificationType,
  pub repo_full_name:    String,
  pub item_number:       Option<u64>,
  pub title:             String,
}

/// A persisted outbox entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
  pub notification_id:   NotificationId,
  pub notification_type: NotificationType,
  pub repo_full_name:    String,
  pub item_number:       Option<u64>,
  pub title:             String,
  pub created_at:        DateTime<Utc>,
  pub sent_at:           Option<DateTime<Utc>>,
  pub send_error:        Option<String>,
}

/// Delivery status, derived from `sent_at` and `send_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
  Pending,
  Sent,
  Failed,
}

impl NotificationRecord {
  pub fn status(&self) -> NotificationStatus {
    match (&self.sent_at, &self.send_error) {
      (None, _) => NotificationStatus::Pending,
      (Some(_), None) => NotificationStatus::Sent,
      (Some(_), Some(_)) => NotificationStatus::Failed,
    }
  }

  pub fn is_pending(&self) -> bool { self.sent_at.is_none() }
}
