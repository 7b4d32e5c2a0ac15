//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as fixed-width RFC 3339 UTC strings with
//! microsecond precision, so text ordering in SQL equals time ordering.
//! Labels are stored as a compact JSON array. Item numbers are `INTEGER`.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use ghwatch_core::{
  item::{ItemKind, TrackedItem},
  notification::{NotificationRecord, NotificationType},
  repository::{RepoId, Repository},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── Numbers ─────────────────────────────────────────────────────────────────

pub fn encode_number(n: u64) -> Result<i64> {
  i64::try_from(n).map_err(|_| Error::NumberTooLarge { column: "item_number", value: n })
}

fn decode_number(column: &'static str, n: i64) -> Result<u64> {
  u64::try_from(n).map_err(|_| Error::OutOfRange { column, value: n })
}

// ─── Labels ──────────────────────────────────────────────────────────────────

pub fn encode_labels(labels: &[String]) -> Result<String> { Ok(serde_json::to_string(labels)?) }

pub fn decode_labels(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── ItemKind ────────────────────────────────────────────────────────────────

/// Table name and number column for an item kind.
pub fn item_table(kind: ItemKind) -> (&'static str, &'static str) {
  match kind {
    ItemKind::Issue => ("issues", "issue_number"),
    ItemKind::PullRequest => ("pull_requests", "pr_number"),
  }
}

// ─── Raw row types ───────────────────────────────────────────────────────────

/// Raw `repositories` row as read from the database.
pub struct RawRepository {
  pub repo_id:         RepoId,
  pub remote_id:       Option<i64>,
  pub full_name:       String,
  pub owner:           String,
  pub name:            String,
  pub description:     Option<String>,
  pub pushed_at:       Option<String>,
  pub first_seen_at:   String,
  pub last_checked_at: String,
  pub is_watched:      bool,
}

pub const REPOSITORY_COLUMNS: &str = "repo_id, remote_id, full_name, owner, name, description, \
                                      pushed_at, first_seen_at, last_checked_at, is_watched";

impl RawRepository {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      repo_id:         row.get(0)?,
      remote_id:       row.get(1)?,
      full_name:       row.get(2)?,
      owner:           row.get(3)?,
      name:            row.get(4)?,
      description:     row.get(5)?,
      pushed_at:       row.get(6)?,
      first_seen_at:   row.get(7)?,
      last_checked_at: row.get(8)?,
      is_watched:      row.get(9)?,
    })
  }

  pub fn into_repository(self) -> Result<Repository> {
    Ok(Repository {
      repo_id:         self.repo_id,
      remote_id:       self.remote_id,
      full_name:       self.full_name,
      owner:           self.owner,
      name:            self.name,
      description:     self.description,
      pushed_at:       decode_opt_dt(self.pushed_at)?,
      first_seen_at:   decode_dt(&self.first_seen_at)?,
      last_checked_at: decode_dt(&self.last_checked_at)?,
      is_watched:      self.is_watched,
    })
  }
}

/// Raw `issues` / `pull_requests` row as read from the database.
pub struct RawTrackedItem {
  pub repo_id:         RepoId,
  pub number:          i64,
  pub title:           String,
  pub state:           String,
  pub created_at:      String,
  pub updated_at:      String,
  pub author:          Option<String>,
  pub labels:          String,
  pub first_seen_at:   String,
  pub last_checked_at: String,
}

impl RawTrackedItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      repo_id:         row.get(0)?,
      number:          row.get(1)?,
      title:           row.get(2)?,
      state:           row.get(3)?,
      created_at:      row.get(4)?,
      updated_at:      row.get(5)?,
      author:          row.get(6)?,
      labels:          row.get(7)?,
      first_seen_at:   row.get(8)?,
      last_checked_at: row.get(9)?,
    })
  }

  pub fn into_item(self, kind: ItemKind) -> Result<TrackedItem> {
    Ok(TrackedItem {
      repo_id: self.repo_id,
      kind,
      number: decode_number("item_number", self.number)?,
      title: self.title,
      state: self.state,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      author: self.author,
      labels: decode_labels(&self.labels)?,
      first_seen_at: decode_dt(&self.first_seen_at)?,
      last_checked_at: decode_dt(&self.last_checked_at)?,
    })
  }
}

/// Raw `notifications` row as read from the database.
pub struct RawNotification {
  pub notification_id:   i64,
  pub notification_type: String,
  pub repo_full_name:    String,
  pub item_number:       Option<i64>,
  pub title:             String,
  pub created_at:        String,
  pub sent_at:           Option<String>,
  pub send_error:        Option<String>,
}

pub const NOTIFICATION_COLUMNS: &str = "notification_id, notification_type, repo_full_name, \
                                        item_number, title, created_at, sent_at, send_error";

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id:   row.get(0)?,
      notification_type: row.get(1)?,
      repo_full_name:    row.get(2)?,
      item_number:       row.get(3)?,
      title:             row.get(4)?,
      created_at:        row.get(5)?,
      sent_at:           row.get(6)?,
      send_error:        row.get(7)?,
    })
  }

  pub fn into_record(self) -> Result<NotificationRecord> {
    let notification_type = NotificationType::from_str(&self.notification_type)
      .map_err(|_| ghwatch_core::Error::UnknownNotificationType(self.notification_type.clone()))?;
    Ok(NotificationRecord {
      notification_id: self.notification_id,
      notification_type,
      repo_full_name: self.repo_full_name,
      item_number: self.item_number.map(|n| decode_number("item_number", n)).transpose()?,
      title: self.title,
      created_at: decode_dt(&self.created_at)?,
      sent_at: decode_opt_dt(self.sent_at)?,
      send_error: self.send_error,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_ordered() {
    let a = Utc.with_ymd_and_hms(2026, 2, 8, 9, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea, "2026-02-08T09:00:00.000000Z");
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn decode_accepts_remote_format() {
    let dt = decode_dt("2026-02-08T00:00:00Z").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2026, 2, 8, 0, 0, 0).unwrap());
  }

  #[test]
  fn decode_rejects_garbage() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }

  #[test]
  fn oversized_number_reports_itself() {
    assert_eq!(encode_number(42).unwrap(), 42);
    let err = encode_number(u64::MAX).unwrap_err();
    assert!(matches!(err, Error::NumberTooLarge { value: u64::MAX, .. }));
    assert_eq!(err.to_string(), format!("number {} does not fit column item_number", u64::MAX));
  }

  #[test]
  fn labels_roundtrip_as_json() {
    let labels = vec!["bug".to_string(), "help wanted".to_string()];
    let encoded = encode_labels(&labels).unwrap();
    assert_eq!(encoded, r#"["bug","help wanted"]"#);
    assert_eq!(decode_labels(&encoded).unwrap(), labels);
  }
}
