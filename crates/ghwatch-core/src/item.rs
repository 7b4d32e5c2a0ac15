//! Tracked items — issues and pull requests in a single shape.
//!
//! Issues and pull requests do not share a number space here: each kind is a
//! separate collection keyed by `(repo_id, number)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::repository::RepoId;

// ─── Kinds and filters ───────────────────────────────────────────────────────

/// Which collection a tracked item belongs to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
  Issue,
  #[serde(rename = "pr")]
  #[strum(serialize = "pr")]
  PullRequest,
}

/// Remote-side state filter applied when listing items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum StateFilter {
  #[default]
  Open,
  Closed,
  All,
}

// ─── Remote snapshot ─────────────────────────────────────────────────────────

/// An issue or pull request as reported by the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
  pub number:     u64,
  pub title:      String,
  /// Opaque remote state (`open`, `closed`, ...).
  pub state:      String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub author:     String,
  pub labels:     Vec<String>,
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// An issue or pull request as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedItem {
  pub repo_id:         RepoId,
  pub kind:            ItemKind,
  pub number:          u64,
  pub title:           String,
  pub state:           String,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
  pub author:          Option<String>,
  pub labels:          Vec<String>,
  pub first_seen_at:   DateTime<Utc>,
  pub last_checked_at: DateTime<Utc>,
}

// ─── Upsert classification ───────────────────────────────────────────────────

/// How an upsert related the incoming item to what was stored before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpsertOutcome {
  pub is_new:      bool,
  pub was_updated: bool,
}

impl UpsertOutcome {
  /// Classify an observation given the previously stored `updated_at`.
  ///
  /// An item counts as updated only when the incoming timestamp is strictly
  /// later than the stored one. Equal timestamps are unchanged even if the
  /// title or labels differ.
  pub fn classify(stored: Option<DateTime<Utc>>, incoming: DateTime<Utc>) -> Self {
    match stored {
      None => Self { is_new: true, was_updated: false },
      Some(stored) => Self { is_new: false, was_updated: incoming > stored },
    }
  }

  pub fn is_change(&self) -> bool { self.is_new || self.was_updated }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use chrono::TimeZone;

  use super::*;

  fn at(h: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(2026, 2, 8, h, 0, 0).unwrap() }

  #[test]
  fn first_observation_is_new() {
    let o = UpsertOutcome::classify(None, at(1));
    assert_eq!(o, UpsertOutcome { is_new: true, was_updated: false });
    assert!(o.is_change());
  }

  #[test]
  fn later_timestamp_is_update() {
    let o = UpsertOutcome::classify(Some(at(1)), at(2));
    assert_eq!(o, UpsertOutcome { is_new: false, was_updated: true });
  }

  #[test]
  fn equal_or_earlier_timestamp_is_unchanged() {
    assert!(!UpsertOutcome::classify(Some(at(2)), at(2)).is_change());
    assert!(!UpsertOutcome::classify(Some(at(2)), at(1)).is_change());
  }

  #[test]
  fn kind_text_form() {
    assert_eq!(ItemKind::Issue.as_ref(), "issue");
    assert_eq!(ItemKind::PullRequest.to_string(), "pr");
    assert_eq!(ItemKind::from_str("pr").unwrap(), ItemKind::PullRequest);
    assert_eq!(StateFilter::All.as_ref(), "all");
  }
}
