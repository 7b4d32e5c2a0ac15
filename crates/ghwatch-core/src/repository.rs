//! Repositories — the remote projects a monitor watches.
//!
//! A repository is identified by its `owner/name` full name. The store assigns
//! a durable numeric id on first observation and never changes it afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Durable store-assigned repository id.
pub type RepoId = i64;

// ─── Names ───────────────────────────────────────────────────────────────────

/// Split an `owner/name` full name into its two halves.
///
/// Both halves must be non-empty and the name must contain exactly one `/`.
pub fn split_full_name(full_name: &str) -> Result<(&str, &str)> {
  match full_name.split_once('/') {
    Some((owner, name))
      if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
    {
      Ok((owner, name))
    }
    _ => Err(Error::InvalidRepoName(full_name.to_owned())),
  }
}

// ─── Remote snapshot ─────────────────────────────────────────────────────────

/// Repository metadata as reported by the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
  /// The platform's own numeric id, when known.
  pub remote_id:   Option<i64>,
  pub full_name:   String,
  pub owner:       String,
  pub name:        String,
  pub description: Option<String>,
  pub pushed_at:   Option<DateTime<Utc>>,
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// A repository as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
  pub repo_id:         RepoId,
  pub remote_id:       Option<i64>,
  pub full_name:       String,
  pub owner:           String,
  pub name:            String,
  pub description:     Option<String>,
  pub pushed_at:       Option<DateTime<Utc>>,
  pub first_seen_at:   DateTime<Utc>,
  pub last_checked_at: DateTime<Utc>,
  pub is_watched:      bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn split_accepts_owner_and_name() {
    assert_eq!(split_full_name("rust-lang/rust").unwrap(), ("rust-lang", "rust"));
  }

  #[test]
  fn split_rejects_malformed_names() {
    for bad in ["", "rust", "/rust", "rust-lang/", "a/b/c"] {
      assert!(
        matches!(split_full_name(bad), Err(Error::InvalidRepoName(_))),
        "{bad:?} should be rejected"
      );
    }
  }
}
