//! Wire shapes of the GitHub REST API responses ghwatch reads.
//!
//! Only the fields the monitor needs are declared; everything else in the
//! payload is ignored by serde.

use chrono::{DateTime, Utc};
use ghwatch_core::{item::RemoteItem, repository::RemoteRepository};
use serde::Deserialize;

/// Login used when the API reports a deleted ("ghost") author as `null`.
const GHOST_LOGIN: &str = "ghost";

#[derive(Debug, Deserialize)]
pub struct RawUser {
  pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct RawLabel {
  pub name: String,
}

/// An entry of `/repos/{repo}/issues` or `/repos/{repo}/pulls`.
#[derive(Debug, Deserialize)]
pub struct RawItem {
  pub number:       u64,
  pub title:        String,
  pub state:        String,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
  pub user:         Option<RawUser>,
  #[serde(default)]
  pub labels:       Vec<RawLabel>,
  /// Present only when an issues-endpoint entry is really a pull request.
  #[serde(default)]
  pub pull_request: Option<serde_json::Value>,
}

impl RawItem {
  pub fn is_pull_request(&self) -> bool { self.pull_request.is_some() }

  pub fn into_item(self) -> RemoteItem {
    RemoteItem {
      number:     self.number,
      title:      self.title,
      state:      self.state,
      created_at: self.created_at,
      updated_at: self.updated_at,
      author:     self.user.map_or_else(|| GHOST_LOGIN.to_owned(), |u| u.login),
      labels:     self.labels.into_iter().map(|l| l.name).collect(),
    }
  }
}

/// `/repos/{owner}/{name}` or an entry of `/user/repos`.
#[derive(Debug, Deserialize)]
pub struct RawRepo {
  pub id:          Option<i64>,
  pub full_name:   String,
  pub owner:       RawUser,
  pub name:        String,
  pub description: Option<String>,
  pub pushed_at:   Option<DateTime<Utc>>,
}

impl RawRepo {
  pub fn into_repository(self) -> RemoteRepository {
    RemoteRepository {
      remote_id:   self.id,
      full_name:   self.full_name,
      owner:       self.owner.login,
      name:        self.name,
      description: self.description,
      pushed_at:   self.pushed_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  const ISSUES: &str = r#"[
    {
      "number": 1,
      "title": "Test issue",
      "state": "open",
      "created_at": "2026-02-08T00:00:00Z",
      "updated_at": "2026-02-08T01:30:00Z",
      "user": { "login": "testuser", "id": 7 },
      "labels": [{ "name": "bug", "color": "f00" }, { "name": "p1" }],
      "comments": 3
    },
    {
      "number": 2,
      "title": "A PR seen through the issues endpoint",
      "state": "open",
      "created_at": "2026-02-08T00:00:00Z",
      "updated_at": "2026-02-08T00:00:00Z",
      "user": null,
      "pull_request": { "url": "https://api.github.com/repos/o/r/pulls/2" }
    }
  ]"#;

  #[test]
  fn issue_listing_parses_and_flags_prs() {
    let raw: Vec<RawItem> = serde_json::from_str(ISSUES).unwrap();
    assert!(!raw[0].is_pull_request());
    assert!(raw[1].is_pull_request());

    let mut raw = raw.into_iter();
    let first = raw.next().unwrap().into_item();
    assert_eq!(first.number, 1);
    assert_eq!(first.author, "testuser");
    assert_eq!(first.labels, ["bug", "p1"]);
    assert_eq!(first.updated_at, Utc.with_ymd_and_hms(2026, 2, 8, 1, 30, 0).unwrap());

    let second = raw.next().unwrap().into_item();
    assert_eq!(second.author, "ghost");
    assert!(second.labels.is_empty());
  }

  #[test]
  fn repository_parses_optional_fields() {
    let raw: RawRepo = serde_json::from_str(
      r#"{
        "id": 12345,
        "full_name": "test/repo",
        "owner": { "login": "test" },
        "name": "repo",
        "description": null,
        "pushed_at": "2026-02-08T00:00:00Z",
        "stargazers_count": 4
      }"#,
    )
    .unwrap();
    let repo = raw.into_repository();
    assert_eq!(repo.remote_id, Some(12345));
    assert_eq!(repo.owner, "test");
    assert_eq!(repo.description, None);
    assert!(repo.pushed_at.is_some());
  }

  #[test]
  fn malformed_timestamp_is_rejected() {
    let res: Result<RawItem, _> = serde_json::from_str(
      r#"{ "number": 1, "title": "t", "state": "open",
           "created_at": "yesterday", "updated_at": "2026-02-08T00:00:00Z" }"#,
    );
    assert!(res.is_err());
  }
}
