//! Remote activity views: an overview across the viewer's repositories and a
//! detail listing for one repository.
//!
//! Both read straight from the API and never touch the store.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use ghwatch_core::{
  item::{RemoteItem, StateFilter},
  source::RemoteSource,
};
use ghwatch_github::Viewer;
use tracing::warn;

use crate::report::relative_time;

/// Open items fetched per listing when counting.
const COUNT_LIMIT: u32 = 100;

/// Items fetched, and shown, per listing in the detail view.
const DETAIL_FETCH: u32 = 10;
const DETAIL_SHOWN: usize = 5;

/// Titles longer than this are cut in the detail view.
const TITLE_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoActivity {
  pub full_name:   String,
  pub description: Option<String>,
  pub pushed_at:   Option<DateTime<Utc>>,
  /// `None` when the listing failed.
  pub open_issues: Option<usize>,
  pub open_prs:    Option<usize>,
}

/// Collect activity for up to `limit` of the viewer's most recently pushed
/// repositories. Per-repository listing failures are logged and left blank.
pub async fn collect<R: RemoteSource>(source: &R, limit: u32) -> Result<Vec<RepoActivity>, R::Error> {
  let repos = source.fetch_viewer_repositories(limit).await?;
  let mut rows = Vec::with_capacity(repos.len());

  for repo in repos.into_iter().take(limit as usize) {
    let open_issues = match source.fetch_issues(&repo.full_name, StateFilter::Open, COUNT_LIMIT).await {
      Ok(items) => Some(items.len()),
      Err(e) => {
        warn!(repo = %repo.full_name, error = %e, "could not list issues");
        None
      }
    };
    let open_prs =
      match source.fetch_pull_requests(&repo.full_name, StateFilter::Open, COUNT_LIMIT).await {
        Ok(items) => Some(items.len()),
        Err(e) => {
          warn!(repo = %repo.full_name, error = %e, "could not list pull requests");
          None
        }
      };
    rows.push(RepoActivity {
      full_name: repo.full_name,
      description: repo.description,
      pushed_at: repo.pushed_at,
      open_issues,
      open_prs,
    });
  }
  Ok(rows)
}

pub fn render(viewer: &Viewer, rows: &[RepoActivity], now: DateTime<Utc>) -> String {
  let mut out = String::new();
  let display = viewer.name.as_deref().unwrap_or(&viewer.login);
  let _ = writeln!(out, "👤 {display} (@{})", viewer.login);
  let _ = writeln!(
    out,
    "   {} public repos · {} followers · {} following\n",
    viewer.public_repos, viewer.followers, viewer.following
  );

  if rows.is_empty() {
    out.push_str("No repositories found.\n");
    return out;
  }

  let total_issues: usize = rows.iter().filter_map(|r| r.open_issues).sum();
  let total_prs: usize = rows.iter().filter_map(|r| r.open_prs).sum();
  let _ = writeln!(
    out,
    "📦 {} repositories · {total_issues} open issues · {total_prs} open PRs\n",
    rows.len()
  );

  for row in rows {
    let pushed = row.pushed_at.map_or_else(|| "never".to_owned(), |at| relative_time(at, now));
    let _ = writeln!(
      out,
      "  {}  issues: {}  PRs: {}  pushed {pushed}",
      row.full_name,
      count(row.open_issues),
      count(row.open_prs),
    );
    if let Some(description) = row.description.as_deref().filter(|d| !d.is_empty()) {
      let _ = writeln!(out, "    {description}");
    }
  }
  out
}

fn count(n: Option<usize>) -> String { n.map_or_else(|| "?".to_owned(), |n| n.to_string()) }

// ─── Repository detail ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDetail {
  pub full_name: String,
  pub issues:    Vec<RemoteItem>,
  pub prs:       Vec<RemoteItem>,
}

/// Fetch the most recent open issues and pull requests of `full_name`.
pub async fn collect_detail<R: RemoteSource>(source: &R, full_name: &str) -> Result<RepoDetail, R::Error> {
  let mut issues = source.fetch_issues(full_name, StateFilter::Open, DETAIL_FETCH).await?;
  let mut prs = source.fetch_pull_requests(full_name, StateFilter::Open, DETAIL_FETCH).await?;
  issues.truncate(DETAIL_SHOWN);
  prs.truncate(DETAIL_SHOWN);
  Ok(RepoDetail { full_name: full_name.to_owned(), issues, prs })
}

pub fn render_detail(detail: &RepoDetail, now: DateTime<Utc>) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "REPOSITORY: {}", detail.full_name);

  out.push_str("\n🐛 Open Issues:\n");
  if detail.issues.is_empty() {
    out.push_str("  No open issues\n");
  }
  for issue in &detail.issues {
    let _ = writeln!(out, "  #{}: {}", issue.number, truncate(&issue.title, TITLE_WIDTH));
    if !issue.labels.is_empty() {
      let _ = writeln!(out, "      🏷️  {}", issue.labels.join(", "));
    }
    let _ = writeln!(
      out,
      "      📅 Created {} by {}",
      relative_time(issue.created_at, now),
      issue.author
    );
  }

  out.push_str("\n🔀 Open Pull Requests:\n");
  if detail.prs.is_empty() {
    out.push_str("  No open PRs\n");
  }
  for pr in &detail.prs {
    let _ = writeln!(out, "  #{}: {}", pr.number, truncate(&pr.title, TITLE_WIDTH));
    let _ = writeln!(out, "      📅 Created {} by {}", relative_time(pr.created_at, now), pr.author);
  }
  out
}

fn truncate(s: &str, max: usize) -> &str {
  match s.char_indices().nth(max) {
    Some((end, _)) => &s[..end],
    None => s,
  }
}
