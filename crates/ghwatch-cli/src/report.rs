//! Plain-text reports printed to stdout.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use ghwatch_core::{
  detect::{Change, CheckSummary},
  dispatch::DispatchSummary,
  store::StoreStats,
};

const RULE: &str = "============================================================";

/// Human-readable summary of a detection pass.
pub fn render_summary(summary: &CheckSummary) -> String {
  let mut out = String::new();
  let total = summary.total_changes();

  if total == 0 {
    out.push_str("✓ No changes detected\n");
  } else {
    let _ = writeln!(out, "\n{RULE}\n  GitHub Activity Summary - {total} changes detected\n{RULE}\n");
  }

  section(&mut out, "🆕 New Issues", &summary.new_issues);
  section(&mut out, "📝 Updated Issues", &summary.updated_issues);
  section(&mut out, "🆕 New Pull Requests", &summary.new_prs);
  section(&mut out, "📝 Updated Pull Requests", &summary.updated_prs);

  if !summary.errors.is_empty() {
    let _ = writeln!(out, "❌ Errors ({})", summary.errors.len());
    for error in &summary.errors {
      let _ = writeln!(out, "  • {error}");
    }
    out.push('\n');
  }
  out
}

fn section(out: &mut String, heading: &str, changes: &[Change]) {
  if changes.is_empty() {
    return;
  }
  let _ = writeln!(out, "{heading} ({})", changes.len());
  for change in changes {
    let _ = writeln!(out, "  • {}#{}: {}", change.repo, change.number, change.title);
    if let Some(author) = &change.author {
      let _ = writeln!(out, "    by @{author}");
    }
  }
  out.push('\n');
}

pub fn render_dispatch(summary: &DispatchSummary) -> String {
  format!(
    "📱 Telegram: {} sent, {} failed, {} total",
    summary.sent, summary.failed, summary.total
  )
}

pub fn render_stats(stats: &StoreStats, watched: &[String]) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "Repositories: {} ({} watched)", stats.repositories, stats.watched);
  let _ = writeln!(out, "Tracked:      {} issues, {} pull requests", stats.issues, stats.pull_requests);
  let _ = writeln!(
    out,
    "Outbox:       {} pending, {} sent, {} failed",
    stats.pending, stats.sent, stats.failed
  );
  if !watched.is_empty() {
    out.push_str("\nWatching:\n");
    for name in watched {
      let _ = writeln!(out, "  • {name}");
    }
  }
  out
}

/// Compact relative time such as `3d ago` or `just now`.
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let diff = now - at;
  if diff.num_days() > 0 {
    format!("{}d ago", diff.num_days())
  } else if diff.num_hours() > 0 {
    format!("{}h ago", diff.num_hours())
  } else if diff.num_minutes() > 0 {
    format!("{}m ago", diff.num_minutes())
  } else {
    "just now".to_owned()
  }
}
