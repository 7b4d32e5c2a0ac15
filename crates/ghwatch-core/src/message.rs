//! Rendering notification records into chat messages.
//!
//! Output is the HTML subset accepted by chat bot APIs: `<b>` and `<a>` only,
//! with `&`, `<` and `>` escaped in user-controlled text.

use crate::notification::{NotificationRecord, NotificationType};
use crate::item::ItemKind;

/// Default web base used for deep links.
pub const DEFAULT_WEB_URL: &str = "https://github.com";

/// Escape text for inclusion in an HTML message body.
pub fn escape_html(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      _ => out.push(c),
    }
  }
  out
}

/// Deep link to an item's web view: `/issues/N` for issues, `/pull/N` for
/// pull requests.
pub fn item_url(web_base: &str, repo: &str, kind: ItemKind, number: u64) -> String {
  let segment = match kind {
    ItemKind::Issue => "issues",
    ItemKind::PullRequest => "pull",
  };
  format!("{}/{repo}/{segment}/{number}", web_base.trim_end_matches('/'))
}

/// Render `record` as an HTML message.
pub fn render(record: &NotificationRecord, web_base: &str) -> String {
  let kind: NotificationType = record.notification_type;
  let repo = escape_html(&record.repo_full_name);
  let title = escape_html(&record.title);
  let header = format!("{} <b>{}</b>", kind.icon(), kind.label());

  match record.item_number {
    Some(number) => {
      let url = item_url(web_base, &record.repo_full_name, kind.item_kind(), number);
      format!(
        "{header}\n<b>{repo}#{number}</b>\n{title}\n<a href=\"{}\">View on GitHub</a>",
        escape_html(&url)
      )
    }
    None => format!("{header}\n<b>{repo}</b>\n{title}"),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn record(kind: NotificationType, number: Option<u64>, title: &str) -> NotificationRecord {
    NotificationRecord {
      notification_id:   1,
      notification_type: kind,
      repo_full_name:    "acme/widgets".into(),
      item_number:       number,
      title:             title.into(),
      created_at:        Utc::now(),
      sent_at:           None,
      send_error:        None,
    }
  }

  #[test]
  fn issue_links_to_issue_view() {
    let text = render(&record(NotificationType::NewIssue, Some(12), "Crash"), DEFAULT_WEB_URL);
    assert_eq!(
      text,
      "🆕 <b>New Issue</b>\n<b>acme/widgets#12</b>\nCrash\n\
       <a href=\"https://github.com/acme/widgets/issues/12\">View on GitHub</a>"
    );
  }

  #[test]
  fn pr_links_to_pull_view() {
    let text = render(&record(NotificationType::UpdatedPr, Some(4), "Refactor"), "https://ghe.local/");
    assert!(text.starts_with("📝 <b>PR Updated</b>"));
    assert!(text.contains("href=\"https://ghe.local/acme/widgets/pull/4\""));
  }

  #[test]
  fn no_number_omits_link() {
    let text = render(&record(NotificationType::NewPr, None, "Bulk"), DEFAULT_WEB_URL);
    assert_eq!(text, "🔀 <b>New PR</b>\n<b>acme/widgets</b>\nBulk");
  }

  #[test]
  fn title_is_escaped() {
    let text = render(&record(NotificationType::NewIssue, Some(1), "Vec<T> & co"), DEFAULT_WEB_URL);
    assert!(text.contains("Vec&lt;T&gt; &amp; co"));
  }

  #[test]
  fn every_type_has_distinct_label() {
    let labels = [
      NotificationType::NewIssue,
      NotificationType::UpdatedIssue,
      NotificationType::NewPr,
      NotificationType::UpdatedPr,
    ]
    .map(NotificationType::label);
    for (i, a) in labels.iter().enumerate() {
      for b in &labels[i + 1..] {
        assert_ne!(a, b);
      }
    }
  }
}
