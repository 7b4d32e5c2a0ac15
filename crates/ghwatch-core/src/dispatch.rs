//! Notification dispatch — draining the outbox through a [`Transport`].
//!
//! Every pending record gets exactly one delivery attempt per drain and is
//! then marked terminal, successful or not. Failed records are not retried
//! automatically; see [`MonitorStore::reopen_failed_notifications`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
  message::{self, DEFAULT_WEB_URL},
  store::MonitorStore,
  transport::Transport,
};

/// Counts returned by [`Dispatcher::send_pending`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
  pub sent:   usize,
  pub failed: usize,
  pub total:  usize,
}

pub struct Dispatcher<'a, S, T> {
  store:     &'a S,
  transport: &'a T,
  web_base:  String,
}

impl<'a, S, T> Dispatcher<'a, S, T>
where
  S: MonitorStore,
  T: Transport,
{
  pub fn new(store: &'a S, transport: &'a T) -> Self {
    Self { store, transport, web_base: DEFAULT_WEB_URL.to_owned() }
  }

  /// Base URL for item deep links in rendered messages.
  pub fn with_web_base(mut self, web_base: impl Into<String>) -> Self {
    self.web_base = web_base.into();
    self
  }

  /// Deliver all pending notifications, oldest first.
  ///
  /// Transport failures are recorded on the record and counted; store
  /// failures abort the drain.
  pub async fn send_pending(&self) -> Result<DispatchSummary, S::Error> {
    let pending = self.store.list_pending_notifications().await?;
    let mut summary = DispatchSummary { total: pending.len(), ..Default::default() };

    for record in &pending {
      let text = message::render(record, &self.web_base);
      match self.transport.deliver(&text).await {
        Ok(()) => {
          self.store.mark_notification_outcome(record.notification_id, None).await?;
          debug!(notification_id = record.notification_id, "notification sent");
          summary.sent += 1;
        }
        Err(e) => {
          let error = format!("failed to send: {e}");
          warn!(notification_id = record.notification_id, %error, "notification failed");
          self.store.mark_notification_outcome(record.notification_id, Some(error)).await?;
          summary.failed += 1;
        }
      }
    }

    if summary.total > 0 {
      info!(sent = summary.sent, failed = summary.failed, total = summary.total, "dispatch complete");
    }
    Ok(summary)
  }
}

/// Drain the outbox of `store` through `transport` with default settings.
pub async fn send_pending<S, T>(store: &S, transport: &T) -> Result<DispatchSummary, S::Error>
where
  S: MonitorStore,
  T: Transport,
{
  Dispatcher::new(store, transport).send_pending().await
}
