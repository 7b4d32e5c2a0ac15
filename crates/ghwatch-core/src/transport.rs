//! The `Transport` trait — outbound delivery of rendered notifications.

use std::future::Future;

/// A push channel for human-readable messages.
///
/// `Ok(())` means the remote side accepted the message. Any rejection or
/// transport failure is an `Err`; its `Display` output is what the dispatcher
/// records as the notification's `send_error`.
pub trait Transport: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn deliver<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
