//! The `run` loop: passes separated by a fixed sleep, until shutdown.

use std::{future::Future, time::Duration};

use tokio::sync::watch;
use tracing::{debug, info};

/// Run `pass` repeatedly with `interval` between runs until `shutdown`
/// turns true. Returns the number of passes run.
///
/// The flag is checked between passes and interrupts the sleep. A pass that
/// is already running always completes.
pub async fn run_until_shutdown<F, Fut>(
  mut shutdown: watch::Receiver<bool>,
  interval: Duration,
  mut pass: F,
) -> usize
where
  F: FnMut() -> Fut,
  Fut: Future<Output = ()>,
{
  let mut passes = 0;
  info!(interval_secs = interval.as_secs(), "monitor started");

  while !*shutdown.borrow() {
    pass().await;
    passes += 1;

    if *shutdown.borrow() {
      break;
    }
    debug!(interval_secs = interval.as_secs(), "sleeping until next pass");
    tokio::select! {
      _ = tokio::time::sleep(interval) => {}
      Ok(()) = shutdown.changed() => {}
    }
  }

  info!(passes, "monitor stopped");
  passes
}
