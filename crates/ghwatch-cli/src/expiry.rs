//! Warnings for API tokens that are about to expire.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::settings::{GitHubSettings, env_secret};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenExpiry {
  Expired { days_ago: i64 },
  /// At most a week left.
  Imminent { days_left: i64 },
  /// At most thirty days left.
  Approaching { days_left: i64 },
  Distant,
}

pub fn classify(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> TokenExpiry {
  let remaining = expires_at - now;
  let days = remaining.num_days();
  if remaining < chrono::Duration::zero() {
    TokenExpiry::Expired { days_ago: -days }
  } else if days <= 7 {
    TokenExpiry::Imminent { days_left: days }
  } else if days <= 30 {
    TokenExpiry::Approaching { days_left: days }
  } else {
    TokenExpiry::Distant
  }
}

/// Log a warning if the configured expiry variable says the token is
/// expired or close to it. Unset or unparsable values are not fatal.
pub fn check_token_expiry(github: &GitHubSettings) {
  let Some(var) = github.token_expires_at_env.as_deref() else { return };
  let Some(raw) = env_secret(var) else { return };

  let expires_at = match DateTime::parse_from_rfc3339(raw.trim()) {
    Ok(dt) => dt.with_timezone(&Utc),
    Err(e) => {
      warn!(var, error = %e, "could not parse token expiry");
      return;
    }
  };

  match classify(expires_at, Utc::now()) {
    TokenExpiry::Expired { days_ago } => warn!(
      days_ago,
      token_env = %github.token_env,
      "GitHub token has EXPIRED; generate a new one"
    ),
    TokenExpiry::Imminent { days_left } => {
      warn!(days_left, "GitHub token expires soon; consider generating a new one")
    }
    TokenExpiry::Approaching { days_left } => info!(days_left, "GitHub token expiry approaching"),
    TokenExpiry::Distant => {}
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() }

  #[test]
  fn past_expiry_is_expired() {
    assert_eq!(classify(now() - Duration::days(3), now()), TokenExpiry::Expired { days_ago: 3 });
    assert_eq!(classify(now() - Duration::hours(1), now()), TokenExpiry::Expired { days_ago: 0 });
  }

  #[test]
  fn thresholds() {
    assert_eq!(classify(now() + Duration::days(7), now()), TokenExpiry::Imminent { days_left: 7 });
    assert_eq!(classify(now() + Duration::days(8), now()), TokenExpiry::Approaching { days_left: 8 });
    assert_eq!(classify(now() + Duration::days(30), now()), TokenExpiry::Approaching { days_left: 30 });
    assert_eq!(classify(now() + Duration::days(31), now()), TokenExpiry::Distant);
  }
}
