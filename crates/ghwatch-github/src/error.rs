//! Error type for `ghwatch-github`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("GitHub token is empty")]
  MissingToken,

  #[error("network error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("GitHub API error {status} for {endpoint}: {body}")]
  Status {
    status:   u16,
    endpoint: String,
    body:     String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
