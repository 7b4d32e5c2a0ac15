//! Error types for `ghwatch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown notification type: {0:?}")]
  UnknownNotificationType(String),

  #[error("unknown item kind: {0:?}")]
  UnknownItemKind(String),

  #[error("repository name must be of the form owner/name: {0:?}")]
  InvalidRepoName(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
