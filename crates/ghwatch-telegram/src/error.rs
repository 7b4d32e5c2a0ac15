//! Error type for `ghwatch-telegram`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("bot token and chat id are required")]
  MissingCredentials,

  #[error("network error: {0}")]
  Http(#[from] reqwest::Error),

  /// The Bot API answered but did not accept the message.
  #[error("telegram rejected message ({status}): {description}")]
  Rejected { status: u16, description: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
