//! Error type for `ghwatch-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ghwatch_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("integer out of range in column {column}: {value}")]
  OutOfRange { column: &'static str, value: i64 },

  #[error("number {value} does not fit column {column}")]
  NumberTooLarge { column: &'static str, value: u64 },

  /// The database was written by a newer schema than this build knows.
  #[error("database schema version {found} is newer than supported version {supported}")]
  SchemaTooNew { found: i64, supported: i64 },

  #[error("database reports invalid schema version {0}")]
  InvalidSchemaVersion(i64),

  #[error("notification not found: {0}")]
  NotificationNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
