//! Error type for `inout-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("username already exists: {0}")]
  UsernameTaken(String),

  #[error("session token already exists")]
  DuplicateSession,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
