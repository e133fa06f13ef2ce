//! Error types for `inout-core`.

use thiserror::Error;

/// Why [`crate::dn::sanitize`] refused a username.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
  #[error("username is empty")]
  Empty,

  #[error("username contains forbidden character {0:?}")]
  ForbiddenCharacter(char),

  #[error("username contains control character U+{0:04X}")]
  ControlCharacter(u32),
}

/// Failures talking to the directory server.
#[derive(Debug, Error)]
pub enum DirectoryError {
  #[error("input rejected: {0}")]
  InputRejected(#[from] Rejected),

  /// Could not connect, negotiate TLS, or the connection dropped.
  #[error("directory unavailable: {0}")]
  Unavailable(String),

  #[error("directory operation timed out")]
  Timeout,

  /// The search filter built from the input could not be parsed.
  #[error("search filter could not be parsed")]
  InvalidFilter,

  /// The server refused the bind credentials (LDAP result code 49).
  #[error("invalid credentials")]
  InvalidCredentials,

  /// Any other non-success LDAP result.
  #[error("directory returned code {rc}: {text}")]
  Operation { rc: u32, text: String },

  #[error("no directory entry matches {0:?}")]
  NotFound(String),

  #[error("{count} directory entries match {filter:?}")]
  Ambiguous { filter: String, count: usize },
}

pub type Result<T, E = DirectoryError> = std::result::Result<T, E>;
