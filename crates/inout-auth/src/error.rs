//! Error types for `inout-auth`.

use inout_core::DirectoryError;
use thiserror::Error;

/// Where an unauthenticated caller should go to get a session.
pub const LOGIN_PATH: &str = "/login";

/// A storage backend error with its concrete type erased.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

pub(crate) fn store_error<E>(err: E) -> StoreError
where
  E: std::error::Error + Send + Sync + 'static,
{
  Box::new(err)
}

/// The request carries no valid session.
///
/// Carries no detail about *why*; `login_path` tells the caller
/// where to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unauthorized")]
pub struct Unauthorized {
  pub login_path: &'static str,
}

impl Default for Unauthorized {
  fn default() -> Self { Self { login_path: LOGIN_PATH } }
}

#[derive(Debug, Error)]
pub enum AuthError {
  /// Bad credentials or an unreachable directory. Callers never learn
  /// which.
  #[error("login failed")]
  LoginFailed,

  #[error("could not provision {username:?} from the directory")]
  ProvisioningFailed {
    username: String,
    #[source]
    source:   DirectoryError,
  },

  #[error("could not store session")]
  SessionStoreFailed(#[source] StoreError),

  #[error(transparent)]
  Unauthorized(#[from] Unauthorized),

  #[error("person not found: {0}")]
  NotFound(String),

  #[error("unknown status code {0}")]
  UnknownStatus(i64),

  #[error("store error: {0}")]
  Store(#[source] StoreError),
}
