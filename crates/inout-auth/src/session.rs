//! [`SessionStore`]: issue, validate and revoke login sessions.

use std::sync::Arc;

use chrono::Utc;
use inout_core::{person::PersonId, session::Session, store::RosterStore};
use thiserror::Error;
use tracing::warn;

use crate::error::{StoreError, store_error};

#[derive(Debug, Error)]
pub enum SessionError {
  #[error("session not found")]
  NotFound,

  #[error("store error: {0}")]
  Store(#[source] StoreError),
}

/// Session persistence on top of a [`RosterStore`].
///
/// Tokens are minted by the caller; this type only records and checks them.
pub struct SessionStore<S> {
  store: Arc<S>,
}

impl<S> Clone for SessionStore<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: RosterStore> SessionStore<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Record a new session for `person_id`.
  pub async fn create(
    &self,
    token: String,
    person_id: PersonId,
  ) -> Result<Session, SessionError> {
    let session = Session { token, person_id, created_at: Utc::now() };
    self
      .store
      .insert_session(&session)
      .await
      .map_err(|e| SessionError::Store(store_error(e)))?;
    Ok(session)
  }

  /// Resolve a token to the username it was issued to.
  ///
  /// Anything other than exactly one matching session is `NotFound`.
  pub async fn validate(&self, token: &str) -> Result<String, SessionError> {
    let mut usernames = self
      .store
      .find_session_usernames(token)
      .await
      .map_err(|e| SessionError::Store(store_error(e)))?;

    match usernames.len() {
      1 => Ok(usernames.remove(0)),
      0 => Err(SessionError::NotFound),
      n => {
        warn!(matches = n, "session token matched more than one row");
        Err(SessionError::NotFound)
      }
    }
  }

  /// Delete a session. Revoking an unknown token succeeds.
  pub async fn revoke(&self, token: &str) -> Result<(), SessionError> {
    self
      .store
      .delete_session(token)
      .await
      .map_err(|e| SessionError::Store(store_error(e)))
  }
}
