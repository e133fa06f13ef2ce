//! [`Authenticator`]: login, logout, request gating and directory refresh.

use std::{fmt, sync::Arc};

use chrono::Utc;
use inout_core::{
  directory::Directory,
  person::{DEFAULT_OUT_CODE, OUT_LABEL, Person, StatusChange, StatusCode},
  store::RosterStore,
};
use inout_ldap::DirectoryClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  cache::StatusCache,
  error::{AuthError, Unauthorized, store_error},
  refresh::RefreshReport,
  session::{SessionError, SessionStore},
};

// ─── Request / response types ────────────────────────────────────────────────

/// A username/password pair as submitted to the login endpoint.
#[derive(Clone, Deserialize)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// A freshly issued session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
  pub token:    String,
  pub username: String,
}

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
  pub username: String,
}

/// A status change requested by a signed-in user.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
  pub status:  i64,
  #[serde(default)]
  pub remarks: String,
}

// ─── Authenticator ───────────────────────────────────────────────────────────

/// Composes the directory client, the session store and the status cache.
pub struct Authenticator<S, D> {
  store:     Arc<S>,
  directory: DirectoryClient<D>,
  sessions:  SessionStore<S>,
  statuses:  StatusCache,
}

impl<S: RosterStore, D: Directory> Authenticator<S, D> {
  pub fn new(store: Arc<S>, directory: DirectoryClient<D>) -> Self {
    Self {
      sessions: SessionStore::new(Arc::clone(&store)),
      store,
      directory,
      statuses: StatusCache::new(),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn directory(&self) -> &DirectoryClient<D> { &self.directory }

  // ── Login / logout ────────────────────────────────────────────────────────

  /// Verify `credentials` against the directory, make sure the person exists
  /// locally, and issue a new session.
  ///
  /// Every call that succeeds issues a distinct token; earlier sessions of
  /// the same person stay valid.
  pub async fn login(&self, credentials: Credentials) -> Result<LoginOutcome, AuthError> {
    let Credentials { username, password } = credentials;

    if !self.directory.authenticate(&username, &password).await {
      info!(username = %username, "login refused");
      return Err(AuthError::LoginFailed);
    }

    let person = self.resolve_person(&username).await?;

    let token = Uuid::new_v4().to_string();
    self
      .sessions
      .create(token.clone(), person.id)
      .await
      .map_err(|e| AuthError::SessionStoreFailed(store_error(e)))?;

    info!(username = %username, person_id = %person.id, "session issued");
    Ok(LoginOutcome { token, username: person.identity.username })
  }

  /// The local record for `username`, provisioning it from the directory on
  /// first login.
  ///
  /// The roster is keyed by the username exactly as typed at login. The
  /// directory matches account names without regard to case, so `JSmith`,
  /// `jsmith` and `jsmith@corp.example` can all bind as the same account
  /// and still end up as separate people here.
  async fn resolve_person(&self, username: &str) -> Result<Person, AuthError> {
    if let Some(person) = self
      .store
      .get_person_by_username(username)
      .await
      .map_err(|e| AuthError::Store(store_error(e)))?
    {
      return Ok(person);
    }

    let identity = self.directory.lookup(username).await.map_err(|source| {
      warn!(username = %username, error = %source, "provisioning lookup failed");
      AuthError::ProvisioningFailed { username: username.to_owned(), source }
    })?;

    let status = self.default_status().await;
    match self.store.insert_person(&identity, status).await {
      Ok(person) => {
        info!(username = %username, status, "provisioned person from directory");
        Ok(person)
      }
      Err(e) => {
        // A concurrent first login may have inserted the same person.
        debug!(username = %username, error = %e, "insert failed; re-reading");
        self
          .store
          .get_person_by_username(username)
          .await
          .map_err(|e| AuthError::Store(store_error(e)))?
          .ok_or_else(|| AuthError::Store(store_error(e)))
      }
    }
  }

  /// Code of the "Out" status, or [`DEFAULT_OUT_CODE`] if it cannot be
  /// resolved.
  async fn default_status(&self) -> i64 {
    match self.statuses.code_for_label(self.store.as_ref(), OUT_LABEL).await {
      Ok(Some(code)) => code,
      Ok(None) => {
        warn!(label = OUT_LABEL, "no such status label; using default code");
        DEFAULT_OUT_CODE
      }
      Err(e) => {
        warn!(error = %e, "could not load status codes; using default code");
        DEFAULT_OUT_CODE
      }
    }
  }

  /// Revoke a session. Unknown tokens are not an error.
  pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
    self
      .sessions
      .revoke(token)
      .await
      .map_err(|e| AuthError::Store(store_error(e)))?;
    debug!("session revoked");
    Ok(())
  }

  /// Gate a request on its session token.
  ///
  /// A missing token, an unknown token and a storage failure all look the
  /// same to the caller.
  pub async fn require_session(
    &self,
    token: Option<&str>,
  ) -> Result<SessionUser, Unauthorized> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
      return Err(Unauthorized::default());
    };

    match self.sessions.validate(token).await {
      Ok(username) => Ok(SessionUser { username }),
      Err(SessionError::NotFound) => Err(Unauthorized::default()),
      Err(SessionError::Store(e)) => {
        warn!(error = %e, "session validation failed");
        Err(Unauthorized::default())
      }
    }
  }

  // ── Directory refresh ─────────────────────────────────────────────────────

  /// Re-read every known person from the directory and overwrite their
  /// profile fields. Status and remarks are never touched.
  ///
  /// Only failing to list the roster aborts; per-person failures are logged
  /// and reported.
  pub async fn refresh_from_directory(&self) -> Result<RefreshReport, AuthError> {
    let people = self
      .store
      .list_people()
      .await
      .map_err(|e| AuthError::Store(store_error(e)))?;

    let mut report = RefreshReport::default();
    for person in people {
      let username = person.username();

      let identity = match self.directory.lookup(username).await {
        Ok(identity) => identity,
        Err(e) => {
          warn!(username = %username, error = %e, "directory refresh lookup failed");
          report.fail(username, e);
          continue;
        }
      };

      match self.store.update_person_profile(&identity).await {
        Ok(true) => {
          debug!(username = %username, "profile refreshed");
          report.updated.push(username.to_owned());
        }
        Ok(false) => {
          warn!(username = %username, "person vanished during refresh");
          report.fail(username, "person no longer exists");
        }
        Err(e) => {
          warn!(username = %username, error = %e, "profile update failed");
          report.fail(username, e);
        }
      }
    }

    info!(
      updated = report.updated.len(),
      failed = report.failed.len(),
      "directory refresh finished"
    );
    Ok(report)
  }

  // ── Roster ────────────────────────────────────────────────────────────────

  /// Set `username`'s status and remarks on behalf of `editor`.
  pub async fn update_status(
    &self,
    editor: &SessionUser,
    username: &str,
    update: StatusUpdate,
  ) -> Result<Person, AuthError> {
    let known = self
      .statuses
      .lookup(self.store.as_ref(), update.status)
      .await
      .map_err(|e| AuthError::Store(store_error(e)))?;
    if known.is_none() {
      return Err(AuthError::UnknownStatus(update.status));
    }

    let change = StatusChange {
      username:  username.to_owned(),
      status:    update.status,
      remarks:   update.remarks,
      editor:    editor.username.clone(),
      edited_at: Utc::now(),
    };
    let person = self
      .store
      .update_person_status(change)
      .await
      .map_err(|e| AuthError::Store(store_error(e)))?
      .ok_or_else(|| AuthError::NotFound(username.to_owned()))?;

    info!(
      username = %username,
      editor = %editor.username,
      status = person.status,
      "status updated"
    );
    Ok(person)
  }

  pub async fn person(&self, username: &str) -> Result<Person, AuthError> {
    self
      .store
      .get_person_by_username(username)
      .await
      .map_err(|e| AuthError::Store(store_error(e)))?
      .ok_or_else(|| AuthError::NotFound(username.to_owned()))
  }

  pub async fn people(&self) -> Result<Vec<Person>, AuthError> {
    self
      .store
      .list_people()
      .await
      .map_err(|e| AuthError::Store(store_error(e)))
  }

  /// Every status code, ordered by code.
  pub async fn status_codes(&self) -> Result<Vec<StatusCode>, AuthError> {
    let map = self
      .statuses
      .get_all(self.store.as_ref())
      .await
      .map_err(|e| AuthError::Store(store_error(e)))?;
    Ok(map.values().cloned().collect())
  }
}
