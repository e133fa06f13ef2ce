//! The `RosterStore` trait: the data-access interface the core depends on.
//!
//! The trait is implemented by storage backends (e.g. `inout-store-sqlite`).
//! The auth orchestrator and the HTTP layer depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  identity::Identity,
  person::{Person, StatusChange, StatusCode},
  session::Session,
};

/// Abstraction over the persistent roster: people, status codes, sessions.
///
/// Each method is an independent statement; no method wraps several of them
/// in a transaction.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  /// Retrieve a person by login name. Returns `None` if not found.
  fn get_person_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Create a person from a directory identity with the given status code.
  /// Fails if the username is already taken.
  fn insert_person<'a>(
    &'a self,
    identity: &'a Identity,
    status: i64,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + 'a;

  /// Overwrite the directory-sourced profile fields of `identity.username`.
  /// Status, remarks and edit stamps are left untouched.
  ///
  /// Returns `false` if no such person exists.
  fn update_person_profile<'a>(
    &'a self,
    identity: &'a Identity,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Write status, remarks and the edit stamps. Returns the updated person,
  /// or `None` if no such person exists.
  fn update_person_status(
    &self,
    change: StatusChange,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Every person on the roster, ordered by display name.
  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  // ── Status codes ──────────────────────────────────────────────────────

  /// Every known status code.
  fn list_status_codes(
    &self,
  ) -> impl Future<Output = Result<Vec<StatusCode>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Persist a new session. Fails if the token already exists.
  fn insert_session<'a>(
    &'a self,
    session: &'a Session,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete a session. Deleting an unknown token is not an error.
  fn delete_session<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Usernames of every person joined to a session with this token.
  /// Callers decide what anything other than exactly one row means.
  fn find_session_usernames<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;
}
