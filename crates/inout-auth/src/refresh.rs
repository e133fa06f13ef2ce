//! Outcome of a bulk profile refresh from the directory.

use serde::Serialize;

/// One person whose profile could not be refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshFailure {
  pub username: String,
  pub reason:   String,
}

/// What [`crate::Authenticator::refresh_from_directory`] did, person by
/// person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
  pub updated: Vec<String>,
  pub failed:  Vec<RefreshFailure>,
}

impl RefreshReport {
  /// Whether every person was refreshed.
  pub fn is_complete(&self) -> bool { self.failed.is_empty() }

  pub(crate) fn fail(&mut self, username: &str, reason: impl ToString) {
    self.failed.push(RefreshFailure {
      username: username.to_owned(),
      reason:   reason.to_string(),
    });
  }
}
