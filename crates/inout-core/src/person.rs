//! Person records and status reference data.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Code used when a status label lookup is impossible; matches the seeded
/// `Out` row.
pub const DEFAULT_OUT_CODE: i64 = 2;

/// Label of the status given to freshly provisioned people.
pub const OUT_LABEL: &str = "Out";

/// Opaque local identifier of a person row.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A presence status, e.g. "In", "Out", "In Field".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCode {
  pub code:  i64,
  pub label: String,
}

/// A locally tracked member of the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:             PersonId,
  #[serde(flatten)]
  pub identity:       Identity,
  pub status:         i64,
  pub remarks:        String,
  /// Username of whoever last changed `status` or `remarks`.
  pub last_editor:    Option<String>,
  pub last_edited_at: Option<DateTime<Utc>>,
}

impl Person {
  pub fn username(&self) -> &str { &self.identity.username }
}

/// Input to [`crate::store::RosterStore::update_person_status`].
/// The editor and timestamp are stamped by the caller, never by the client.
#[derive(Debug, Clone)]
pub struct StatusChange {
  pub username:  String,
  pub status:    i64,
  pub remarks:   String,
  pub editor:    String,
  pub edited_at: DateTime<Utc>,
}
