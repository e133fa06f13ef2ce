//! Login sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::person::PersonId;

/// A bearer session issued on successful login.
///
/// Sessions have no expiry; they live until the holder logs out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub token:      String,
  pub person_id:  PersonId,
  pub created_at: DateTime<Utc>,
}
