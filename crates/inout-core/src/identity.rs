//! Identity: the directory-sourced half of a person record.

use serde::{Deserialize, Serialize};

/// Profile fields resolved from the directory and mirrored into the local
/// store. `username` is the login name and never changes once a person
/// exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub username:     String,
  pub display_name: String,
  pub department:   String,
  pub telephone:    String,
  pub mobile:       String,
  pub office:       String,
  pub title:        String,
}
