//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings.

use chrono::{DateTime, Utc};
use inout_core::{
  identity::Identity,
  person::{Person, PersonId, StatusCode},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPerson::from_row`].
pub const PERSON_COLUMNS: &str = "id, username, display_name, department, \
                                  telephone, mobile, office, title, status, \
                                  remarks, last_editor, last_edited_at";

/// Raw values read directly from a `people` row.
pub struct RawPerson {
  pub id:             i64,
  pub username:       String,
  pub display_name:   String,
  pub department:     String,
  pub telephone:      String,
  pub mobile:         String,
  pub office:         String,
  pub title:          String,
  pub status:         i64,
  pub remarks:        String,
  pub last_editor:    Option<String>,
  pub last_edited_at: Option<String>,
}

impl RawPerson {
  /// Read a row selected with [`PERSON_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      username:       row.get(1)?,
      display_name:   row.get(2)?,
      department:     row.get(3)?,
      telephone:      row.get(4)?,
      mobile:         row.get(5)?,
      office:         row.get(6)?,
      title:          row.get(7)?,
      status:         row.get(8)?,
      remarks:        row.get(9)?,
      last_editor:    row.get(10)?,
      last_edited_at: row.get(11)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    let last_edited_at =
      self.last_edited_at.as_deref().map(decode_dt).transpose()?;

    Ok(Person {
      id: PersonId(self.id),
      identity: Identity {
        username:     self.username,
        display_name: self.display_name,
        department:   self.department,
        telephone:    self.telephone,
        mobile:       self.mobile,
        office:       self.office,
        title:        self.title,
      },
      status: self.status,
      remarks: self.remarks,
      last_editor: self.last_editor,
      last_edited_at,
    })
  }
}

pub fn status_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StatusCode> {
  Ok(StatusCode { code: row.get(0)?, label: row.get(1)? })
}
