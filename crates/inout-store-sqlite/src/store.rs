//! [`SqliteStore`], the SQLite implementation of [`RosterStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use inout_core::{
  identity::Identity,
  person::{Person, PersonId, StatusChange, StatusCode},
  session::Session,
  store::RosterStore,
};

use crate::{
  encode::{PERSON_COLUMNS, RawPerson, encode_dt, status_from_row},
  schema::SCHEMA,
  Error, Result,
};

/// Whether `err` is a constraint failure with the given extended code.
fn is_constraint(err: &rusqlite::Error, extended: std::ffi::c_int) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _) if e.extended_code == extended
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened roster store");
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn get_person_by_username(&self, username: &str) -> Result<Option<Person>> {
    let username = username.to_owned();

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM people WHERE username = ?1"),
            rusqlite::params![username],
            RawPerson::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn insert_person(&self, identity: &Identity, status: i64) -> Result<Person> {
    let row = identity.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO people (
             username, display_name, department, telephone, mobile, office,
             title, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            row.username,
            row.display_name,
            row.department,
            row.telephone,
            row.mobile,
            row.office,
            row.title,
            status,
          ],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_constraint(&e, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) => {
            Ok(None)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let id = id.ok_or_else(|| Error::UsernameTaken(identity.username.clone()))?;

    Ok(Person {
      id: PersonId(id),
      identity: identity.clone(),
      status,
      remarks: String::new(),
      last_editor: None,
      last_edited_at: None,
    })
  }

  async fn update_person_profile(&self, identity: &Identity) -> Result<bool> {
    let row = identity.clone();

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE people
           SET display_name = ?2, department = ?3, telephone = ?4,
               mobile = ?5, office = ?6, title = ?7
           WHERE username = ?1",
          rusqlite::params![
            row.username,
            row.display_name,
            row.department,
            row.telephone,
            row.mobile,
            row.office,
            row.title,
          ],
        )?)
      })
      .await?;

    Ok(changed == 1)
  }

  async fn update_person_status(&self, change: StatusChange) -> Result<Option<Person>> {
    let edited_at = encode_dt(change.edited_at);
    let username = change.username.clone();

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE people
           SET status = ?2, remarks = ?3, last_editor = ?4, last_edited_at = ?5
           WHERE username = ?1",
          rusqlite::params![
            change.username,
            change.status,
            change.remarks,
            change.editor,
            edited_at,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_person_by_username(&username).await
  }

  async fn list_people(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS} FROM people ORDER BY display_name, username"
        ))?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  // ── Status codes ──────────────────────────────────────────────────────────

  async fn list_status_codes(&self) -> Result<Vec<StatusCode>> {
    let codes = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT code, label FROM status ORDER BY code")?;
        let rows = stmt
          .query_map([], status_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(codes)
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn insert_session(&self, session: &Session) -> Result<()> {
    let token = session.token.clone();
    let person_id = session.person_id.0;
    let created_at = encode_dt(session.created_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO sessions (token, person_id, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![token, person_id, created_at],
        );
        match result {
          Ok(_) => Ok(true),
          Err(e)
            if is_constraint(&e, rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY) =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateSession);
    }
    Ok(())
  }

  async fn delete_session(&self, token: &str) -> Result<()> {
    let token = token.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM sessions WHERE token = ?1", rusqlite::params![token])?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn find_session_usernames(&self, token: &str) -> Result<Vec<String>> {
    let token = token.to_owned();

    let usernames = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.username
           FROM sessions s
           JOIN people p ON p.id = s.person_id
           WHERE s.token = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![token], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(usernames)
  }
}
