//! SQL schema for the roster store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS` and `OR IGNORE`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Reference data. Codes are stable; labels are what the board displays.
CREATE TABLE IF NOT EXISTS status (
    code   INTEGER PRIMARY KEY,
    label  TEXT NOT NULL UNIQUE
);

INSERT OR IGNORE INTO status (code, label) VALUES
    (1, 'In'),
    (2, 'Out'),
    (3, 'In Field');

CREATE TABLE IF NOT EXISTS people (
    id              INTEGER PRIMARY KEY,
    username        TEXT NOT NULL UNIQUE,
    -- profile fields, overwritten by directory refreshes
    display_name    TEXT NOT NULL DEFAULT '',
    department      TEXT NOT NULL DEFAULT '',
    telephone       TEXT NOT NULL DEFAULT '',
    mobile          TEXT NOT NULL DEFAULT '',
    office          TEXT NOT NULL DEFAULT '',
    title           TEXT NOT NULL DEFAULT '',
    -- board state, only written through the status update path
    status          INTEGER NOT NULL REFERENCES status(code),
    remarks         TEXT NOT NULL DEFAULT '',
    last_editor     TEXT,
    last_edited_at  TEXT             -- RFC 3339 UTC or NULL
);

-- No expiry column: sessions live until logout.
CREATE TABLE IF NOT EXISTS sessions (
    token       TEXT PRIMARY KEY,
    person_id   INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL        -- RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS sessions_person_idx ON sessions(person_id);

PRAGMA user_version = 1;
";
