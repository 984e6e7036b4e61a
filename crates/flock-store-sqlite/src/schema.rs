//! SQL schema for the Flock SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Foreign keys have no `ON DELETE` action: the store deletes dependent
/// attendance rows itself, in the same transaction as the parent.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS believers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name  TEXT    NOT NULL,
    last_name   TEXT    NOT NULL,
    email       TEXT    UNIQUE,
    phone       TEXT,
    address     TEXT,
    date_joined TEXT    NOT NULL,              -- YYYY-MM-DD
    is_active   INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS services (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    service_type TEXT    NOT NULL,             -- 'sunday' | 'midweek'
    service_date TEXT    NOT NULL,             -- YYYY-MM-DD
    service_time TEXT,
    description  TEXT
);

-- One row per (believer, service) pair; uniqueness is checked on insert.
CREATE TABLE IF NOT EXISTS attendance (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    believer_id INTEGER NOT NULL REFERENCES believers(id),
    service_id  INTEGER NOT NULL REFERENCES services(id),
    attended_at TEXT    NOT NULL,              -- RFC 3339 UTC; server-assigned
    notes       TEXT
);

CREATE INDEX IF NOT EXISTS attendance_believer_idx ON attendance(believer_id);
CREATE INDEX IF NOT EXISTS attendance_service_idx  ON attendance(service_id);
CREATE INDEX IF NOT EXISTS services_date_idx       ON services(service_date);

PRAGMA user_version = 1;
";
