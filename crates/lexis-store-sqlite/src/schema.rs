//! SQL schema for the Lexis SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Single row: the key the active set was generated for.
CREATE TABLE IF NOT EXISTS active_meta (
    id              INTEGER PRIMARY KEY CHECK (id = 1),
    generation_date TEXT NOT NULL,   -- YYYY-MM-DD
    target_language TEXT NOT NULL,
    level           TEXT NOT NULL    -- 'beginner' | 'intermediate' | 'advanced'
);

-- The active set. Replaced wholesale inside one transaction.
CREATE TABLE IF NOT EXISTS active_words (
    position      INTEGER PRIMARY KEY,
    word_key      TEXT NOT NULL UNIQUE,   -- lowercased source_word
    source_word   TEXT NOT NULL,
    translated    TEXT NOT NULL,
    meaning       TEXT NOT NULL,
    pronunciation TEXT NOT NULL,
    frequency     INTEGER NOT NULL DEFAULT 0 CHECK (frequency >= 0),
    word_type     TEXT
);

-- Single row: the language the ledger's history belongs to.
CREATE TABLE IF NOT EXISTS ledger_meta (
    id       INTEGER PRIMARY KEY CHECK (id = 1),
    language TEXT
);

-- Cross-day history. Rows are upserted, never deleted except on a
-- language switch.
CREATE TABLE IF NOT EXISTS ledger (
    word_key          TEXT PRIMARY KEY,
    source_word       TEXT NOT NULL,
    translated        TEXT NOT NULL,
    meaning           TEXT NOT NULL,
    pronunciation     TEXT NOT NULL,
    frequency         INTEGER NOT NULL CHECK (frequency >= 0),
    days_since_active INTEGER NOT NULL CHECK (days_since_active >= 1)
);

PRAGMA user_version = 1;
";
