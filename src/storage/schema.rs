//! SQLite schema for the reference document store.

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Schema version bookkeeping table.
pub const SCHEMA_VERSION_TABLE: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL
);
";

/// Initial schema. Documents are stored as JSON; the store is
/// document-shaped and queries only by identity.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS athletes (
    id TEXT PRIMARY KEY,
    document TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS weekly_plans (
    athlete_id TEXT PRIMARY KEY,
    document TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS macrocycles (
    athlete_id TEXT PRIMARY KEY,
    document TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chat_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    athlete_id TEXT NOT NULL,
    document TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chat_messages_athlete
    ON chat_messages(athlete_id);
";
