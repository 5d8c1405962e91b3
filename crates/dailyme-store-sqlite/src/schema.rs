//! SQL schema for the dailyme SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema version; future migrations will be gated on it.

/// Current schema version.
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per logged drink, keyed by a client-generated UUID.
CREATE TABLE IF NOT EXISTS hydration_logs (
    id         TEXT PRIMARY KEY,
    date       TEXT    NOT NULL,   -- logical day, YYYY-MM-DD
    timestamp  INTEGER NOT NULL,   -- epoch milliseconds
    amount_ml  INTEGER NOT NULL CHECK (amount_ml > 0),
    type       TEXT    NOT NULL DEFAULT 'water'  -- 'water' | 'tea' | 'coffee' | 'other'
);

-- Derived from hydration_logs; rewritten whole on every recalculation.
CREATE TABLE IF NOT EXISTS daily_summaries (
    date          TEXT PRIMARY KEY,
    total_ml      INTEGER NOT NULL,
    goal_ml       INTEGER NOT NULL,
    entries_count INTEGER NOT NULL,
    goal_reached  INTEGER NOT NULL,  -- 0 | 1
    last_updated  INTEGER NOT NULL   -- epoch milliseconds
);

-- Key names are a durable contract: daily_goal_ml, cup_size_ml, theme,
-- day_start_hour.
CREATE TABLE IF NOT EXISTS settings (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL   -- JSON
);

CREATE INDEX IF NOT EXISTS hydration_logs_by_date ON hydration_logs(date, timestamp);

PRAGMA user_version = 1;
";
