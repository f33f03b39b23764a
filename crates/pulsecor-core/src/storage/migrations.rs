//! Database schema migrations for pulsecor.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Record the schema version, creating the tracking table when a
/// migration step runs on its own.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    create_schema_version_table(conn)?;
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

/// Migration v1: users, conversation flows, chat history, daily check-ins.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            name               TEXT NOT NULL DEFAULT 'User',
            created_at         TEXT NOT NULL,
            last_check_in_date TEXT,
            current_streak     INTEGER NOT NULL DEFAULT 0,
            longest_streak     INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS conversation_flows (
            session_id   TEXT PRIMARY KEY,
            user_id      INTEGER NOT NULL,
            flow_type    TEXT NOT NULL,
            current_step TEXT NOT NULL,
            is_complete  INTEGER NOT NULL DEFAULT 0,
            started_at   TEXT NOT NULL,
            completed_at TEXT,
            temp_data    TEXT NOT NULL DEFAULT '{}'
        );

        CREATE TABLE IF NOT EXISTS chat_messages (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id    TEXT NOT NULL,
            sender        TEXT NOT NULL,
            content       TEXT NOT NULL,
            timestamp     TEXT NOT NULL,
            message_type  TEXT NOT NULL DEFAULT 'text',
            quick_replies TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS daily_check_ins (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id        INTEGER NOT NULL,
            date           TEXT NOT NULL,
            sleep_quality  TEXT,
            sleep_hours    TEXT,
            water_glasses  TEXT,
            stress_level   TEXT,
            energy_level   TEXT,
            activity_level TEXT,
            created_at     TEXT NOT NULL,
            completed_at   TEXT,
            is_complete    INTEGER NOT NULL DEFAULT 0,
            UNIQUE(user_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_chat_messages_session ON chat_messages(session_id);
        CREATE INDEX IF NOT EXISTS idx_flows_user_incomplete ON conversation_flows(user_id, is_complete);
        CREATE INDEX IF NOT EXISTS idx_check_ins_user_date ON daily_check_ins(user_id, date);",
    )?;

    set_schema_version(&tx, 1)?;

    tx.commit()?;
    Ok(())
}

/// Migration v2: medication tracking.
///
/// Medications are soft-deleted (`is_active = 0`) so their log history
/// remains visible on the calendar.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS medications (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id        INTEGER NOT NULL,
            name           TEXT NOT NULL,
            dosage         TEXT NOT NULL DEFAULT '',
            frequency      TEXT NOT NULL DEFAULT '',
            reminder_times TEXT NOT NULL DEFAULT '[]',
            is_active      INTEGER NOT NULL DEFAULT 1,
            created_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS medication_logs (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            medication_id  INTEGER NOT NULL,
            status         TEXT NOT NULL,
            timestamp      TEXT NOT NULL,
            scheduled_time TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_medications_user_active ON medications(user_id, is_active);
        CREATE INDEX IF NOT EXISTS idx_medication_logs_timestamp ON medication_logs(timestamp);",
    )?;

    set_schema_version(&tx, 2)?;

    tx.commit()?;
    Ok(())
}
