use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists. Applied migrations are recorded there.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Run `sql` once, keyed by `version`.
fn apply_once(conn: &Connection, version: &str, sql: &str, message: &str) -> Result<bool> {
    if is_applied(conn, version)? {
        return Ok(false);
    }

    conn.execute_batch(&format!("BEGIN;\n{sql}\nCOMMIT;"))?;
    mark_applied(conn, version, message)?;
    Ok(true)
}

const SESSIONS_AND_ATTENDEES: &str = r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        created_at  TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS attendees (
        session_id        TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
        position          INTEGER NOT NULL,
        name              TEXT NOT NULL,
        affiliation       TEXT NOT NULL DEFAULT '',
        phone             TEXT NOT NULL,
        vehicle           TEXT NOT NULL DEFAULT '',
        event_name        TEXT,
        disability        TEXT,
        assistive_device  TEXT,
        checked_in        INTEGER NOT NULL DEFAULT 0 CHECK(checked_in IN (0, 1)),
        checked_in_at     TEXT,
        UNIQUE(session_id, phone)
    );

    CREATE INDEX IF NOT EXISTS idx_attendees_session_pos ON attendees(session_id, position);

    CREATE TABLE IF NOT EXISTS settings (
        key    TEXT PRIMARY KEY,
        value  TEXT NOT NULL
    );
"#;

const OPERATORS: &str = r#"
    CREATE TABLE IF NOT EXISTS operators (
        name           TEXT PRIMARY KEY,
        role           TEXT NOT NULL CHECK(role IN ('admin', 'staff')),
        salt           TEXT NOT NULL,
        passcode_hash  TEXT NOT NULL,
        created_at     TEXT NOT NULL
    );
"#;

/// Public entry point: run all pending migrations.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    let steps = [
        (
            "20260301_0001_sessions_attendees",
            SESSIONS_AND_ATTENDEES,
            "Created sessions, attendees and settings tables",
        ),
        (
            "20260412_0002_operators",
            OPERATORS,
            "Created operators table",
        ),
    ];

    for (version, sql, message) in steps {
        if apply_once(conn, version, sql, message)? {
            success(format!("Migration applied: {} → {}", version, message));
        }
    }

    Ok(())
}
