//! Local persistence of sessions, attendees, operators and the active-session
//! pointer. Every write of a roster replaces the whole session inside a
//! single transaction, so readers never observe a half-applied mutation.

use crate::db::log;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::attendee::Attendee;
use crate::models::operator::{Operator, Role};
use crate::models::session::Session;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

const ACTIVE_SESSION_KEY: &str = "active_session";

pub struct Repository {
    pool: DbPool,
}

fn parse_ts(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn map_attendee(row: &Row) -> rusqlite::Result<Attendee> {
    let checked_in_at: Option<String> = row.get("checked_in_at")?;
    let checked_in_at = match checked_in_at {
        Some(raw) => Some(parse_ts(&raw)?),
        None => None,
    };

    Ok(Attendee {
        name: row.get("name")?,
        affiliation: row.get("affiliation")?,
        phone: row.get("phone")?,
        vehicle: row.get("vehicle")?,
        event_name: row.get("event_name")?,
        disability: row.get("disability")?,
        assistive_device: row.get("assistive_device")?,
        checked_in: row.get::<_, i32>("checked_in")? == 1,
        checked_in_at,
    })
}

fn map_operator(row: &Row) -> rusqlite::Result<Operator> {
    let role_str: String = row.get("role")?;
    let role = Role::from_code(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidRole(role_str.clone())),
        )
    })?;

    Ok(Operator {
        name: row.get("name")?,
        role,
        salt: row.get("salt")?,
        passcode_hash: row.get("passcode_hash")?,
        created_at: row.get("created_at")?,
    })
}

fn load_participants(conn: &Connection, session_id: &str) -> AppResult<Vec<Attendee>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM attendees
         WHERE session_id = ?1
         ORDER BY position ASC",
    )?;

    let rows = stmt.query_map([session_id], map_attendee)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn insert_participants(conn: &Connection, session: &Session) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO attendees (
            session_id, position, name, affiliation, phone, vehicle,
            event_name, disability, assistive_device, checked_in, checked_in_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;

    for (pos, a) in session.participants.iter().enumerate() {
        stmt.execute(params![
            session.id,
            pos as i64,
            a.name,
            a.affiliation,
            a.phone,
            a.vehicle,
            a.event_name,
            a.disability,
            a.assistive_device,
            a.checked_in as i32,
            a.checked_in_at.map(|dt| dt.to_rfc3339()),
        ])
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                AppError::DuplicatePhone(a.phone.clone())
            }
            other => AppError::Db(other),
        })?;
    }

    Ok(())
}

impl Repository {
    /// Open (and migrate) the database at `path`.
    pub fn open(path: &str) -> AppResult<Self> {
        Self::from_pool(DbPool::new(path)?)
    }

    pub fn in_memory() -> AppResult<Self> {
        Self::from_pool(DbPool::in_memory()?)
    }

    fn from_pool(pool: DbPool) -> AppResult<Self> {
        run_pending_migrations(&pool.conn)?;
        Ok(Self { pool })
    }

    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }

    /// Record an audit line; failures are reported but never propagated.
    pub fn audit(&self, operation: &str, target: &str, message: &str) {
        log::audit_quiet(&self.pool.conn, operation, target, message);
    }

    // ------------------------------------------------
    // Sessions
    // ------------------------------------------------

    pub fn insert_session(&mut self, session: &Session) -> AppResult<()> {
        self.pool.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, name, created_at) VALUES (?1, ?2, ?3)",
                params![session.id, session.name, session.created_at.to_rfc3339()],
            )
            .map(|_| ())
        })?;
        self.save_session(session)
    }

    /// Replace the stored session (name and full roster) with `session`.
    pub fn save_session(&mut self, session: &Session) -> AppResult<()> {
        let tx = self.pool.conn.transaction()?;

        let updated = tx.execute(
            "UPDATE sessions SET name = ?1 WHERE id = ?2",
            params![session.name, session.id],
        )?;
        if updated == 0 {
            return Err(AppError::SessionNotFound(session.id.clone()));
        }

        tx.execute(
            "DELETE FROM attendees WHERE session_id = ?1",
            [&session.id],
        )?;
        insert_participants(&tx, session)?;

        tx.commit()?;
        Ok(())
    }

    pub fn load_session(&self, id: &str) -> AppResult<Option<Session>> {
        let head = self
            .pool
            .conn
            .query_row(
                "SELECT id, name, created_at FROM sessions WHERE id = ?1",
                [id],
                |row| {
                    let created: String = row.get(2)?;
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        parse_ts(&created)?,
                    ))
                },
            )
            .optional()?;

        match head {
            None => Ok(None),
            Some((id, name, created_at)) => {
                let participants = load_participants(&self.pool.conn, &id)?;
                Ok(Some(Session {
                    id,
                    name,
                    created_at,
                    participants,
                }))
            }
        }
    }

    /// All sessions, oldest first.
    pub fn list_sessions(&self) -> AppResult<Vec<Session>> {
        let ids: Vec<String> = {
            let mut stmt = self
                .pool
                .conn
                .prepare("SELECT id FROM sessions ORDER BY created_at ASC")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<Vec<String>>>()?
        };

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(s) = self.load_session(&id)? {
                out.push(s);
            }
        }
        Ok(out)
    }

    /// Resolve a session by id, id prefix or exact name.
    pub fn find_session(&self, key: &str) -> AppResult<Session> {
        if let Some(s) = self.load_session(key)? {
            return Ok(s);
        }

        let mut candidates = self
            .list_sessions()?
            .into_iter()
            .filter(|s| s.name == key || s.id.starts_with(key));

        match (candidates.next(), candidates.next()) {
            (Some(found), None) => Ok(found),
            (None, _) => Err(AppError::SessionNotFound(key.to_string())),
            (Some(_), Some(_)) => Err(AppError::SessionNotFound(format!(
                "'{}' is ambiguous; use the session id",
                key
            ))),
        }
    }

    pub fn delete_session(&mut self, id: &str) -> AppResult<()> {
        let tx = self.pool.conn.transaction()?;
        let removed = tx.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(AppError::SessionNotFound(id.to_string()));
        }
        tx.execute(
            "DELETE FROM settings WHERE key = ?1 AND value = ?2",
            params![ACTIVE_SESSION_KEY, id],
        )?;
        tx.commit()?;
        Ok(())
    }

    // ------------------------------------------------
    // Active session pointer
    // ------------------------------------------------

    pub fn active_session_id(&self) -> AppResult<Option<String>> {
        Ok(self
            .pool
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [ACTIVE_SESSION_KEY],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn set_active_session(&mut self, id: &str) -> AppResult<()> {
        self.pool.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![ACTIVE_SESSION_KEY, id],
        )?;
        Ok(())
    }

    /// The session the pointer refers to, or `NoActiveSession`.
    pub fn active_session(&self) -> AppResult<Session> {
        let id = self.active_session_id()?.ok_or(AppError::NoActiveSession)?;
        self.load_session(&id)?.ok_or(AppError::NoActiveSession)
    }

    // ------------------------------------------------
    // Operators
    // ------------------------------------------------

    pub fn insert_operator(&mut self, op: &Operator) -> AppResult<()> {
        self.pool.conn.execute(
            "INSERT INTO operators (name, role, salt, passcode_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(name) DO UPDATE SET
                role = excluded.role,
                salt = excluded.salt,
                passcode_hash = excluded.passcode_hash",
            params![
                op.name,
                op.role.code(),
                op.salt,
                op.passcode_hash,
                op.created_at
            ],
        )?;
        Ok(())
    }

    pub fn find_operator(&self, name: &str) -> AppResult<Option<Operator>> {
        Ok(self
            .pool
            .conn
            .query_row(
                "SELECT * FROM operators WHERE name = ?1",
                [name],
                map_operator,
            )
            .optional()?)
    }

    pub fn list_operators(&self) -> AppResult<Vec<Operator>> {
        let mut stmt = self
            .pool
            .conn
            .prepare("SELECT * FROM operators ORDER BY name ASC")?;
        let rows = stmt.query_map([], map_operator)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}
