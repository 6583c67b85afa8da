//! Server side of the sync contract, runnable against any [`SheetStore`].
//!
//! Writers sharing a handler are serialized by a lock acquired with a bounded
//! wait; when it cannot be taken in time the request is answered with an
//! error instead of queuing forever. Stores reachable from other processes
//! lock on their own side as well (see [`super::sheet::CsvSheet`]).

use super::row::RemoteRow;
use super::{SessionSummary, SyncAction, SyncRequest, SyncResponse};
use crate::errors::{AppError, AppResult};
use crate::models::attendee::Attendee;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// How long a writer waits for the sheet lock.
pub const LOCK_WAIT: Duration = Duration::from_secs(10);

/// Append-only row storage. An `append_rows` call lands as one block.
pub trait SheetStore {
    fn append_rows(&self, rows: &[RemoteRow]) -> AppResult<()>;
    fn read_rows(&self) -> AppResult<Vec<RemoteRow>>;
}

/// Group the log by session name. Most recently updated session first.
pub fn summarize_sessions(rows: &[RemoteRow]) -> Vec<SessionSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, (usize, DateTime<Utc>)> = HashMap::new();

    for row in rows {
        let entry = groups.entry(row.session.as_str()).or_insert_with(|| {
            order.push(row.session.as_str());
            (0, row.timestamp)
        });
        entry.0 += 1;
        if row.timestamp > entry.1 {
            entry.1 = row.timestamp;
        }
    }

    let mut out: Vec<(DateTime<Utc>, SessionSummary)> = order
        .into_iter()
        .filter_map(|name| {
            groups.get(name).map(|(count, last)| {
                (
                    *last,
                    SessionSummary {
                        name: name.to_string(),
                        count: *count,
                        last_update: last.to_rfc3339(),
                    },
                )
            })
        })
        .collect();

    // stable: ties keep first-seen order
    out.sort_by(|a, b| b.0.cmp(&a.0));
    out.into_iter().map(|(_, s)| s).collect()
}

/// Every row of `session`, in log order, as canonical attendees.
pub fn session_attendees(rows: &[RemoteRow], session: &str) -> Vec<Attendee> {
    rows.iter()
        .filter(|r| r.session == session)
        .map(|r| r.attendee.clone())
        .collect()
}

pub struct RemoteHandler<S: SheetStore> {
    store: S,
    write_lock: Mutex<()>,
    lock_wait: Duration,
}

impl<S: SheetStore> RemoteHandler<S> {
    pub fn new(store: S) -> Self {
        Self::with_lock_wait(store, LOCK_WAIT)
    }

    pub fn with_lock_wait(store: S, lock_wait: Duration) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
            lock_wait,
        }
    }

    fn save(&self, session: &str, data: &[Attendee], now: DateTime<Utc>) -> AppResult<usize> {
        let _guard = self
            .write_lock
            .try_lock_for(self.lock_wait)
            .ok_or(AppError::LockTimeout(self.lock_wait.as_secs()))?;

        let rows: Vec<RemoteRow> = data
            .iter()
            .map(|a| RemoteRow::new(now, session, a))
            .collect();
        self.store.append_rows(&rows)?;
        Ok(rows.len())
    }

    fn dispatch(&self, req: SyncRequest, now: DateTime<Utc>) -> AppResult<SyncResponse> {
        match req.action {
            SyncAction::Save => {
                let session = req
                    .session_name
                    .filter(|s| !s.trim().is_empty())
                    .ok_or(AppError::MissingField("sessionName"))?;
                let data = req.data.unwrap_or_default();
                let count = self.save(&session, &data, now)?;
                Ok(SyncResponse {
                    count: Some(count),
                    ..SyncResponse::success()
                })
            }
            SyncAction::GetSessions => {
                let rows = self.store.read_rows()?;
                Ok(SyncResponse {
                    sessions: Some(summarize_sessions(&rows)),
                    ..SyncResponse::success()
                })
            }
            SyncAction::GetSessionData => {
                let session = req
                    .session_name
                    .ok_or(AppError::MissingField("sessionName"))?;
                let rows = self.store.read_rows()?;
                Ok(SyncResponse {
                    data: Some(session_attendees(&rows, &session)),
                    ..SyncResponse::success()
                })
            }
        }
    }

    /// Answer one request. Failures become `{status: "error", message}`.
    pub fn handle(&self, req: SyncRequest, now: DateTime<Utc>) -> SyncResponse {
        self.dispatch(req, now)
            .unwrap_or_else(|e| SyncResponse::error(e.to_string()))
    }
}
