//! CSV file standing in for the remote spreadsheet.
//!
//! Several clients may point at the same file, so every access goes through
//! an OS lock on a `<sheet>.lock` sidecar: exclusive for appends, shared for
//! reads.

use super::remote::{LOCK_WAIT, RemoteHandler, SheetStore};
use super::row::{HEADERS, RemoteRow};
use super::{PushReceipt, SessionSummary, SyncGateway, SyncRequest};
use crate::errors::{AppError, AppResult};
use crate::models::attendee::Attendee;
use chrono::Utc;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File, OpenOptions, TryLockError};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

const LOCK_POLL: Duration = Duration::from_millis(25);

#[derive(Clone, Copy)]
enum LockKind {
    Shared,
    Exclusive,
}

pub struct CsvSheet {
    path: PathBuf,
    lock_wait: Duration,
}

impl CsvSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_lock_wait(path, LOCK_WAIT)
    }

    pub fn with_lock_wait(path: impl Into<PathBuf>, lock_wait: Duration) -> Self {
        Self {
            path: path.into(),
            lock_wait,
        }
    }

    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Poll the sidecar lock until `lock_wait` runs out. The lock is held
    /// for as long as the returned file is open.
    fn lock(&self, kind: LockKind) -> AppResult<File> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;

        let deadline = Instant::now() + self.lock_wait;
        loop {
            let attempt = match kind {
                LockKind::Shared => file.try_lock_shared(),
                LockKind::Exclusive => file.try_lock(),
            };
            match attempt {
                Ok(()) => return Ok(file),
                Err(TryLockError::WouldBlock) if Instant::now() < deadline => {
                    thread::sleep(LOCK_POLL)
                }
                Err(TryLockError::WouldBlock) => {
                    return Err(AppError::LockTimeout(self.lock_wait.as_secs()));
                }
                Err(TryLockError::Error(e)) => return Err(e.into()),
            }
        }
    }
}

impl SheetStore for CsvSheet {
    fn append_rows(&self, rows: &[RemoteRow]) -> AppResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let _lock = self.lock(LockKind::Exclusive)?;

        let is_new = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            wtr.write_record(HEADERS)?;
        }
        for row in rows {
            wtr.write_record(row.to_record())?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn read_rows(&self) -> AppResult<Vec<RemoteRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let _lock = self.lock(LockKind::Shared)?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let mut out = Vec::new();
        for result in rdr.records() {
            out.push(RemoteRow::from_record(&result?)?);
        }
        Ok(out)
    }
}

/// Gateway running the remote handler in-process over a [`CsvSheet`].
pub struct SheetGateway {
    handler: RemoteHandler<CsvSheet>,
}

impl SheetGateway {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            handler: RemoteHandler::new(CsvSheet::new(path)),
        }
    }
}

impl SyncGateway for SheetGateway {
    fn push(&self, attendees: &[Attendee], session_name: &str) -> AppResult<PushReceipt> {
        let resp = self
            .handler
            .handle(SyncRequest::save(session_name, attendees), Utc::now())
            .into_result()?;

        Ok(match resp.count {
            Some(count) => PushReceipt::Acknowledged { count },
            None => PushReceipt::Unconfirmed,
        })
    }

    fn list_sessions(&self) -> AppResult<Vec<SessionSummary>> {
        let resp = self
            .handler
            .handle(SyncRequest::get_sessions(), Utc::now())
            .into_result()?;
        Ok(resp.sessions.unwrap_or_default())
    }

    fn fetch_session(&self, session_name: &str) -> AppResult<Vec<Attendee>> {
        let resp = self
            .handler
            .handle(SyncRequest::get_session_data(session_name), Utc::now())
            .into_result()?;
        Ok(resp.data.unwrap_or_default())
    }
}
