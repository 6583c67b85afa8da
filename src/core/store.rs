//! Attendee store: roster mutations on the active session.
//!
//! Each operation loads the active session, builds the next `Session` value
//! and hands the whole value to the repository, which swaps it in a single
//! transaction. Nothing is mutated in place.

use crate::db::repository::Repository;
use crate::errors::{AppError, AppResult};
use crate::models::attendee::Attendee;
use crate::models::session::Session;
use std::collections::HashSet;

/// How an import treats a session that already has attendees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Drop the current roster and keep only the imported records.
    Replace,
    /// Keep the roster and append imported records with unseen phones.
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub added: usize,
    pub skipped: usize,
}

/// Append `incoming` to `existing`, skipping phones already present
/// (in `existing` or earlier in `incoming`). Check-in state of the
/// incoming records is kept as-is.
pub fn merge_records(existing: &[Attendee], incoming: Vec<Attendee>) -> (Vec<Attendee>, ImportReport) {
    let mut seen: HashSet<String> = existing.iter().map(|a| a.phone.clone()).collect();
    let mut merged = existing.to_vec();
    let mut report = ImportReport::default();

    for rec in incoming {
        if !seen.insert(rec.phone.clone()) {
            report.skipped += 1;
            continue;
        }
        merged.push(rec);
        report.added += 1;
    }

    (merged, report)
}

pub struct AttendeeStore<'r> {
    repo: &'r mut Repository,
}

impl<'r> AttendeeStore<'r> {
    pub fn new(repo: &'r mut Repository) -> Self {
        Self { repo }
    }

    pub fn active(&self) -> AppResult<Session> {
        self.repo.active_session()
    }

    /// True when an import must ask the user between replace and merge.
    pub fn needs_import_choice(&self) -> AppResult<bool> {
        Ok(!self.active()?.participants.is_empty())
    }

    fn commit(&mut self, next: &Session) -> AppResult<()> {
        self.repo.save_session(next)
    }

    // ------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------

    /// Create a session and make it the active one.
    pub fn create_session(&mut self, name: &str) -> AppResult<Session> {
        if name.trim().is_empty() {
            return Err(AppError::InvalidSessionName(name.to_string()));
        }

        let session = Session::new(name);
        self.repo.insert_session(&session)?;
        self.repo.set_active_session(&session.id)?;
        self.repo
            .audit("session_create", &session.name, &format!("id={}", session.id));
        Ok(session)
    }

    pub fn list_sessions(&self) -> AppResult<Vec<Session>> {
        self.repo.list_sessions()
    }

    pub fn select_session(&mut self, key: &str) -> AppResult<Session> {
        let session = self.repo.find_session(key)?;
        self.repo.set_active_session(&session.id)?;
        Ok(session)
    }

    /// Delete a session and every attendee it owns.
    pub fn delete_session(&mut self, key: &str) -> AppResult<Session> {
        let session = self.repo.find_session(key)?;
        self.repo.delete_session(&session.id)?;
        self.repo.audit(
            "session_delete",
            &session.name,
            &format!("{} attendees discarded", session.participants.len()),
        );
        Ok(session)
    }

    // ------------------------------------------------
    // Roster mutations
    // ------------------------------------------------

    /// Bulk import. `mode` only matters when the session already has attendees.
    pub fn load(&mut self, records: Vec<Attendee>, mode: ImportMode) -> AppResult<ImportReport> {
        let session = self.active()?;

        let base: &[Attendee] = match mode {
            ImportMode::Replace => &[],
            ImportMode::Merge => &session.participants,
        };
        let (roster, report) = merge_records(base, records);

        self.commit(&session.with_participants(roster))?;
        self.repo.audit(
            "import",
            &session.name,
            &format!(
                "{:?}: {} added, {} skipped",
                mode, report.added, report.skipped
            ),
        );
        Ok(report)
    }

    /// Register one attendee; rejects a phone already in the session.
    pub fn add(&mut self, record: Attendee) -> AppResult<Attendee> {
        if record.name.trim().is_empty() {
            return Err(AppError::MissingField("name"));
        }
        if record.phone.trim().is_empty() {
            return Err(AppError::MissingField("phone"));
        }

        let session = self.active()?;
        if session.has_phone(&record.phone) {
            return Err(AppError::DuplicatePhone(record.phone));
        }

        let mut added = record;
        added.clear_check_in();

        let mut roster = session.participants.clone();
        roster.push(added.clone());
        self.commit(&session.with_participants(roster))?;

        self.repo.audit("add", &session.name, &added.phone);
        Ok(added)
    }

    pub fn remove(&mut self, phone: &str) -> AppResult<usize> {
        self.remove_many(&[phone.to_string()])
    }

    /// Delete every attendee whose phone is listed. Returns how many went.
    pub fn remove_many(&mut self, phones: &[String]) -> AppResult<usize> {
        let session = self.active()?;
        let targets: HashSet<&str> = phones.iter().map(String::as_str).collect();

        let roster: Vec<Attendee> = session
            .participants
            .iter()
            .filter(|a| !targets.contains(a.phone.as_str()))
            .cloned()
            .collect();
        let removed = session.participants.len() - roster.len();

        if removed > 0 {
            self.commit(&session.with_participants(roster))?;
            self.repo
                .audit("del", &session.name, &format!("{} removed", removed));
        }
        Ok(removed)
    }

    /// Empty the roster of the active session.
    pub fn clear(&mut self) -> AppResult<usize> {
        let session = self.active()?;
        let removed = session.participants.len();

        self.commit(&session.with_participants(Vec::new()))?;
        self.repo
            .audit("clear", &session.name, &format!("{} removed", removed));
        Ok(removed)
    }
}
