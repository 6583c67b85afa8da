//! Check-in engine: manual toggle behind operator credentials, and
//! scan-driven check-in from QR payloads.
//!
//! Scanning only ever moves an attendee to checked-in; the reverse
//! transition is reachable through a manual cancel only.

use crate::core::auth::Grant;
use crate::db::repository::Repository;
use crate::errors::{AppError, AppResult};
use crate::models::attendee::Attendee;
use crate::models::session::Session;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// How long a scan result stays on screen (and how long an identical
/// payload is ignored).
pub const SCAN_DISPLAY_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualOutcome {
    CheckedIn(Attendee),
    Cancelled(Attendee),
    /// Nothing changed (check-in of a checked-in attendee, or cancel of a
    /// not-checked-in one).
    Unchanged(Attendee),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Success(Attendee),
    AlreadyCheckedIn(Attendee),
    NoMatch { name: String, phone: String },
    Invalid(String),
    /// Same raw payload as the one currently displayed.
    Ignored,
}

impl ScanOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            ScanOutcome::Success(_) => "Check-in complete",
            ScanOutcome::AlreadyCheckedIn(_) => "Already checked in",
            ScanOutcome::NoMatch { .. } => "Not on the list",
            ScanOutcome::Invalid(_) => "Invalid QR code",
            ScanOutcome::Ignored => "Duplicate scan ignored",
        }
    }
}

/// Decode a QR payload into the attendee it was generated from.
pub fn parse_payload(raw: &str) -> AppResult<Attendee> {
    serde_json::from_str::<Attendee>(raw.trim()).map_err(|e| AppError::InvalidPayload(e.to_string()))
}

/// Pure scan resolution: returns the next session when something changed.
pub fn resolve_scan(session: &Session, raw: &str, at: DateTime<Utc>) -> (Option<Session>, ScanOutcome) {
    let parsed = match parse_payload(raw) {
        Ok(p) => p,
        Err(e) => return (None, ScanOutcome::Invalid(e.to_string())),
    };

    // a code without both identity fields never names an attendee
    if parsed.name.trim().is_empty() || parsed.phone.trim().is_empty() {
        return (
            None,
            ScanOutcome::NoMatch {
                name: parsed.name,
                phone: parsed.phone,
            },
        );
    }

    let Some(idx) = session
        .participants
        .iter()
        .position(|a| a.matches(&parsed.phone, &parsed.name))
    else {
        return (
            None,
            ScanOutcome::NoMatch {
                name: parsed.name,
                phone: parsed.phone,
            },
        );
    };

    let current = &session.participants[idx];
    if current.checked_in {
        return (None, ScanOutcome::AlreadyCheckedIn(current.clone()));
    }

    let mut roster = session.participants.clone();
    roster[idx].mark_checked_in(at);
    let checked = roster[idx].clone();

    (
        Some(session.with_participants(roster)),
        ScanOutcome::Success(checked),
    )
}

/// Pure manual toggle on the attendee with `phone`.
pub fn toggle(session: &Session, phone: &str, check_in: bool, at: DateTime<Utc>) -> AppResult<(Option<Session>, ManualOutcome)> {
    let idx = session
        .participants
        .iter()
        .position(|a| a.phone == phone)
        .ok_or_else(|| AppError::AttendeeNotFound(phone.to_string()))?;

    let current = &session.participants[idx];
    if current.checked_in == check_in {
        return Ok((None, ManualOutcome::Unchanged(current.clone())));
    }

    let mut roster = session.participants.clone();
    if check_in {
        roster[idx].mark_checked_in(at);
    } else {
        roster[idx].clear_check_in();
    }
    let updated = roster[idx].clone();

    let outcome = if check_in {
        ManualOutcome::CheckedIn(updated)
    } else {
        ManualOutcome::Cancelled(updated)
    };
    Ok((Some(session.with_participants(roster)), outcome))
}

/// Debounce and display state of a scanning station.
#[derive(Debug)]
pub struct ScanDesk {
    window: Duration,
    last_raw: Option<(String, Instant)>,
    shown: Option<(ScanOutcome, Instant)>,
}

impl Default for ScanDesk {
    fn default() -> Self {
        Self::new(SCAN_DISPLAY_WINDOW)
    }
}

impl ScanDesk {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_raw: None,
            shown: None,
        }
    }

    fn expire(&mut self, now: Instant) {
        if let Some((_, at)) = &self.last_raw
            && now.duration_since(*at) >= self.window
        {
            self.last_raw = None;
        }
        if let Some((_, at)) = &self.shown
            && now.duration_since(*at) >= self.window
        {
            self.shown = None;
        }
    }

    /// False when `raw` equals the payload accepted less than a window ago.
    pub fn admit(&mut self, raw: &str, now: Instant) -> bool {
        self.expire(now);
        !matches!(&self.last_raw, Some((last, _)) if last == raw)
    }

    /// Remember an outcome for display. Parsed payloads also arm the
    /// debounce; unreadable ones do not.
    pub fn record(&mut self, raw: &str, outcome: &ScanOutcome, now: Instant) {
        if !matches!(outcome, ScanOutcome::Invalid(_) | ScanOutcome::Ignored) {
            self.last_raw = Some((raw.to_string(), now));
        }
        self.shown = Some((outcome.clone(), now));
    }

    /// Outcome still on screen at `now`, if any.
    pub fn current(&mut self, now: Instant) -> Option<&ScanOutcome> {
        self.expire(now);
        self.shown.as_ref().map(|(o, _)| o)
    }
}

pub struct CheckInEngine<'r> {
    repo: &'r mut Repository,
}

impl<'r> CheckInEngine<'r> {
    pub fn new(repo: &'r mut Repository) -> Self {
        Self { repo }
    }

    fn apply_manual(&mut self, phone: &str, check_in: bool, grant: &Grant) -> AppResult<ManualOutcome> {
        let session = self.repo.active_session()?;
        let (next, outcome) = toggle(&session, phone, check_in, Utc::now())?;

        if let Some(next) = next {
            self.repo.save_session(&next)?;
            let op = if check_in { "checkin" } else { "cancel" };
            self.repo
                .audit(op, &session.name, &format!("{} by {}", phone, grant.operator));
        }
        Ok(outcome)
    }

    /// Manual check-in; requires a grant for `Permission::CheckIn`.
    pub fn check_in(&mut self, phone: &str, grant: &Grant) -> AppResult<ManualOutcome> {
        self.apply_manual(phone, true, grant)
    }

    /// Manual reversal of a check-in.
    pub fn cancel(&mut self, phone: &str, grant: &Grant) -> AppResult<ManualOutcome> {
        self.apply_manual(phone, false, grant)
    }

    /// Process one raw payload read by the scanner.
    pub fn scan(&mut self, desk: &mut ScanDesk, raw: &str, now: Instant) -> AppResult<ScanOutcome> {
        if !desk.admit(raw, now) {
            return Ok(ScanOutcome::Ignored);
        }

        let session = self.repo.active_session()?;
        let (next, outcome) = resolve_scan(&session, raw, Utc::now());

        if let Some(next) = next {
            self.repo.save_session(&next)?;
            if let ScanOutcome::Success(a) = &outcome {
                self.repo.audit("scan", &session.name, &a.phone);
            }
        }

        desk.record(raw, &outcome, now);
        Ok(outcome)
    }
}
