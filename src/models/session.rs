use super::attendee::Attendee;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One organized event and its roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<Attendee>,
}

/// Check-in counters shown on top of the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterStats {
    pub total: usize,
    pub checked_in: usize,
    pub not_checked_in: usize,
}

impl Session {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
            participants: Vec::new(),
        }
    }

    pub fn has_phone(&self, phone: &str) -> bool {
        self.participants.iter().any(|a| a.phone == phone)
    }

    pub fn find_by_phone(&self, phone: &str) -> Option<&Attendee> {
        self.participants.iter().find(|a| a.phone == phone)
    }

    /// Copy of this session with a different roster.
    pub fn with_participants(&self, participants: Vec<Attendee>) -> Self {
        Self {
            participants,
            ..self.clone()
        }
    }

    pub fn stats(&self) -> RosterStats {
        let total = self.participants.len();
        let checked_in = self.participants.iter().filter(|a| a.checked_in).count();
        RosterStats {
            total,
            checked_in,
            not_checked_in: total - checked_in,
        }
    }

    pub fn search<'a>(&'a self, term: &'a str) -> impl Iterator<Item = &'a Attendee> + 'a {
        self.participants
            .iter()
            .filter(move |a| term.is_empty() || a.matches_search(term))
    }
}
