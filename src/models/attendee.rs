use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// One registered participant.
///
/// The phone number is the identity of an attendee inside a session.
/// The JSON form of this struct (camelCase) is also the QR payload handed
/// out to attendees, so renaming a field breaks every code already sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attendee {
    pub name: String,
    pub affiliation: String,
    pub phone: String,
    pub vehicle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistive_device: Option<String>,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl Attendee {
    /// Build a fresh, not-checked-in attendee.
    pub fn new(name: &str, affiliation: &str, phone: &str, vehicle: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            affiliation: affiliation.trim().to_string(),
            phone: phone.trim().to_string(),
            vehicle: vehicle.trim().to_string(),
            ..Self::default()
        }
    }

    pub fn mark_checked_in(&mut self, at: DateTime<Utc>) {
        self.checked_in = true;
        self.checked_in_at = Some(at);
    }

    pub fn clear_check_in(&mut self) {
        self.checked_in = false;
        self.checked_in_at = None;
    }

    /// Scan matching key: exact phone and exact name.
    pub fn matches(&self, phone: &str, name: &str) -> bool {
        self.phone == phone && self.name == name
    }

    /// Dashboard search: name/affiliation case-insensitive, phone by substring.
    pub fn matches_search(&self, term: &str) -> bool {
        let t = term.to_lowercase();
        self.name.to_lowercase().contains(&t)
            || self.phone.contains(term)
            || self.affiliation.to_lowercase().contains(&t)
    }

    pub fn checked_in_at_local(&self) -> Option<String> {
        self.checked_in_at.map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let v = value.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

/// Builder-style setters for the optional detail fields.
impl Attendee {
    pub fn with_event_name(mut self, value: &str) -> Self {
        self.event_name = non_empty(value);
        self
    }

    pub fn with_disability(mut self, value: &str) -> Self {
        self.disability = non_empty(value);
        self
    }

    pub fn with_assistive_device(mut self, value: &str) -> Self {
        self.assistive_device = non_empty(value);
        self
    }
}
