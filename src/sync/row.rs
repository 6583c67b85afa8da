//! One row of the remote sheet.
//!
//! Column order is significant:
//! timestamp, session, name, affiliation, event, phone, vehicle,
//! disability, assistive device, checked-in (O/X), check-in time.

use crate::errors::{AppError, AppResult};
use crate::models::attendee::Attendee;
use chrono::{DateTime, Utc};
use csv::StringRecord;

pub const HEADERS: [&str; 11] = [
    "Timestamp",
    "Session",
    "Name",
    "Affiliation",
    "Event",
    "Phone",
    "Vehicle",
    "Disability",
    "AssistiveDevice",
    "CheckedIn",
    "CheckedInAt",
];

/// Spreadsheets eat leading zeros; the phone is stored behind this marker.
const PHONE_MARKER: char = '\'';

const FLAG_YES: &str = "O";
const FLAG_NO: &str = "X";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRow {
    pub timestamp: DateTime<Utc>,
    pub session: String,
    pub attendee: Attendee,
}

impl RemoteRow {
    pub fn new(timestamp: DateTime<Utc>, session: &str, attendee: &Attendee) -> Self {
        Self {
            timestamp,
            session: session.to_string(),
            attendee: attendee.clone(),
        }
    }

    pub fn to_record(&self) -> [String; 11] {
        let a = &self.attendee;
        [
            self.timestamp.to_rfc3339(),
            self.session.clone(),
            a.name.clone(),
            a.affiliation.clone(),
            a.event_name.clone().unwrap_or_default(),
            format!("{}{}", PHONE_MARKER, a.phone),
            a.vehicle.clone(),
            a.disability.clone().unwrap_or_default(),
            a.assistive_device.clone().unwrap_or_default(),
            if a.checked_in { FLAG_YES } else { FLAG_NO }.to_string(),
            a.checked_in_at.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
        ]
    }

    pub fn from_record(record: &StringRecord) -> AppResult<Self> {
        let cell = |i: usize| record.get(i).unwrap_or("").trim();
        let optional = |i: usize| {
            let v = cell(i);
            if v.is_empty() { None } else { Some(v.to_string()) }
        };

        let timestamp = parse_ts(cell(0))?;
        let checked_in_at = match optional(10) {
            Some(raw) => Some(parse_ts(&raw)?),
            None => None,
        };

        let attendee = Attendee {
            name: cell(2).to_string(),
            affiliation: cell(3).to_string(),
            event_name: optional(4),
            phone: cell(5).trim_start_matches(PHONE_MARKER).to_string(),
            vehicle: cell(6).to_string(),
            disability: optional(7),
            assistive_device: optional(8),
            checked_in: cell(9).eq_ignore_ascii_case(FLAG_YES),
            checked_in_at,
        };

        Ok(Self {
            timestamp,
            session: cell(1).to_string(),
            attendee,
        })
    }
}

fn parse_ts(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Remote(format!("bad timestamp '{}' in sheet: {}", raw, e)))
}
