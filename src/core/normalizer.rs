//! CSV → canonical attendee records.
//!
//! Attendee lists arrive with free-form headers ("이름", "Name", "성명 (Name)",
//! "전화번호", "Phone", ...). Headers are resolved once per import against an
//! ordered candidate table; every data row is then read by column index.

use crate::errors::AppResult;
use crate::models::attendee::Attendee;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Affiliation,
    Phone,
    Vehicle,
    EventName,
    Disability,
    AssistiveDevice,
}

/// Resolution order matters: a header is claimed by the first field that
/// matches it, so the more specific details go first ("Event Name" must not
/// become the attendee name, "장애인 보조기기" must not become the disability).
const HEADER_CANDIDATES: &[(Field, &[&str])] = &[
    (Field::AssistiveDevice, &["보조기기", "assistive", "device"]),
    (Field::Disability, &["장애", "disability"]),
    (Field::EventName, &["행사", "교육", "event", "program"]),
    (Field::Name, &["이름", "성명", "name"]),
    (Field::Affiliation, &["소속", "affiliation", "group"]),
    (Field::Phone, &["전화", "연락처", "phone", "tel"]),
    (Field::Vehicle, &["차량", "vehicle", "car"]),
];

/// Column index per canonical field, computed from the header row.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    name: Option<usize>,
    affiliation: Option<usize>,
    phone: Option<usize>,
    vehicle: Option<usize>,
    event_name: Option<usize>,
    disability: Option<usize>,
    assistive_device: Option<usize>,
}

impl HeaderMap {
    pub fn resolve(headers: &StringRecord) -> Self {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();

        let mut claimed = vec![false; normalized.len()];
        let mut map = HeaderMap::default();

        for (field, needles) in HEADER_CANDIDATES {
            let found = normalized.iter().enumerate().position(|(i, h)| {
                !claimed[i] && needles.iter().any(|n| h.contains(&n.to_lowercase()))
            });

            if let Some(idx) = found {
                claimed[idx] = true;
                *map.slot(*field) = Some(idx);
            }
        }

        map
    }

    fn slot(&mut self, field: Field) -> &mut Option<usize> {
        match field {
            Field::Name => &mut self.name,
            Field::Affiliation => &mut self.affiliation,
            Field::Phone => &mut self.phone,
            Field::Vehicle => &mut self.vehicle,
            Field::EventName => &mut self.event_name,
            Field::Disability => &mut self.disability,
            Field::AssistiveDevice => &mut self.assistive_device,
        }
    }

    pub fn column(&self, field: Field) -> Option<usize> {
        match field {
            Field::Name => self.name,
            Field::Affiliation => self.affiliation,
            Field::Phone => self.phone,
            Field::Vehicle => self.vehicle,
            Field::EventName => self.event_name,
            Field::Disability => self.disability,
            Field::AssistiveDevice => self.assistive_device,
        }
    }

    fn value<'r>(&self, record: &'r StringRecord, field: Field) -> &'r str {
        self.column(field)
            .and_then(|idx| record.get(idx))
            .unwrap_or("")
    }

    pub fn to_attendee(&self, record: &StringRecord) -> Attendee {
        Attendee::new(
            self.value(record, Field::Name),
            self.value(record, Field::Affiliation),
            self.value(record, Field::Phone),
            self.value(record, Field::Vehicle),
        )
        .with_event_name(self.value(record, Field::EventName))
        .with_disability(self.value(record, Field::Disability))
        .with_assistive_device(self.value(record, Field::AssistiveDevice))
    }
}

/// Parse CSV text from any reader. The first row must be the header row.
pub fn normalize_reader<R: Read>(reader: R) -> AppResult<Vec<Attendee>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let map = HeaderMap::resolve(&headers);

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        out.push(map.to_attendee(&record));
    }

    Ok(out)
}

pub fn normalize_str(content: &str) -> AppResult<Vec<Attendee>> {
    normalize_reader(content.as_bytes())
}

pub fn normalize_file(path: &Path) -> AppResult<Vec<Attendee>> {
    let file = File::open(path)?;
    normalize_reader(file)
}
