//! Web endpoint transport.

use super::{PushReceipt, ResponseStatus, SessionSummary, SyncGateway, SyncRequest, SyncResponse};
use crate::errors::{AppError, AppResult};
use crate::models::attendee::Attendee;
use chrono::{DateTime, NaiveDateTime};
use reqwest::blocking::Client;
use std::time::Duration;

/// `lastUpdate` layouts seen from spreadsheet endpoints besides RFC 3339
/// (`toLocaleString()` output in en-US and ko-KR).
const LOCAL_TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%Y, %I:%M:%S %p",
    "%Y. %m. %d. %p %I:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a response body of a read action.
pub fn parse_response(body: &str) -> AppResult<SyncResponse> {
    let resp: SyncResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Remote(format!("malformed response: {}", e)))?;
    resp.into_result()
}

/// Interpret the body returned for a save.
pub fn interpret_push(body: &str) -> AppResult<PushReceipt> {
    // Some deployments answer saves with an opaque redirect page.
    let Ok(resp) = serde_json::from_str::<SyncResponse>(body) else {
        return Ok(PushReceipt::Unconfirmed);
    };

    match (resp.status, resp.count) {
        (ResponseStatus::Success, Some(count)) => Ok(PushReceipt::Acknowledged { count }),
        (ResponseStatus::Success, None) => Ok(PushReceipt::Unconfirmed),
        (ResponseStatus::Error, _) => resp.into_result().map(|_| PushReceipt::Unconfirmed),
    }
}

/// Best-effort reading of a `lastUpdate` value.
pub fn parse_last_update(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    let value = value.replace("오전", "AM").replace("오후", "PM");
    LOCAL_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&value, fmt).ok())
}

/// Most recent first. Values that do not parse go last, in reverse text order.
pub fn sort_by_last_update(sessions: &mut [SessionSummary]) {
    sessions.sort_by_cached_key(|s| {
        std::cmp::Reverse((parse_last_update(&s.last_update), s.last_update.clone()))
    });
}

pub struct HttpGateway {
    client: Client,
    endpoint: String,
}

impl HttpGateway {
    pub fn new(endpoint: &str) -> AppResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn post(&self, req: &SyncRequest) -> AppResult<String> {
        let body = self
            .client
            .post(&self.endpoint)
            .json(req)
            .send()?
            .text()?;
        Ok(body)
    }

    fn call(&self, req: &SyncRequest) -> AppResult<SyncResponse> {
        parse_response(&self.post(req)?)
    }
}

impl SyncGateway for HttpGateway {
    fn push(&self, attendees: &[Attendee], session_name: &str) -> AppResult<PushReceipt> {
        interpret_push(&self.post(&SyncRequest::save(session_name, attendees))?)
    }

    fn list_sessions(&self) -> AppResult<Vec<SessionSummary>> {
        let mut sessions = self
            .call(&SyncRequest::get_sessions())?
            .sessions
            .unwrap_or_default();
        sort_by_last_update(&mut sessions);
        Ok(sessions)
    }

    fn fetch_session(&self, session_name: &str) -> AppResult<Vec<Attendee>> {
        Ok(self
            .call(&SyncRequest::get_session_data(session_name))?
            .data
            .unwrap_or_default())
    }
}
