//! Best-effort mirror of session rosters to a spreadsheet-backed store.
//!
//! The remote side is an append-only log of rows tagged with a session name
//! and a timestamp. Two transports speak the same request/response contract:
//! [`http::HttpGateway`] for a web endpoint and [`sheet::SheetGateway`] for a
//! CSV sheet on disk.

pub mod http;
pub mod remote;
pub mod row;
pub mod sheet;

use crate::errors::{AppError, AppResult};
use crate::models::attendee::Attendee;
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncAction {
    Save,
    GetSessions,
    GetSessionData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub action: SyncAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Attendee>>,
}

impl SyncRequest {
    pub fn save(session_name: &str, attendees: &[Attendee]) -> Self {
        Self {
            action: SyncAction::Save,
            session_name: Some(session_name.to_string()),
            data: Some(attendees.to_vec()),
        }
    }

    pub fn get_sessions() -> Self {
        Self {
            action: SyncAction::GetSessions,
            session_name: None,
            data: None,
        }
    }

    pub fn get_session_data(session_name: &str) -> Self {
        Self {
            action: SyncAction::GetSessionData,
            session_name: Some(session_name.to_string()),
            data: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Summary of one remote session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub name: String,
    pub count: usize,
    pub last_update: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<SessionSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Attendee>>,
}

impl SyncResponse {
    pub fn success() -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            count: None,
            sessions: None,
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: Some(message.into()),
            ..Self::success()
        }
    }

    /// Turn an error status into `AppError::Remote`.
    pub fn into_result(self) -> AppResult<Self> {
        match self.status {
            ResponseStatus::Success => Ok(self),
            ResponseStatus::Error => Err(AppError::Remote(
                self.message
                    .unwrap_or_else(|| "remote store reported an error".into()),
            )),
        }
    }
}

/// Outcome of a push. The write is either acknowledged by the store or
/// went out without any observable confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushReceipt {
    Acknowledged { count: usize },
    Unconfirmed,
}

pub trait SyncGateway {
    fn push(&self, attendees: &[Attendee], session_name: &str) -> AppResult<PushReceipt>;

    /// Remote sessions, most recently updated first.
    fn list_sessions(&self) -> AppResult<Vec<SessionSummary>>;

    fn fetch_session(&self, session_name: &str) -> AppResult<Vec<Attendee>>;
}

/// Collapse repeated pushes of a session: keep only the most recent row for
/// every phone. Surviving rows keep their log order.
pub fn latest_per_phone(rows: Vec<Attendee>) -> Vec<Attendee> {
    let mut seen = HashSet::new();
    let mut out: Vec<Attendee> = rows
        .into_iter()
        .rev()
        .filter(|a| seen.insert(a.phone.clone()))
        .collect();
    out.reverse();
    out
}

/// Pick a transport from the configured endpoint: `http(s)://…` talks to a
/// web endpoint, anything else is a CSV sheet path.
pub fn open_gateway(endpoint: &str) -> AppResult<Box<dyn SyncGateway>> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(AppError::Config(
            "sync_endpoint is not set in the configuration file".into(),
        ));
    }

    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(Box::new(http::HttpGateway::new(endpoint)?))
    } else {
        Ok(Box::new(sheet::SheetGateway::open(expand_tilde(endpoint))))
    }
}
