//! Unified application error type.
//! Every layer (db, core, sync, messaging, cli) returns AppError so failures
//! reach the user as one human-readable line.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO / storage
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid QR payload: {0}")]
    InvalidPayload(String),

    // ---------------------------
    // Validation errors
    // ---------------------------
    #[error("Phone {0} is already registered in this session")]
    DuplicatePhone(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("No attendee with phone {0} in the active session")]
    AttendeeNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No active session. Create one with `session create` or pick one with `session use`")]
    NoActiveSession,

    #[error("Invalid session name: {0}")]
    InvalidSessionName(String),

    #[error("Invalid role: {0} (use admin or staff)")]
    InvalidRole(String),

    // ---------------------------
    // Authorization
    // ---------------------------
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    // ---------------------------
    // Remote sync
    // ---------------------------
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Remote store is busy: lock not obtained within {0} seconds")]
    LockTimeout(u64),

    // ---------------------------
    // Messaging / QR
    // ---------------------------
    #[error("Image upload failed: {0}")]
    Upload(String),

    #[error("Message send failed: {0}")]
    Send(String),

    #[error("QR rendering failed: {0}")]
    Qr(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
