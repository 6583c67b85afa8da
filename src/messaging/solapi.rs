//! Solapi client (image storage + message send).
//!
//! Every request carries
//! `Authorization: HMAC-SHA256 apiKey=.., date=.., salt=.., signature=..`
//! where the signature is hex(HMAC-SHA256(secret, date + salt)).

use super::{MessageKind, MessagingProvider, OutgoingMessage, normalize_number};
use crate::config::SolapiConfig;
use crate::errors::{AppError, AppResult};
use chrono::{SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

/// HTTP timeout for provider calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SolapiClient {
    http: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

#[derive(Serialize)]
struct UploadBody<'a> {
    file: &'a str,
    #[serde(rename = "type")]
    kind: MessageKind,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage<'a> {
    to: String,
    from: String,
    text: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<MessageKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_id: Option<&'a str>,
}

#[derive(Serialize)]
struct SendBody<'a> {
    message: WireMessage<'a>,
}

/// Build the auth header for a given date and salt.
pub fn authorization_header(api_key: &str, api_secret: &str, date: &str, salt: &str) -> AppResult<String> {
    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())
        .map_err(|e| AppError::Config(format!("invalid API secret: {}", e)))?;
    mac.update(date.as_bytes());
    mac.update(salt.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(format!(
        "HMAC-SHA256 apiKey={}, date={}, salt={}, signature={}",
        api_key, date, salt, signature
    ))
}

/// Pull a readable reason out of a provider error body.
fn error_reason(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("errorMessage")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect());
    format!("{} {}", status.as_u16(), detail)
}

impl SolapiClient {
    pub fn new(cfg: &SolapiConfig) -> AppResult<Self> {
        if cfg.api_key.trim().is_empty() {
            return Err(AppError::Config("solapi.api_key is not set".into()));
        }
        if cfg.api_secret.trim().is_empty() {
            return Err(AppError::Config("solapi.api_secret is not set".into()));
        }

        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            api_secret: cfg.api_secret.clone(),
        })
    }

    fn auth(&self) -> AppResult<String> {
        let date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let salt_bytes: [u8; 16] = rand::random();
        authorization_header(&self.api_key, &self.api_secret, &date, &hex::encode(salt_bytes))
    }

    /// POST `body` and return the response text, or the provider's reason.
    fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<String, String> {
        let auth = self.auth().map_err(|e| e.to_string())?;
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(body)
            .send()
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        let text = resp.text().map_err(|e| e.to_string())?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(error_reason(status, &text))
        }
    }
}

impl MessagingProvider for SolapiClient {
    fn upload_image(&self, png_base64: &str) -> AppResult<String> {
        let body = UploadBody {
            file: png_base64,
            kind: MessageKind::Mms,
        };

        let text = self
            .post("/storage/v1/files", &body)
            .map_err(AppError::Upload)?;

        serde_json::from_str::<UploadResponse>(&text)
            .ok()
            .and_then(|r| r.file_id)
            .ok_or_else(|| AppError::Upload("response carried no fileId".into()))
    }

    fn send(&self, message: &OutgoingMessage) -> AppResult<()> {
        let kind = message.kind();
        let body = SendBody {
            message: WireMessage {
                to: normalize_number(&message.to),
                from: normalize_number(&message.from),
                text: &message.text,
                kind: (kind == MessageKind::Mms).then_some(kind),
                image_id: message.image_id.as_deref(),
            },
        };

        self.post("/messages/v4/send", &body)
            .map(|_| ())
            .map_err(AppError::Send)
    }
}
