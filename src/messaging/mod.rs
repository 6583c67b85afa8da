//! Outbound SMS/MMS messaging.

pub mod solapi;

use crate::errors::AppResult;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    Sms,
    Mms,
}

/// One message to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub from: String,
    pub text: String,
    /// Provider file id of an uploaded image; turns the message into an MMS.
    pub image_id: Option<String>,
}

impl OutgoingMessage {
    pub fn kind(&self) -> MessageKind {
        if self.image_id.is_some() {
            MessageKind::Mms
        } else {
            MessageKind::Sms
        }
    }
}

/// Provider seam used by the dispatcher.
pub trait MessagingProvider {
    /// Upload a base64 PNG and return the provider's file id.
    fn upload_image(&self, png_base64: &str) -> AppResult<String>;

    fn send(&self, message: &OutgoingMessage) -> AppResult<()>;
}

/// Keep digits only ("010-1234-5678" → "01012345678").
pub fn normalize_number(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
