//! QR code generation for attendee payloads.

use crate::errors::{AppError, AppResult};
use crate::models::attendee::Attendee;
use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Minimum edge of the rendered PNG, in pixels.
pub const QR_MIN_SIZE: u32 = 300;

/// QR payload: the attendee record serialized as JSON.
pub fn payload(attendee: &Attendee) -> AppResult<String> {
    Ok(serde_json::to_string(attendee)?)
}

/// Render `data` as a PNG with a quiet zone around the code.
pub fn render_png(data: &str) -> AppResult<Vec<u8>> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| AppError::Qr(e.to_string()))?;
    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_MIN_SIZE, QR_MIN_SIZE)
        .quiet_zone(true)
        .build();

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| AppError::Qr(e.to_string()))?;
    Ok(bytes)
}

/// PNG of the attendee's code, base64-encoded for provider upload.
pub fn render_base64(attendee: &Attendee) -> AppResult<String> {
    let png = render_png(&payload(attendee)?)?;
    Ok(general_purpose::STANDARD.encode(png))
}

pub fn write_png(attendee: &Attendee, path: &Path) -> AppResult<()> {
    let png = render_png(&payload(attendee)?)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, png)?;
    Ok(())
}
