//! Photo capture: turning an image file into a checklist answer payload.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::model::PhotoPayload;

#[derive(Debug, thiserror::Error)]
#[error("failed to read photo {path}: {source}")]
pub struct PhotoError {
    path: PathBuf,
    source: std::io::Error,
}

/// Reads an image and encodes it as a `data:` URI payload.
pub fn capture(path: &Path) -> Result<PhotoPayload, PhotoError> {
    let bytes = fs::read(path).map_err(|source| PhotoError {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "photo captured");
    Ok(encode(&bytes, mime_for(path)))
}

#[must_use]
pub fn encode(bytes: &[u8], mime: &str) -> PhotoPayload {
    PhotoPayload::new(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Guesses the MIME type from the file extension.
fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}
