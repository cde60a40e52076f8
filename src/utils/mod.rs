use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ProviderError;

/// Longest note (in characters) we are willing to classify.
pub const MAX_NOTE_CHARS: usize = 1000;

static DATA_URI_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/[^;]+;base64,").expect("static regex compile"));

pub fn strip_data_uri_prefix(text: &str) -> &str {
    match DATA_URI_PREFIX.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Turns whatever the download endpoint returned into image bytes.
///
/// Binary bodies pass through untouched. Text bodies are treated as base64,
/// optionally behind a `data:image/...;base64,` prefix. A prefixed body that
/// fails to decode is an error; an unprefixed text body that is not base64 is
/// kept as is.
pub fn decode_image_payload(raw: &[u8]) -> Result<Vec<u8>, ProviderError> {
    if raw.is_empty() {
        return Err(ProviderError::Protocol("image payload is empty".to_string()));
    }

    let text = match std::str::from_utf8(raw) {
        Ok(text) => text.trim(),
        Err(_) => return Ok(raw.to_vec()),
    };

    let is_data_uri = DATA_URI_PREFIX.is_match(text);
    let encoded: String = strip_data_uri_prefix(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    match general_purpose::STANDARD.decode(encoded.as_bytes()) {
        Ok(bytes) if bytes.is_empty() => Err(ProviderError::Protocol(
            "image payload decodes to nothing".to_string(),
        )),
        Ok(bytes) => Ok(bytes),
        Err(e) if is_data_uri => Err(ProviderError::Protocol(format!(
            "invalid base64 in data URI: {}",
            e
        ))),
        Err(_) => Ok(raw.to_vec()),
    }
}

pub fn validate_note_text(text: &str) -> Result<(), ProviderError> {
    if text.trim().is_empty() {
        return Err(ProviderError::Validation("note text must not be empty".to_string()));
    }
    let length = text.chars().count();
    if length > MAX_NOTE_CHARS {
        return Err(ProviderError::Validation(format!(
            "note text is {} characters, the maximum is {}",
            length, MAX_NOTE_CHARS
        )));
    }
    Ok(())
}

pub fn require_non_blank(value: &str, what: &str) -> Result<(), ProviderError> {
    if value.trim().is_empty() {
        Err(ProviderError::Validation(format!("{} must not be empty", what)))
    } else {
        Ok(())
    }
}

/// Subject names become file names, so they must not walk out of the image dir.
pub fn validate_subject_name(name: &str) -> Result<(), ProviderError> {
    require_non_blank(name, "subject name")?;
    if name.contains('/') || name.contains('\\') || name.contains("..") || name.contains('\0') {
        return Err(ProviderError::Validation(format!(
            "subject name {:?} must not contain path separators",
            name
        )));
    }
    Ok(())
}
