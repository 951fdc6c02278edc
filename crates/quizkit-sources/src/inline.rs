//! Data URLs and pasted JSON.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use quizkit_core::error::TransportError;

/// Decode a `data:[<mime>][;base64],<payload>` URL into text.
///
/// Payloads without `;base64` are returned as-is.
pub fn decode_data_url(url: &str) -> Result<String, TransportError> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| TransportError::InvalidSource("data URL must start with 'data:'".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| TransportError::Decode("data URL has no ',' separator".into()))?;

    if !header.ends_with(";base64") {
        return Ok(payload.to_string());
    }

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| TransportError::Decode(format!("invalid base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| TransportError::Decode(format!("payload is not UTF-8: {e}")))
}

/// Build a base64 JSON data URL, the form pasted JSON is shared in.
pub fn encode_data_url(json: &str) -> String {
    format!("data:application/json;base64,{}", STANDARD.encode(json))
}
