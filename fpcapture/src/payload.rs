use crate::DisplayError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Prefix of the stdout line carrying the WSQ bytes.
pub const MARKER: &str = "FINGERPRINT_WSQ_B64:";

pub fn encode_payload(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// The complete marker line, without the trailing newline.
pub fn marker_line(bytes: &[u8]) -> String {
    format!("{}{}", MARKER, encode_payload(bytes))
}

/// Decodes a base64 payload. Surrounding whitespace and a leading marker are
/// ignored, so a captured marker line can be used as is.
pub fn decode_payload(text: &str) -> Result<Vec<u8>, DisplayError> {
    let text = text.trim();
    let text = text.strip_prefix(MARKER).unwrap_or(text);

    STANDARD.decode(text.trim()).map_err(DisplayError::InvalidPayload)
}

/// Finds the payload of the first marker line in a capture transcript.
pub fn extract_marker_payload(transcript: &str) -> Option<&str> {
    transcript
        .lines()
        .find_map(|line| line.trim_end().strip_prefix(MARKER))
}
