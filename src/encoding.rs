//! Text encodings for template and image buffers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Lowercase hex, two digits per byte.
pub fn hex_encode(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode a hex string (either case). Returns `None` on odd length or a
/// non-hex character.
pub fn hex_decode(text: &str) -> Option<Vec<u8>> {
    hex::decode(text).ok()
}

/// Standard padded base64.
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn base64_decode(text: &str) -> Option<Vec<u8>> {
    STANDARD.decode(text).ok()
}
