use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Unpadded URL-safe base64, as used in JWT segments.
///
/// Text and raw bytes go through the same engine, so header/claims segments and
/// signature bytes share one alphabet.
pub fn encode(input: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

pub fn decode(input: impl AsRef<[u8]>) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(input)
}
