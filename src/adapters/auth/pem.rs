use base64::{engine::general_purpose::STANDARD, Engine as _};
use error_stack::{report, ResultExt};
use rsa::{pkcs8::DecodePrivateKey, RsaPrivateKey};

use crate::domain::credential::CredentialFormatError;

const BEGIN_MARKER: &str = "BEGIN PRIVATE KEY";
const END_MARKER: &str = "END PRIVATE KEY";

/// Turns a configured key string into canonical PEM text.
///
/// Accepts, in this order: a whole service-account JSON document (its
/// `private_key` is used), newlines flattened into literal `\n` sequences,
/// and one pair of wrapping quotes. The result is trimmed and ends with a
/// single newline.
pub fn normalize_pem(raw: &str) -> error_stack::Result<String, CredentialFormatError> {
    let mut pem = raw.trim().to_string();
    if pem.is_empty() {
        return Err(report!(CredentialFormatError::Empty));
    }

    if pem.starts_with('{') {
        if let Some(key) = private_key_from_json(&pem) {
            pem = key;
        }
    }

    if pem.contains("\\n") {
        pem = pem.replace("\\n", "\n");
    }

    if is_quoted(&pem) {
        pem = pem[1..pem.len() - 1].to_string();
    }

    let pem = pem.replace("\r\n", "\n");
    let pem = pem.trim();

    if !pem.contains(BEGIN_MARKER) {
        return Err(report!(CredentialFormatError::MissingMarker(BEGIN_MARKER)));
    }
    if !pem.contains(END_MARKER) {
        return Err(report!(CredentialFormatError::MissingMarker(END_MARKER)));
    }

    Ok(format!("{}\n", pem))
}

fn private_key_from_json(document: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(document).ok()?;
    value
        .get("private_key")
        .and_then(|key| key.as_str())
        .map(str::to_string)
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')))
}

/// Raw DER bytes of the key: the base64 body between the markers.
pub fn pem_body_der(pem: &str) -> error_stack::Result<Vec<u8>, CredentialFormatError> {
    let body: String = pem
        .replace(&format!("-----{}-----", BEGIN_MARKER), "")
        .replace(&format!("-----{}-----", END_MARKER), "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    STANDARD
        .decode(body.as_bytes())
        .change_context(CredentialFormatError::InvalidBase64)
}

/// Normalizes `raw` and parses it as a PKCS#8 RSA private key.
pub fn decode_private_key(raw: &str) -> error_stack::Result<RsaPrivateKey, CredentialFormatError> {
    let pem = normalize_pem(raw)?;
    let der = pem_body_der(&pem)?;
    RsaPrivateKey::from_pkcs8_der(&der)
        .map_err(|err| report!(CredentialFormatError::InvalidKey).attach_printable(err.to_string()))
}
