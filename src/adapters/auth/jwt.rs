use error_stack::{report, ResultExt};
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde::Serialize;
use sha2::Sha256;

use super::base64url;
use super::pem::decode_private_key;
use crate::domain::credential::{ServiceCredential, TOKEN_LIFETIME_SECS};
use crate::ports::token_provider::AuthError;

#[derive(Debug, Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: Header = Header {
    alg: "RS256",
    typ: "JWT",
};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ClaimSet<'a> {
    pub iss: &'a str,
    pub scope: &'a str,
    pub aud: &'a str,
    pub exp: i64,
    pub iat: i64,
}

impl<'a> ClaimSet<'a> {
    pub fn new(credential: &'a ServiceCredential, issued_at: i64) -> Self {
        Self {
            iss: &credential.issuer_email,
            scope: &credential.scope,
            aud: &credential.audience,
            exp: issued_at + TOKEN_LIFETIME_SECS,
            iat: issued_at,
        }
    }
}

/// `base64url(header) + "." + base64url(claims)`.
pub fn signing_input(claims: &ClaimSet<'_>) -> error_stack::Result<String, AuthError> {
    let header = serde_json::to_vec(&HEADER).change_context(AuthError::Signing)?;
    let claims = serde_json::to_vec(claims).change_context(AuthError::Signing)?;
    Ok(format!(
        "{}.{}",
        base64url::encode(header),
        base64url::encode(claims)
    ))
}

/// RSASSA-PKCS1-v1_5 / SHA-256 signature over `input`, base64url-encoded.
pub fn sign(input: &str, key: &RsaPrivateKey) -> error_stack::Result<String, AuthError> {
    let signing_key = SigningKey::<Sha256>::new(key.clone());
    let signature = signing_key
        .try_sign(input.as_bytes())
        .map_err(|err| report!(AuthError::Signing).attach_printable(err.to_string()))?;
    Ok(base64url::encode(signature.to_bytes()))
}

/// Builds the signed JWT-bearer assertion for `credential` issued at `issued_at`.
///
/// Deterministic: the same credential and timestamp always yield the same token.
pub fn build_assertion(
    credential: &ServiceCredential,
    issued_at: i64,
) -> error_stack::Result<String, AuthError> {
    let key = decode_private_key(&credential.private_key).change_context(AuthError::CredentialFormat)?;
    let input = signing_input(&ClaimSet::new(credential, issued_at))?;
    let signature = sign(&input, &key)?;
    Ok(format!("{}.{}", input, signature))
}
