use error_stack::{report, ResultExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use super::jwt::build_assertion;
use crate::domain::credential::{AccessToken, ServiceCredential};
use crate::ports::token_provider::{AuthError, TokenProvider};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchanges self-signed service-account assertions for bearer tokens.
///
/// Every call mints a fresh token; wrap in
/// [`CachedTokenProvider`](super::cache::CachedTokenProvider) to reuse them.
#[derive(Debug, Clone)]
pub struct CredentialMinter {
    http: Client,
    credential: ServiceCredential,
}

impl CredentialMinter {
    pub fn new(http: Client, credential: ServiceCredential) -> Self {
        Self { http, credential }
    }

    #[instrument(skip(self), fields(issuer = %self.credential.issuer_email))]
    pub async fn mint(&self) -> error_stack::Result<AccessToken, AuthError> {
        self.mint_at(chrono::Utc::now().timestamp()).await
    }

    pub async fn mint_at(&self, now: i64) -> error_stack::Result<AccessToken, AuthError> {
        let assertion = build_assertion(&self.credential, now)?;

        let response = self
            .http
            .post(&self.credential.audience)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .change_context(AuthError::Transport)
            .attach_printable_lazy(|| format!("POST {}", self.credential.audience))?;

        let status = response.status();
        let body = response.text().await.change_context(AuthError::Transport)?;

        if !status.is_success() {
            tracing::warn!("token endpoint responded {}", status);
            return Err(report!(AuthError::Rejected {
                payload: rejection_payload(&body),
            })
            .attach_printable(format!("HTTP status {}", status)));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .change_context(AuthError::MalformedResponse)
            .attach_printable("response has no access_token")?;

        tracing::debug!("minted access token");
        Ok(AccessToken::new(token.access_token, now))
    }
}

/// The provider's `error` (with its description when present), or the raw body.
fn rejection_payload(body: &str) -> String {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(TokenErrorResponse {
            error: Some(error),
            error_description: Some(description),
        }) => format!("{}: {}", error, description),
        Ok(TokenErrorResponse {
            error: Some(error), ..
        }) => error,
        _ => body.trim().to_string(),
    }
}

#[async_trait::async_trait]
impl TokenProvider for CredentialMinter {
    async fn access_token(&self) -> error_stack::Result<AccessToken, AuthError> {
        self.mint().await
    }
}
