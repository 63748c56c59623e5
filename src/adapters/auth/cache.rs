use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::credential::AccessToken;
use crate::ports::token_provider::{AuthError, TokenProvider};

/// Tokens with this little lifetime left are treated as expired.
pub const REFRESH_MARGIN_SECS: i64 = 300;

/// Reuses a minted token until it gets close to expiry.
pub struct CachedTokenProvider {
    inner: Arc<dyn TokenProvider>,
    cached: RwLock<Option<AccessToken>>,
}

impl CachedTokenProvider {
    pub fn new(inner: Arc<dyn TokenProvider>) -> Self {
        Self {
            inner,
            cached: RwLock::new(None),
        }
    }

    pub async fn access_token_at(&self, now: i64) -> error_stack::Result<AccessToken, AuthError> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh(now, REFRESH_MARGIN_SECS) {
                return Ok(token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(now, REFRESH_MARGIN_SECS) {
                return Ok(token.clone());
            }
        }

        tracing::debug!("cached access token missing or stale, minting");
        let token = self.inner.access_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

#[async_trait::async_trait]
impl TokenProvider for CachedTokenProvider {
    async fn access_token(&self) -> error_stack::Result<AccessToken, AuthError> {
        self.access_token_at(chrono::Utc::now().timestamp()).await
    }
}
