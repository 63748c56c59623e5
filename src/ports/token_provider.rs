use thiserror::Error;

use crate::domain::credential::AccessToken;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("service account key is malformed")]
    CredentialFormat,
    #[error("failed to sign token assertion")]
    Signing,
    #[error("token endpoint request failed")]
    Transport,
    #[error("token endpoint rejected the assertion: {payload}")]
    Rejected { payload: String },
    #[error("token endpoint returned an unexpected response")]
    MalformedResponse,
}

#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a bearer token valid for the spreadsheet scope.
    async fn access_token(&self) -> error_stack::Result<AccessToken, AuthError>;
}
