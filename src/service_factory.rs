use std::sync::Arc;

use error_stack::{Result, ResultExt};
use reqwest::Client;

use crate::adapters::auth::{CachedTokenProvider, CredentialMinter};
use crate::adapters::config::{AppConfig, ConfigError};
use crate::adapters::http::AppState;
use crate::adapters::sheets::SpreadsheetClient;
use crate::adapters::telegram::TelegramNotifier;
use crate::application::catalog::CatalogService;
use crate::application::submission::SubmissionService;
use crate::ports::notifier::{NoopNotifier, Notifier};
use crate::ports::spreadsheet::SpreadsheetGateway;
use crate::ports::token_provider::TokenProvider;

/// Wires the adapters named by `config` into the request handlers' state.
pub struct ServiceFactory;

impl ServiceFactory {
    pub fn create(config: &AppConfig) -> Result<AppState, ConfigError> {
        let http = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .change_context(ConfigError::Invalid("HTTP_TIMEOUT_SECS".into()))?;

        let minter: Arc<dyn TokenProvider> =
            Arc::new(CredentialMinter::new(http.clone(), config.service_credential()));
        let tokens: Arc<dyn TokenProvider> = if config.token_cache {
            tracing::info!("access token cache enabled");
            Arc::new(CachedTokenProvider::new(minter))
        } else {
            minter
        };

        let sheets: Arc<dyn SpreadsheetGateway> = Arc::new(
            SpreadsheetClient::new(http.clone(), &config.google_sheets_api_url)
                .change_context(ConfigError::Invalid("GOOGLE_SHEETS_API_URL".into()))?,
        );

        let telegram = TelegramNotifier::new(
            http,
            config.telegram_api_url.trim(),
            config.telegram_bot_token.trim(),
            config.telegram_recipients(),
        );
        let notifier: Arc<dyn Notifier> = match &telegram {
            Some(telegram) => {
                tracing::info!(recipients = telegram.recipients().len(), "telegram notifications enabled");
                Arc::new(telegram.clone())
            }
            None => Arc::new(NoopNotifier),
        };

        let layout = config.sheet_layout();
        Ok(AppState {
            submissions: Arc::new(SubmissionService::new(
                tokens.clone(),
                sheets.clone(),
                notifier,
                layout.clone(),
            )),
            catalog: Arc::new(CatalogService::new(tokens, sheets, layout)),
            telegram,
        })
    }
}
