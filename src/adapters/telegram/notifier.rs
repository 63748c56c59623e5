use std::fmt;
use std::sync::Arc;

use error_stack::{report, Result, ResultExt};
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{event, Level};

use super::message::{build_message, TEST_MESSAGE};
use crate::domain::row::PersistedRow;
use crate::ports::notifier::Notifier;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelegramError {
    #[error("sendMessage request failed")]
    Transport,
    #[error("sendMessage responded {0}")]
    Status(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Delivered,
    Failed,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

/// Splits a comma-separated recipient list, dropping blank entries.
pub fn parse_recipients(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|chat_id| !chat_id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Multicasts messages to every configured chat through the Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    api_url: String,
    bot_token: String,
    chat_ids: Vec<String>,
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_url", &self.inner.api_url)
            .field("bot_token", &"<redacted>")
            .field("chat_ids", &self.inner.chat_ids)
            .finish()
    }
}

impl TelegramNotifier {
    /// Returns `None` unless both a bot token and at least one recipient are present.
    pub fn new(
        http: Client,
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_ids: Vec<String>,
    ) -> Option<Self> {
        let bot_token = bot_token.into();
        if bot_token.trim().is_empty() || chat_ids.is_empty() {
            return None;
        }
        Some(Self {
            inner: Arc::new(Inner {
                http,
                api_url: api_url.into().trim_end_matches('/').to_string(),
                bot_token,
                chat_ids,
            }),
        })
    }

    pub fn recipients(&self) -> &[String] {
        &self.inner.chat_ids
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.inner.api_url, self.inner.bot_token)
    }

    async fn send_to(&self, chat_id: &str, text: &str, parse_mode: Option<&str>) -> Result<(), TelegramError> {
        let response = self
            .inner
            .http
            .post(self.send_message_url())
            .json(&SendMessage {
                chat_id,
                text,
                parse_mode,
            })
            .send()
            .await
            .change_context(TelegramError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(report!(TelegramError::Status(status.as_u16())).attach_printable(body));
        }
        Ok(())
    }

    /// Sends `text` to every recipient concurrently; one outcome per recipient, in order.
    pub async fn deliver(&self, text: &str, parse_mode: Option<&str>) -> Vec<DeliveryOutcome> {
        let sends = self
            .inner
            .chat_ids
            .iter()
            .map(|chat_id| self.send_to(chat_id, text, parse_mode));

        join_all(sends)
            .await
            .into_iter()
            .zip(&self.inner.chat_ids)
            .map(|(result, chat_id)| match result {
                Ok(()) => DeliveryOutcome::Delivered,
                Err(error) => {
                    event!(Level::WARN, chat_id = %chat_id, "telegram delivery failed: {:?}", error);
                    DeliveryOutcome::Failed
                }
            })
            .collect()
    }

    pub async fn send_test_message(&self) -> Vec<DeliveryOutcome> {
        self.deliver(TEST_MESSAGE, None).await
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, row: &PersistedRow) {
        let text = build_message(row);
        let notifier = self.clone();
        let response_id = row.response_id.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let outcomes = notifier.deliver(&text, Some("HTML")).await;
                    let delivered = outcomes
                        .iter()
                        .filter(|outcome| **outcome == DeliveryOutcome::Delivered)
                        .count();
                    event!(
                        Level::DEBUG,
                        response_id = %response_id,
                        delivered,
                        total = outcomes.len(),
                        "telegram notification finished"
                    );
                });
            }
            Err(_) => {
                event!(Level::WARN, "no async runtime; telegram notification dropped");
            }
        }
    }
}
