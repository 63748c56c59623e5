use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use error_stack::{Context, FrameKind, Report};
use serde::Serialize;

use crate::application::catalog::Catalog;
use crate::application::submission::SubmissionReceipt;
use crate::adapters::telegram::DeliveryOutcome;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
    #[serde(rename = "Response_ID")]
    pub response_id: String,
    #[serde(rename = "Tienda_ID")]
    pub store_id: String,
    /// Empty unless store resolution produced a warning.
    pub warn: String,
}

impl From<SubmissionReceipt> for SubmitResponse {
    fn from(receipt: SubmissionReceipt) -> Self {
        Self {
            ok: true,
            response_id: receipt.response_id,
            store_id: receipt.store_id,
            warn: receipt
                .warning
                .map(|warning| warning.to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub catalog: Catalog,
}

#[derive(Debug, Serialize)]
pub struct TelegramTestResponse {
    pub ok: bool,
    pub results: Vec<DeliveryOutcome>,
}

/// `{ok:false, error}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    ok: bool,
    error: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn from_report<C: Context>(status: StatusCode, report: &Report<C>) -> Self {
        Self::new(status, public_message(report))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            ok: false,
            error: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Context messages from outermost to innermost, joined by `": "`.
///
/// Attachments are diagnostics for the logs and are left out.
pub fn public_message<C: Context>(report: &Report<C>) -> String {
    let mut messages: Vec<String> = Vec::new();
    for frame in report.frames() {
        if let FrameKind::Context(context) = frame.kind() {
            let message = context.to_string();
            if messages.last() != Some(&message) {
                messages.push(message);
            }
        }
    }
    messages.join(": ")
}
