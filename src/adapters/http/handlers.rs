use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use super::response::{ApiError, CatalogResponse, SubmitResponse, TelegramTestResponse};
use super::router::AppState;
use crate::domain::incident::SubmissionForm;

/// Client address from proxy headers: first `X-Forwarded-For` hop, then `X-Real-IP`.
pub fn submitter_ip(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| header("x-real-ip"))
        .unwrap_or_default()
        .to_string()
}

pub async fn init(State(state): State<AppState>) -> Response {
    match state.catalog.load().await {
        Ok(catalog) => Json(CatalogResponse { ok: true, catalog }).into_response(),
        Err(report) => {
            error!("catalog load failed: {:?}", report);
            ApiError::from_report(StatusCode::INTERNAL_SERVER_ERROR, &report).into_response()
        }
    }
}

pub async fn submit(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let form: SubmissionForm = match serde_json::from_slice(&body) {
        Ok(form) => form,
        Err(err) => {
            warn!("rejected unparseable submission body: {}", err);
            return ApiError::new(StatusCode::BAD_REQUEST, format!("invalid JSON body: {}", err))
                .into_response();
        }
    };

    // Runs on its own task so a dropped connection does not cancel pending appends.
    let submissions = state.submissions.clone();
    let ip = submitter_ip(&headers);
    let outcome = tokio::spawn(async move { submissions.submit(form, ip).await }).await;

    match outcome {
        Err(join_error) => {
            error!("submission task did not complete: {}", join_error);
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "submission task did not complete")
                .into_response()
        }
        Ok(Ok(receipt)) => Json(SubmitResponse::from(receipt)).into_response(),
        Ok(Err(report)) => {
            let status = if report.current_context().is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                error!("submission failed: {:?}", report);
                StatusCode::INTERNAL_SERVER_ERROR
            };
            ApiError::from_report(status, &report).into_response()
        }
    }
}

pub async fn test_telegram(State(state): State<AppState>) -> Response {
    let Some(telegram) = state.telegram.as_ref() else {
        return ApiError::new(
            StatusCode::BAD_REQUEST,
            "TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_IDS is not configured",
        )
        .into_response();
    };

    let results = telegram.send_test_message().await;
    Json(TelegramTestResponse { ok: true, results }).into_response()
}

pub async fn method_not_allowed() -> Response {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response()
}

pub async fn not_found() -> Response {
    ApiError::new(StatusCode::NOT_FOUND, "not found").into_response()
}
