use std::sync::Arc;

use axum::extract::Request;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN,
    VARY,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use super::handlers;
use crate::adapters::telegram::TelegramNotifier;
use crate::application::catalog::CatalogService;
use crate::application::submission::SubmissionService;

#[derive(Clone)]
pub struct AppState {
    pub submissions: Arc<SubmissionService>,
    pub catalog: Arc<CatalogService>,
    /// `None` when chat notifications are not configured.
    pub telegram: Option<TelegramNotifier>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/init",
            get(handlers::init).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/submit",
            axum::routing::post(handlers::submit).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/test-telegram",
            get(handlers::test_telegram)
                .post(handlers::test_telegram)
                .fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// Answers preflight requests and stamps CORS headers on every response.
pub async fn cors(request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"));

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(VARY, HeaderValue::from_static("Origin"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}
