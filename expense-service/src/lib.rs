pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    middleware::from_fn,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::tracing::request_id_middleware;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::providers::ReceiptParser;
use crate::services::GsaClient;

/// Shared application state: read-only configuration and the two
/// external-service gateways. Cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: config::ExpenseConfig,
    pub receipt_parser: Arc<dyn ReceiptParser>,
    pub gsa: GsaClient,
}

/// Health check endpoint for liveness probes.
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "expense-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness probe: verifies the receipt-parsing gateway is reachable
/// and configured before reporting ready.
async fn readiness_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    if let Err(e) = state.receipt_parser.health_check().await {
        tracing::warn!(error = %e, "Receipt parser readiness check failed");
        return Err(AppError::ServiceUnavailable);
    }
    Ok(Json(json!({"status": "ready"})))
}

// Wrong-method fallbacks so 405s render the JSON error body like every
// other failure path
async fn only_post() -> AppError {
    AppError::MethodNotAllowed("Only POST method is allowed".to_string())
}

async fn only_get() -> AppError {
    AppError::MethodNotAllowed("Only GET method is allowed".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route(
            "/api/v1/parse-receipt",
            post(handlers::receipts::parse_receipt).fallback(only_post),
        )
        .route(
            "/api/v1/perdiem",
            get(handlers::per_diem::per_diem).fallback(only_get),
        )
        .with_state(state)
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Permissive CORS: any origin, preflight short-circuits before the
        // handlers run
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::OPTIONS,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([
                    header::ACCEPT,
                    header::ACCEPT_ENCODING,
                    header::AUTHORIZATION,
                    header::CONTENT_LENGTH,
                    header::CONTENT_TYPE,
                    HeaderName::from_static("x-csrf-token"),
                ]),
        )
}
