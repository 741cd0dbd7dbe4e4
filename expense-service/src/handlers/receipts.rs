//! Receipt parsing endpoint.

use crate::models::{ParseReceiptRequest, ParseReceiptResponse};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use base64::Engine;
use service_core::error::AppError;

/// `POST /api/v1/parse-receipt`
///
/// Decodes the base64 image and forwards it to the receipt-parsing
/// gateway. Client faults (bad JSON, missing field, bad base64) are
/// rejected before any external call. Gateway failures still produce a
/// well-typed envelope: HTTP 400 with the fallback record and the error
/// as `message`.
pub async fn parse_receipt(
    State(state): State<AppState>,
    payload: Result<Json<ParseReceiptRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid request body: {}", e)))?;

    if request.base64_image.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Missing 'base64Image' in request"
        )));
    }

    let image_bytes = base64::engine::general_purpose::STANDARD
        .decode(request.base64_image.as_bytes())
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Cannot decode base64")))?;

    match state.receipt_parser.parse(&image_bytes).await {
        Ok(data) => Ok((StatusCode::OK, Json(ParseReceiptResponse::success(data)))),
        Err(e) => {
            tracing::warn!(error = %e, "Receipt parsing failed, returning fallback record");
            Ok((
                StatusCode::BAD_REQUEST,
                Json(ParseReceiptResponse::error(e.to_string())),
            ))
        }
    }
}
