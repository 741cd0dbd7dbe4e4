//! Per-diem rates endpoint.

use crate::models::{PerDiemQuery, PerDiemRates};
use crate::services::RateLocation;
use crate::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use service_core::error::AppError;

/// `GET /api/v1/perdiem?zip_code=..&year=..` (or `city`/`state`/`year`)
///
/// Fans out to the GSA location and M&IE endpoints and returns the
/// combined envelope. An unknown location maps to 404; any other upstream
/// failure to 502, naming which fetch failed.
pub async fn per_diem(
    State(state): State<AppState>,
    query: Result<Query<PerDiemQuery>, QueryRejection>,
) -> Result<Json<PerDiemRates>, AppError> {
    let Query(query) = query
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid query parameters: {}", e)))?;

    let location = RateLocation::from_query(&query).ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!(
            "A valid location (City/State or ZIP Code) is required."
        ))
    })?;

    let rates = state
        .gsa
        .fetch_per_diem(&location, query.year)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, year = query.year, "GSA per-diem fetch failed");
            if e.is_not_found() {
                AppError::NotFound(anyhow::anyhow!(
                    "Could not find rates for this location. Please check spelling or try a ZIP code."
                ))
            } else {
                AppError::BadGateway(e.to_string())
            }
        })?;

    Ok(Json(rates))
}
