//! Shared test harness: spawns the application with a mock receipt parser
//! and an in-process stub of the GSA per-diem API.

use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use expense_service::config::ExpenseConfig;
use expense_service::models::ParsedReceiptData;
use expense_service::services::providers::mock::MockReceiptParser;
use expense_service::startup::Application;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_GSA_KEY: &str = "test-gsa-key";

pub struct TestApp {
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://localhost:{}{}", self.port, path)
    }
}

/// Spawn the application on a random port with the given parser, pointing
/// the GSA client at `gsa_base_url`.
pub async fn spawn_app(parser: MockReceiptParser, gsa_base_url: &str) -> TestApp {
    // Set test environment variables (constant across tests; the per-test
    // GSA base URL is applied to the config directly to avoid races)
    std::env::set_var("ENVIRONMENT", "test");
    std::env::set_var("PORT", "0"); // Random port
    std::env::set_var("GEMINI_API_KEY", "test-gemini-key");
    std::env::set_var("GSA_API_KEY", TEST_GSA_KEY);

    let mut config = ExpenseConfig::load().expect("Failed to load config");
    config.gsa.base_url = gsa_base_url.to_string();

    let app = Application::build_with_parser(config, Arc::new(parser))
        .await
        .expect("Failed to build application");
    let port = app.port();

    // Spawn the server in the background
    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    TestApp {
        port,
        client: reqwest::Client::new(),
    }
}

/// A receipt record the mock parser can return.
pub fn sample_receipt() -> ParsedReceiptData {
    ParsedReceiptData {
        date: "2025-03-14".to_string(),
        description: "Starbucks Coffee".to_string(),
        amount: 12.5,
        category: "7585 OH Business Meals".to_string(),
    }
}

pub fn encode_image(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// How the GSA stub behaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GsaStubMode {
    Healthy,
    LocationFails,
    MealFails,
    LocationNotFound,
}

/// Spawn the GSA API stub on a random port and return its base URL.
/// Every route rejects requests that do not carry the expected `api_key`
/// query parameter, so a 200 from the stub proves key injection.
pub async fn spawn_gsa_stub(mode: GsaStubMode) -> String {
    let router = Router::new()
        .route("/rates/zip/:zip/year/:year", get(zip_rates))
        .route("/rates/city/:city/state/:state/year/:year", get(city_rates))
        .route("/rates/conus/mie/:year", get(meal_rates))
        .with_state(mode);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind GSA stub listener");
    let addr = listener.local_addr().expect("Failed to read stub address");

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    format!("http://{}", addr)
}

fn api_key_present(query: &Option<String>) -> bool {
    query
        .as_deref()
        .map(|q| q.contains(&format!("api_key={}", TEST_GSA_KEY)))
        .unwrap_or(false)
}

fn location_body(zip: &str) -> serde_json::Value {
    json!({
        "rates": [{
            "year": 2025,
            "rate": [{
                "zip": zip,
                "city": "New York",
                "county": "New York",
                "state": "NY",
                "meals": 92,
                "months": {
                    "month": [
                        {"number": 1, "short": "Jan", "long": "January", "value": 258},
                        {"number": 2, "short": "Feb", "long": "February", "value": 258}
                    ]
                }
            }]
        }]
    })
}

async fn zip_rates(
    State(mode): State<GsaStubMode>,
    Path((zip, _year)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    if !api_key_present(&query) {
        return (StatusCode::FORBIDDEN, "missing api key").into_response();
    }
    match mode {
        GsaStubMode::LocationFails => {
            (StatusCode::INTERNAL_SERVER_ERROR, "location upstream exploded").into_response()
        }
        GsaStubMode::LocationNotFound => (StatusCode::NOT_FOUND, "no rates").into_response(),
        _ => Json(location_body(&zip)).into_response(),
    }
}

async fn city_rates(
    State(mode): State<GsaStubMode>,
    Path((_city, _state, _year)): Path<(String, String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    if !api_key_present(&query) {
        return (StatusCode::FORBIDDEN, "missing api key").into_response();
    }
    match mode {
        GsaStubMode::LocationFails => {
            (StatusCode::INTERNAL_SERVER_ERROR, "location upstream exploded").into_response()
        }
        GsaStubMode::LocationNotFound => (StatusCode::NOT_FOUND, "no rates").into_response(),
        _ => Json(location_body("10001")).into_response(),
    }
}

async fn meal_rates(
    State(mode): State<GsaStubMode>,
    Path(_year): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    if !api_key_present(&query) {
        return (StatusCode::FORBIDDEN, "missing api key").into_response();
    }
    match mode {
        GsaStubMode::MealFails => {
            (StatusCode::INTERNAL_SERVER_ERROR, "meal upstream exploded").into_response()
        }
        _ => Json(json!([
            {"total": 92, "breakfast": 18, "lunch": 20, "dinner": 36, "incidental": 18}
        ]))
        .into_response(),
    }
}
