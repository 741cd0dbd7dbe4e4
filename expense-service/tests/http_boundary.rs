//! Integration tests for the cross-cutting HTTP behavior: CORS headers,
//! preflight short-circuiting, and JSON content types.
//!
//! Run with: cargo test -p expense-service --test http_boundary

mod common;

use common::{encode_image, sample_receipt, spawn_app, spawn_gsa_stub, GsaStubMode};
use expense_service::services::providers::mock::MockReceiptParser;
use reqwest::Method;
use serde_json::json;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn preflight_short_circuits_with_200_and_no_body_processing() {
    let gsa = spawn_gsa_stub(GsaStubMode::Healthy).await;
    let parser = MockReceiptParser::succeeding(sample_receipt());
    let calls = parser.call_counter();
    let app = spawn_app(parser, &gsa).await;

    let response = app
        .client
        .request(Method::OPTIONS, app.url("/api/v1/parse-receipt"))
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn responses_carry_cors_headers_and_json_content_type() {
    let gsa = spawn_gsa_stub(GsaStubMode::Healthy).await;
    let app = spawn_app(MockReceiptParser::succeeding(sample_receipt()), &gsa).await;

    // Success path
    let response = app
        .client
        .post(app.url("/api/v1/parse-receipt"))
        .header("origin", "http://localhost:5173")
        .json(&json!({"base64Image": encode_image(b"fake receipt image")}))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_some());
    assert!(response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .expect("content-type should be present")
        .starts_with("application/json"));

    // Error path keeps the same headers
    let response = app
        .client
        .get(app.url("/api/v1/perdiem?year=2025"))
        .header("origin", "http://localhost:5173")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 400);
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_some());
    assert!(response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .expect("content-type should be present")
        .starts_with("application/json"));
}
