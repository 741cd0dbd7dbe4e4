//! Receipt-parsing provider abstraction.
//!
//! A trait-based seam over the generative-AI backend so the HTTP layer
//! and tests can swap the real Gemini client for a mock.

pub mod gemini;
pub mod mock;

use crate::models::ParsedReceiptData;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Trait for receipt-parsing providers (e.g., Gemini).
#[async_trait]
pub trait ReceiptParser: Send + Sync {
    /// Extract structured receipt data from raw image bytes.
    async fn parse(&self, image: &[u8]) -> Result<ParsedReceiptData, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
