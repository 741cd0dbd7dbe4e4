//! Mock receipt parser for testing.

use super::{ProviderError, ReceiptParser};
use crate::models::ParsedReceiptData;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock receipt parser returning a canned success or failure, and counting
/// how many times it was called so tests can assert no upstream call was
/// attempted.
pub struct MockReceiptParser {
    response: Option<ParsedReceiptData>,
    error: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockReceiptParser {
    pub fn succeeding(data: ParsedReceiptData) -> Self {
        Self {
            response: Some(data),
            error: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: None,
            error: Some(message.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter; clone before handing the parser to the app.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl ReceiptParser for MockReceiptParser {
    async fn parse(&self, _image: &[u8]) -> Result<ParsedReceiptData, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match (&self.response, &self.error) {
            (Some(data), _) => Ok(data.clone()),
            (None, Some(message)) => Err(ProviderError::ApiError(message.clone())),
            (None, None) => Err(ProviderError::NotConfigured(
                "Mock receipt parser not configured".to_string(),
            )),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.response.is_some() {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock receipt parser not configured".to_string(),
            ))
        }
    }
}
