//! Gemini receipt-parsing provider.
//!
//! Sends the receipt image inline with a fixed instructional prompt and a
//! JSON-schema response constraint, then decodes the structured reply.

use super::{ProviderError, ReceiptParser};
use crate::models::{ParsedReceiptData, EXPENSE_CATEGORIES};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Receipts arrive as JPEG scans from the frontend uploader.
const RECEIPT_MIME_TYPE: &str = "image/jpeg";

const RECEIPT_PROMPT: &str = "Analyze the provided receipt image. Extract the transaction date, \
    a short description of the vendor, the total amount, and select the best category from the \
    list. If it is a grocery receipt it's probably 9080 Employee Morale. The default category \
    should be '8190 G&A Office supplies' if unsure.";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

/// Gemini receipt parser.
pub struct GeminiReceiptParser {
    config: GeminiConfig,
    client: Client,
}

impl GeminiReceiptParser {
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            GEMINI_API_BASE, self.config.model, method, self.config.api_key
        )
    }

    /// Response schema constraining the model's output to the receipt
    /// record shape, with `category` restricted to the fixed code list.
    /// The enum is advisory to the model; the returned value is not
    /// re-checked against it.
    fn receipt_schema() -> serde_json::Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "date": {
                    "type": "STRING",
                    "description": "The date of the transaction in 'YYYY-MM-DD' format. If the year is not present, assume the current year."
                },
                "description": {
                    "type": "STRING",
                    "description": "A concise description of the vendor or purchase (e.g., 'Starbucks Coffee', 'Uber Ride', 'Walmart')."
                },
                "amount": {
                    "type": "NUMBER",
                    "description": "The final total amount as a number, without currency symbols or commas."
                },
                "category": {
                    "type": "STRING",
                    "description": "Based on the vendor and items, choose the most appropriate category from the provided list.",
                    "enum": EXPENSE_CATEGORIES
                }
            },
            "required": ["date", "description", "amount", "category"]
        })
    }

    fn build_request(&self, image: &[u8]) -> GenerateContentRequest {
        let parts = vec![
            ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: RECEIPT_MIME_TYPE.to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(image),
                },
            },
            ContentPart::Text {
                text: RECEIPT_PROMPT.to_string(),
            },
        ];

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(Self::receipt_schema()),
            }),
        }
    }
}

#[async_trait]
impl ReceiptParser for GeminiReceiptParser {
    async fn parse(&self, image: &[u8]) -> Result<ParsedReceiptData, ProviderError> {
        let request = self.build_request(image);
        let url = self.api_url("generateContent");

        tracing::debug!(
            model = %self.config.model,
            image_bytes = image.len(),
            "Sending receipt to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        if let Some(candidate) = api_response.candidates.first() {
            if candidate.finish_reason.as_deref() == Some("SAFETY") {
                return Err(ProviderError::ContentFiltered);
            }
        }

        let text = api_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| match p {
                ContentPart::Text { text } => Some(text.clone()),
                _ => None,
            })
            .ok_or_else(|| {
                ProviderError::InvalidResponse("Gemini returned no text candidate".to_string())
            })?;

        let parsed: ParsedReceiptData = serde_json::from_str(&text).map_err(|e| {
            ProviderError::InvalidResponse(format!("Gemini returned malformed receipt JSON: {}", e))
        })?;

        tracing::debug!(
            amount = parsed.amount,
            category = %parsed.category,
            date = %parsed.date,
            "Parsed receipt"
        );

        Ok(parsed)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        // Try to list models to verify API key works
        let url = format!("{}/models?key={}", GEMINI_API_BASE, self.config.api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> GeminiReceiptParser {
        GeminiReceiptParser::new(GeminiConfig {
            api_key: "test-key".to_string(),
            model: "gemini-2.5-flash".to_string(),
        })
    }

    #[test]
    fn schema_constrains_category_to_the_sixteen_codes() {
        let schema = GeminiReceiptParser::receipt_schema();
        let categories = schema["properties"]["category"]["enum"]
            .as_array()
            .expect("enum should be an array");
        assert_eq!(categories.len(), 16);
        assert_eq!(schema["required"].as_array().map(|r| r.len()), Some(4));
    }

    #[test]
    fn request_carries_inline_image_and_json_constraint() {
        let request = parser().build_request(b"fake image bytes");
        let json = serde_json::to_value(&request).expect("should serialize");

        let parts = json["contents"][0]["parts"]
            .as_array()
            .expect("parts should be an array");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inline_data"]["mimeType"], "image/jpeg");
        assert_eq!(
            parts[0]["inline_data"]["data"],
            base64::engine::general_purpose::STANDARD.encode(b"fake image bytes")
        );
        assert!(parts[1]["text"]
            .as_str()
            .expect("prompt should be text")
            .contains("receipt image"));

        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn api_url_embeds_model_and_key() {
        let url = parser().api_url("generateContent");
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent?key=test-key"
        );
    }
}
