//! Gemini API client.
//!
//! Sends a prepared [`AnalysisRequest`] to the `generateContent`
//! endpoint with a structured-output schema and returns the validated
//! [`AnalysisResult`]. All configuration (endpoint, credential, model,
//! timeout) is injected at construction; nothing is read from the
//! environment here.

use crate::analyst::request::AnalysisRequest;
use crate::analyst::response::parse_response;
use crate::error::{InsightError, Result};
use crate::models::AnalysisResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Default Gemini API base URL.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (overridable for proxies and tests).
    pub api_base: String,
    /// API key. Checked for presence before any request is sent.
    pub api_key: String,
    /// Model name, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Request timeout in seconds. No retries are performed.
    pub timeout_seconds: u64,
}

/// `generateContent` request body.
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

/// `generateContent` response body. Only the fields we consume.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Client for the external analysis service.
#[derive(Debug)]
pub struct GeminiClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new client.
    ///
    /// Fails when the API key is absent; this is checked before any
    /// request is ever constructed.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(InsightError::Analysis("API Key not found".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| InsightError::Unexpected(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Send the analysis request and validate the response.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        info!("Requesting analysis from model {}", self.config.model);

        let text = self.generate_content(request).await?;
        debug!("Received {} bytes of analysis payload", text.len());

        parse_response(&text)
    }

    /// Call `generateContent` and extract the text payload.
    async fn generate_content(&self, request: &AnalysisRequest) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.api_base, self.config.model, self.config.api_key
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: "application/json".to_string(),
                response_schema: request.schema.clone(),
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InsightError::Analysis(format!(
                        "Request timed out after {}s",
                        self.config.timeout_seconds
                    ))
                } else if e.is_connect() {
                    InsightError::Analysis(format!(
                        "Cannot connect to analysis service at {}",
                        self.config.api_base
                    ))
                } else {
                    InsightError::Analysis(format!("Failed to send request: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Analysis(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| InsightError::Analysis(format!("Failed to parse API envelope: {}", e)))?;

        extract_text(payload)
    }
}

/// Pull the generated text out of the response envelope.
fn extract_text(payload: GenerateContentResponse) -> Result<String> {
    payload
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| InsightError::Analysis("No response from model".to_string()))
}
