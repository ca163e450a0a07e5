//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::{Config, Credentials};
use crate::sanitize;

use super::{GenerationRequest, GenerativeClient, LlmError};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl GeminiClientConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            endpoint: config.generation.endpoint.trim_end_matches('/').to_string(),
            timeout_secs: config.generation.timeout_secs,
        }
    }
}

/// Gemini client holding one key per stage.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiClientConfig,
    credentials: Credentials,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig, credentials: Credentials) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_url(&self, api_key: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, api_key
        )
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

fn build_body(request: GenerationRequest) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user".to_string(),
            parts: vec![GeminiPart {
                text: request.prompt,
            }],
        }],
        tools: if request.grounding {
            vec![GeminiTool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        },
        generation_config: request
            .temperature
            .map(|temperature| GeminiGenerationConfig { temperature }),
    }
}

/// Joins the text parts of the first candidate. Grounded answers may be
/// split over several parts.
fn extract_text(body: &str) -> Result<String, LlmError> {
    let parsed: GeminiResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Serialization(e.to_string()))?;

    if let Some(error) = parsed.error {
        return Err(LlmError::Response(format!(
            "Gemini API error: {}",
            error.message
        )));
    }

    let text: String = parsed
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::Response("No content in response".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        let stage = request.stage;
        let api_key = self
            .credentials
            .stage_key(stage)
            .ok_or(LlmError::MissingKey(stage))?;
        let url = self.build_url(api_key.expose_secret());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!(
            "Gemini request: stage={} model={} grounding={}",
            stage, self.config.model, request.grounding
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&build_body(request))
            .send()
            .await
            .map_err(|e| LlmError::Http(sanitize::redact_api_key(&e.to_string())))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Response(format!(
                "HTTP {}: {}",
                status,
                sanitize::truncate_body(&text)
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Http(sanitize::redact_api_key(&e.to_string())))?;

        extract_text(&text)
    }
}
