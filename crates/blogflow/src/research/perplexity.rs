use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::ResearchConfig;
use crate::sanitize;

use super::{ResearchClient, ResearchError};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const SYSTEM_PROMPT: &str = "Be precise and concise.";

pub struct PerplexityClient {
    client: reqwest::Client,
    config: ResearchConfig,
    api_key: Option<SecretString>,
}

impl PerplexityClient {
    pub fn new(config: ResearchConfig, api_key: Option<SecretString>) -> Result<Self, ResearchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ResearchError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_images: bool,
    return_related_questions: bool,
    stream: bool,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

fn build_payload<'a>(config: &'a ResearchConfig, idea: &str) -> ChatRequest<'a> {
    ChatRequest {
        model: &config.model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: format!("Provide in-depth research on the following topic: {}", idea),
            },
        ],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        top_p: config.top_p,
        return_images: false,
        return_related_questions: false,
        stream: false,
        presence_penalty: config.presence_penalty,
        frequency_penalty: config.frequency_penalty,
    }
}

/// Pulls `choices[0].message.content`; any other 2xx body is returned as-is.
fn extract_content(body: String) -> String {
    match serde_json::from_str::<ChatResponse>(&body) {
        Ok(parsed) => match parsed.choices.into_iter().next() {
            Some(choice) => choice.message.content,
            None => body,
        },
        Err(e) => {
            debug!("Research response not in chat format, using raw body: {}", e);
            body
        }
    }
}

#[async_trait]
impl ResearchClient for PerplexityClient {
    async fn research(&self, idea: &str) -> Result<String, ResearchError> {
        let api_key = self.api_key.as_ref().ok_or(ResearchError::MissingKey)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| ResearchError::Http(format!("Invalid API key header: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);

        let response = self
            .client
            .post(&self.config.endpoint)
            .headers(headers)
            .json(&build_payload(&self.config, idea))
            .send()
            .await
            .map_err(|e| ResearchError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ResearchError::Http(e.to_string()))?;

        if !status.is_success() {
            warn!("Research API returned {}", status);
            return Err(ResearchError::Status {
                status: status.as_u16(),
                body: sanitize::truncate_body(&body),
            });
        }

        Ok(extract_content(body))
    }
}
