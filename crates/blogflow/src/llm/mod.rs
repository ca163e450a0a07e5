//! Generative-text service abstraction.
//!
//! Every generative stage (headline search, research, writing, idea
//! selection, transcript extraction) goes through [`GenerativeClient`].

pub mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::StageKey;

pub use gemini::{GeminiClient, GeminiClientConfig};

/// A single prompt for the generative service.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Which stage is asking; selects the API key.
    pub stage: StageKey,
    pub prompt: String,
    /// `None` keeps the model default.
    pub temperature: Option<f32>,
    /// Enables the search grounding tool.
    pub grounding: bool,
}

impl GenerationRequest {
    pub fn new(stage: StageKey, prompt: impl Into<String>) -> Self {
        Self {
            stage,
            prompt: prompt.into(),
            temperature: None,
            grounding: false,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn grounded(mut self) -> Self {
        self.grounding = true;
        self
    }
}

#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError>;
}

#[async_trait]
impl GenerativeClient for Arc<dyn GenerativeClient> {
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        (**self).generate(request).await
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(String),
    #[error("response error: {0}")]
    Response(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("no API key configured for the {0} stage")]
    MissingKey(StageKey),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new(StageKey::Fetch, "find news")
            .with_temperature(Some(0.7))
            .grounded();
        assert_eq!(request.prompt, "find news");
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.grounding);

        let plain = GenerationRequest::new(StageKey::Write, "write");
        assert!(plain.temperature.is_none());
        assert!(!plain.grounding);
    }

    #[test]
    fn test_missing_key_message_names_stage() {
        let err = LlmError::MissingKey(StageKey::Publish);
        assert_eq!(err.to_string(), "no API key configured for the publish stage");
    }
}
