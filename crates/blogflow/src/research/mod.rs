//! Third-party research API used by the technical pipeline.

pub mod perplexity;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use perplexity::PerplexityClient;

#[async_trait]
pub trait ResearchClient: Send + Sync {
    /// Returns research text for a single idea.
    async fn research(&self, idea: &str) -> Result<String, ResearchError>;
}

#[async_trait]
impl ResearchClient for Arc<dyn ResearchClient> {
    async fn research(&self, idea: &str) -> Result<String, ResearchError> {
        (**self).research(idea).await
    }
}

#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("http error: {0}")]
    Http(String),
    #[error("research API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("research API key not configured")]
    MissingKey,
}
