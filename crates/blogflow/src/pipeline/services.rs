use std::sync::Arc;

use crate::browser::{BrowserAgent, HttpBrowserAgent};
use crate::config::{Config, Credentials};
use crate::error::BlogflowError;
use crate::llm::{GeminiClient, GeminiClientConfig, GenerativeClient};
use crate::research::{PerplexityClient, ResearchClient};

/// External services the stages call.
#[derive(Clone)]
pub struct Services {
    pub generator: Arc<dyn GenerativeClient>,
    pub researcher: Arc<dyn ResearchClient>,
    pub agent: Arc<dyn BrowserAgent>,
    pub credentials: Credentials,
}

impl Services {
    /// Production constructor: Gemini, Perplexity and the HTTP agent sidecar.
    pub fn from_config(config: &Config, credentials: Credentials) -> Result<Self, BlogflowError> {
        let generator =
            GeminiClient::new(GeminiClientConfig::from_config(config), credentials.clone())?;
        let researcher =
            PerplexityClient::new(config.research.clone(), credentials.research_api.clone())?;
        let agent = HttpBrowserAgent::new(&config.agent)?;

        Ok(Self {
            generator: Arc::new(generator),
            researcher: Arc::new(researcher),
            agent: Arc::new(agent),
            credentials,
        })
    }
}
