//! Browser-automation agent: natural-language tasks executed in a real
//! browser by an external agent runtime.

pub mod http;
pub mod retry;
pub mod session;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SiteLogin;

pub use http::HttpBrowserAgent;
pub use retry::{run_with_retry, RetryOutcome, RetryPolicy};
pub use session::{BrowserHandle, BrowserSession};

/// One task for the agent.
#[derive(Debug, Clone)]
pub struct AgentTask {
    pub task: String,
    pub model: String,
    pub api_key: Option<secrecy::SecretString>,
    /// Login credentials keyed by site origin. The agent substitutes them
    /// without echoing them into its transcript.
    pub sensitive_data: BTreeMap<String, SiteLogin>,
    pub use_vision: bool,
}

impl AgentTask {
    pub fn new(task: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            model: model.into(),
            api_key: None,
            sensitive_data: BTreeMap::new(),
            use_vision: true,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<secrecy::SecretString>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_login(mut self, origin: impl Into<String>, login: SiteLogin) -> Self {
        self.sensitive_data.insert(origin.into(), login);
        self
    }

    pub fn without_vision(mut self) -> Self {
        self.use_vision = false;
        self
    }
}

/// What the agent reports back after a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentTranscript {
    #[serde(default)]
    pub final_result: Option<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl AgentTranscript {
    /// Flattened form handed to the extraction prompt.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("Step {}: {}\n", i + 1, step));
        }
        for error in &self.errors {
            out.push_str(&format!("Error: {}\n", error));
        }
        if let Some(result) = &self.final_result {
            out.push_str(&format!("Final result: {}\n", result));
        }
        out
    }
}

#[async_trait]
pub trait BrowserAgent: Send + Sync {
    async fn run(
        &self,
        task: &AgentTask,
        session: &BrowserSession,
    ) -> Result<AgentTranscript, AgentError>;
}

#[async_trait]
impl BrowserAgent for Arc<dyn BrowserAgent> {
    async fn run(
        &self,
        task: &AgentTask,
        session: &BrowserSession,
    ) -> Result<AgentTranscript, AgentError> {
        (**self).run(task, session).await
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("http error: {0}")]
    Http(String),
    #[error("agent returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("agent task failed: {0}")]
    TaskFailed(String),
    #[error("invalid agent response: {0}")]
    Serialization(String),
}
