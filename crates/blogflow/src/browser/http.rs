//! Client for an agent sidecar exposing `POST /runs`.
//!
//! The sidecar owns the actual browser; this side only describes the task,
//! the model to drive it with, and the browser settings.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::AgentConfig;
use crate::sanitize;

use super::{AgentError, AgentTask, AgentTranscript, BrowserAgent, BrowserSession};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpBrowserAgent {
    client: reqwest::Client,
    runs_url: String,
}

impl HttpBrowserAgent {
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            runs_url: format!("{}/runs", config.endpoint.trim_end_matches('/')),
        })
    }
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    task: &'a str,
    llm: LlmSettings<'a>,
    browser: BrowserSettings<'a>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    sensitive_data: BTreeMap<&'a str, Credentials<'a>>,
    use_vision: bool,
}

#[derive(Debug, Serialize)]
struct LlmSettings<'a> {
    provider: &'static str,
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct BrowserSettings<'a> {
    session_id: &'a str,
    headless: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_domains: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_data_dir: Option<&'a PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    executable_path: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    success: bool,
    #[serde(flatten)]
    transcript: AgentTranscript,
}

fn build_request<'a>(task: &'a AgentTask, session: &'a BrowserSession) -> RunRequest<'a> {
    RunRequest {
        task: &task.task,
        llm: LlmSettings {
            provider: "google",
            model: &task.model,
            api_key: task.api_key.as_ref().map(|k| k.expose_secret()),
        },
        browser: BrowserSettings {
            session_id: &session.id,
            headless: session.headless,
            allowed_domains: Some(session.allowed_domains.as_slice())
                .filter(|domains| !domains.is_empty()),
            user_data_dir: session.user_data_dir.as_ref(),
            executable_path: session.executable_path.as_deref(),
        },
        sensitive_data: task
            .sensitive_data
            .iter()
            .map(|(origin, login)| {
                (
                    origin.as_str(),
                    Credentials {
                        email: login.email.expose_secret(),
                        password: login.password.expose_secret(),
                    },
                )
            })
            .collect(),
        use_vision: task.use_vision,
    }
}

fn parse_response(body: &str) -> Result<AgentTranscript, AgentError> {
    let parsed: RunResponse =
        serde_json::from_str(body).map_err(|e| AgentError::Serialization(e.to_string()))?;

    if !parsed.success {
        let reason = if parsed.transcript.errors.is_empty() {
            "agent reported failure without details".to_string()
        } else {
            parsed.transcript.errors.join("; ")
        };
        return Err(AgentError::TaskFailed(reason));
    }
    Ok(parsed.transcript)
}

#[async_trait]
impl BrowserAgent for HttpBrowserAgent {
    async fn run(
        &self,
        task: &AgentTask,
        session: &BrowserSession,
    ) -> Result<AgentTranscript, AgentError> {
        info!("Starting browser agent run in session {}", session.id);
        debug!("Agent task: {}", sanitize::short_label(&task.task));

        let response = self
            .client
            .post(&self.runs_url)
            .json(&build_request(task, session))
            .send()
            .await
            .map_err(|e| AgentError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(AgentError::Status {
                status: status.as_u16(),
                body: sanitize::truncate_body(&body),
            });
        }

        let transcript = parse_response(&body)?;
        info!(
            "Browser agent finished after {} steps",
            transcript.steps.len()
        );
        Ok(transcript)
    }
}
