use serde::{Deserialize, Serialize};

/// Model used by every generative stage unless overridden.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Topic categories offered by the dashboard.
pub const DEFAULT_TOPICS: &[&str] = &[
    "Artificial Intelligence",
    "Stock Market",
    "Technology",
    "Crypto",
    "Space Exploration",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
    #[serde(default = "default_topic")]
    pub default_topic: String,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub research: ResearchConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            model: default_model(),
            topics: default_topics(),
            default_topic: default_topic(),
            retry: RetryConfig::default(),
            generation: GenerationConfig::default(),
            research: ResearchConfig::default(),
            agent: AgentConfig::default(),
            publish: PublishConfig::default(),
            scrape: ScrapeConfig::default(),
            credentials: CredentialsConfig::default(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_topics() -> Vec<String> {
    DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect()
}

fn default_topic() -> String {
    DEFAULT_TOPICS[0].to_string()
}

/// Bounded re-invocation policy for browser-automation stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_fetch_temperature")]
    pub fetch_temperature: f32,
    #[serde(default = "default_research_temperature")]
    pub research_temperature: f32,
    /// `None` leaves the model's own default in place.
    #[serde(default)]
    pub write_temperature: Option<f32>,
}

fn default_generation_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_generation_timeout() -> u64 {
    120
}

fn default_fetch_temperature() -> f32 {
    0.7
}

fn default_research_temperature() -> f32 {
    0.3
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_generation_endpoint(),
            timeout_secs: default_generation_timeout(),
            fetch_temperature: default_fetch_temperature(),
            research_temperature: default_research_temperature(),
            write_temperature: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default = "default_research_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_research_model")]
    pub model: String,
    #[serde(default = "default_research_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_research_api_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default)]
    pub presence_penalty: f32,
    #[serde(default = "default_frequency_penalty")]
    pub frequency_penalty: f32,
    #[serde(default = "default_research_timeout")]
    pub timeout_secs: u64,
}

fn default_research_endpoint() -> String {
    "https://api.perplexity.ai/chat/completions".to_string()
}

fn default_research_model() -> String {
    "sonar".to_string()
}

fn default_research_max_tokens() -> u32 {
    500
}

fn default_research_api_temperature() -> f32 {
    0.2
}

fn default_top_p() -> f32 {
    0.9
}

fn default_frequency_penalty() -> f32 {
    1.0
}

fn default_research_timeout() -> u64 {
    90
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_research_endpoint(),
            model: default_research_model(),
            max_tokens: default_research_max_tokens(),
            temperature: default_research_api_temperature(),
            top_p: default_top_p(),
            presence_penalty: 0.0,
            frequency_penalty: default_frequency_penalty(),
            timeout_secs: default_research_timeout(),
        }
    }
}

/// Connection settings for the browser-agent sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_endpoint")]
    pub endpoint: String,
    /// Model driving the agent; falls back to [`Config::model`].
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub headless: bool,
    #[serde(default)]
    pub executable_path: Option<String>,
    /// Browser profile directory, so site logins survive between runs.
    #[serde(default)]
    pub user_data_dir: Option<String>,
    #[serde(default = "default_agent_timeout")]
    pub timeout_secs: u64,
}

fn default_agent_endpoint() -> String {
    "http://127.0.0.1:8765".to_string()
}

fn default_agent_timeout() -> u64 {
    600
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_agent_endpoint(),
            model: None,
            headless: false,
            executable_path: None,
            user_data_dir: None,
            timeout_secs: default_agent_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Editor page used by the standard pipeline.
    #[serde(default = "default_standard_url")]
    pub standard_url: String,
    /// Site the technical pipeline drafts on (login required).
    #[serde(default = "default_technical_url")]
    pub technical_url: String,
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,
    #[serde(default)]
    pub login: LoginConfig,
}

fn default_standard_url() -> String {
    "https://medium.com/new-story".to_string()
}

fn default_technical_url() -> String {
    "https://dev.to/".to_string()
}

fn default_allowed_domains() -> Vec<String> {
    vec!["https://dev.to/".to_string()]
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            standard_url: default_standard_url(),
            technical_url: default_technical_url(),
            allowed_domains: default_allowed_domains(),
            login: LoginConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    #[serde(default = "default_email_source")]
    pub email: SecretSource,
    #[serde(default = "default_password_source")]
    pub password: SecretSource,
}

fn default_email_source() -> SecretSource {
    SecretSource::env("PUBLISH_EMAIL")
}

fn default_password_source() -> SecretSource {
    SecretSource::env("PUBLISH_PASSWORD")
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            email: default_email_source(),
            password: default_password_source(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Natural-language task handed to the browser agent to collect ideas.
    #[serde(default = "default_scrape_task")]
    pub task: String,
}

fn default_scrape_task() -> String {
    "go to https://dev.to/ and then search for AI Agents in the search bar and press enter and then print the title".to_string()
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            task: default_scrape_task(),
        }
    }
}

/// Where a secret comes from: a direct value, a file, or an environment
/// variable, tried in that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
}

impl SecretSource {
    pub fn env(name: &str) -> Self {
        Self {
            value: None,
            file: None,
            env_var: Some(name.to_string()),
        }
    }
}

/// Per-stage API key sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default = "default_key_source")]
    pub default_key: SecretSource,
    #[serde(default = "default_fetch_key")]
    pub fetch_key: SecretSource,
    #[serde(default = "default_research_key")]
    pub research_key: SecretSource,
    #[serde(default = "default_write_key")]
    pub write_key: SecretSource,
    #[serde(default = "default_publish_key")]
    pub publish_key: SecretSource,
    #[serde(default = "default_research_api_key")]
    pub research_api_key: SecretSource,
}

fn default_key_source() -> SecretSource {
    SecretSource::env("GOOGLE_API_KEY")
}

fn default_fetch_key() -> SecretSource {
    SecretSource::env("GOOGLE_API_KEY_FETCH")
}

fn default_research_key() -> SecretSource {
    SecretSource::env("GOOGLE_API_KEY_RESEARCH")
}

fn default_write_key() -> SecretSource {
    SecretSource::env("GOOGLE_API_KEY_WRITE")
}

fn default_publish_key() -> SecretSource {
    SecretSource::env("GOOGLE_API_KEY_PUBLISH")
}

fn default_research_api_key() -> SecretSource {
    SecretSource::env("PERPLEXITY_API_KEY")
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            default_key: default_key_source(),
            fetch_key: default_fetch_key(),
            research_key: default_research_key(),
            write_key: default_write_key(),
            publish_key: default_publish_key(),
            research_api_key: default_research_api_key(),
        }
    }
}

impl Config {
    /// Model the browser agent should drive with.
    pub fn agent_model(&self) -> &str {
        self.agent.model.as_deref().unwrap_or(&self.model)
    }
}
