pub mod browser;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod research;
pub mod sanitize;
pub mod secrets;
pub mod session;
pub mod telemetry;

pub use browser::{BrowserAgent, BrowserHandle, BrowserSession, HttpBrowserAgent};
pub use config::{load_config, load_config_or_default, Config, Credentials, StageKey};
pub use error::{BlogflowError, ConfigError, Result};
pub use llm::{GeminiClient, GenerativeClient};
pub use pipeline::{
    PipelineConfig, PipelineError, ProgressReporter, Services, StageOutput, StandardPipeline,
    StandardState, TechnicalPipeline, TechnicalState,
};
pub use research::{PerplexityClient, ResearchClient};
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError};
pub use session::{DashboardSession, SessionStore};
pub use telemetry::{init_logging, LogFormat};
