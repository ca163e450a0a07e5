pub mod credentials;
pub mod loader;
pub mod schema;

pub use credentials::{Credentials, SiteLogin, StageKey};
pub use loader::{default_config_path, load_config, load_config_from_str, load_config_or_default};
pub use schema::{
    AgentConfig, Config, CredentialsConfig, GenerationConfig, LoginConfig, PublishConfig,
    ResearchConfig, RetryConfig, ScrapeConfig, SecretSource, DEFAULT_MODEL, DEFAULT_TOPICS,
};
