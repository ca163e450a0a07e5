use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlogflowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Session error: {0}")]
    Session(#[from] crate::session::SessionError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("Generative client error: {0}")]
    Llm(#[from] crate::llm::LlmError),

    #[error("Research client error: {0}")]
    Research(#[from] crate::research::ResearchError),

    #[error("Browser agent error: {0}")]
    Agent(#[from] crate::browser::AgentError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid URL for '{field}': {value}")]
    InvalidUrl { field: String, value: String },
}

pub type Result<T> = std::result::Result<T, BlogflowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::AgentError;
    use crate::config::StageKey;
    use crate::llm::LlmError;
    use crate::research::ResearchError;

    #[test]
    fn test_client_errors_keep_their_type() {
        let err: BlogflowError = LlmError::MissingKey(StageKey::Write).into();
        assert!(matches!(err, BlogflowError::Llm(LlmError::MissingKey(StageKey::Write))));
        assert_eq!(
            err.to_string(),
            "Generative client error: no API key configured for the write stage"
        );

        let err: BlogflowError = ResearchError::MissingKey.into();
        assert!(matches!(err, BlogflowError::Research(ResearchError::MissingKey)));

        let err: BlogflowError = AgentError::Http("builder".to_string()).into();
        assert!(matches!(err, BlogflowError::Agent(AgentError::Http(_))));
    }
}
