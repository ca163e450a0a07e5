use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

/// File name looked up inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// `<config dir>/blogflow/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("blogflow").join(CONFIG_FILE_NAME))
}

/// Loads `path` when given, otherwise the default location when it exists,
/// otherwise the built-in defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }

    match default_config_path() {
        Some(default_path) if default_path.exists() => load_config(default_path),
        _ => Ok(Config::default()),
    }
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();

    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.retry.max_attempts == 0 {
        return Err(ConfigError::Validation {
            message: "retry.max_attempts must be at least 1".to_string(),
        });
    }

    if !config.topics.is_empty() && !config.topics.contains(&config.default_topic) {
        return Err(ConfigError::Validation {
            message: format!(
                "default_topic '{}' is not one of the configured topics",
                config.default_topic
            ),
        });
    }

    let urls = [
        ("generation.endpoint", &config.generation.endpoint),
        ("research.endpoint", &config.research.endpoint),
        ("agent.endpoint", &config.agent.endpoint),
        ("publish.standard_url", &config.publish.standard_url),
        ("publish.technical_url", &config.publish.technical_url),
    ];
    for (field, value) in urls {
        validate_http_url(field, value)?;
    }

    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    match reqwest::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_minimal_config_uses_defaults() {
        let config = load_config_from_str(r#"{ "version": "1.0" }"#).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff_ms, 0);
        assert_eq!(config.research.model, "sonar");
        assert_eq!(config.research.max_tokens, 500);
        assert_eq!(config.default_topic, "Artificial Intelligence");
        assert_eq!(config.topics.len(), 5);
        assert_eq!(
            config.credentials.default_key.env_var.as_deref(),
            Some("GOOGLE_API_KEY")
        );
    }

    #[test]
    fn test_load_config_with_overrides() {
        let config_json = r#"
        {
            "version": "1.0",
            "model": "gemini-2.0-flash-exp",
            "topics": ["Rust", "Databases"],
            "default_topic": "Rust",
            "retry": { "max_attempts": 5, "backoff_ms": 250 },
            "agent": { "endpoint": "http://localhost:9000", "headless": true },
            "publish": { "technical_url": "https://dev.to/" },
            "credentials": {
                "default_key": { "file": "/run/secrets/gemini" }
            }
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.model, "gemini-2.0-flash-exp");
        assert_eq!(config.default_topic, "Rust");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff_ms, 250);
        assert!(config.agent.headless);
        assert_eq!(config.agent_model(), "gemini-2.0-flash-exp");
        assert_eq!(
            config.credentials.default_key.file.as_deref(),
            Some("/run/secrets/gemini")
        );
        assert!(config.credentials.default_key.env_var.is_none());
    }

    #[test]
    fn test_unknown_field_rejected_by_schema() {
        let result = load_config_from_str(r#"{ "version": "1.0", "colour": "blue" }"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_zero_retry_attempts_rejected() {
        let result =
            load_config_from_str(r#"{ "version": "1.0", "retry": { "max_attempts": 0 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let result = load_config_from_str(r#"{ "version": "2.0" }"#);
        match result {
            Err(ConfigError::Validation { message }) => {
                assert!(message.contains("Unsupported config version"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_topic_must_be_listed() {
        let result = load_config_from_str(
            r#"{ "version": "1.0", "topics": ["Rust"], "default_topic": "Go" }"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        let result = load_config_from_str(
            r#"{ "version": "1.0", "agent": { "endpoint": "ftp://agent.local" } }"#,
        );
        match result {
            Err(ConfigError::InvalidUrl { field, .. }) => assert_eq!(field, "agent.endpoint"),
            other => panic!("expected invalid url, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_reports_parse_error() {
        let result = load_config_from_str("{ not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/blogflow/config.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_default_config_round_trips_through_schema() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        let config = load_config_from_str(&json).unwrap();
        assert_eq!(config.publish.standard_url, "https://medium.com/new-story");
    }
}
