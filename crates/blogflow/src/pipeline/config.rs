use crate::browser::RetryPolicy;
use crate::config::Config;

/// Settings the pipelines read at run time, flattened from [`Config`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub agent_model: String,
    pub fetch_temperature: f32,
    pub research_temperature: f32,
    pub write_temperature: Option<f32>,
    pub retry: RetryPolicy,
    pub publish_url: String,
    pub draft_url: String,
    pub scrape_task: String,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            agent_model: config.agent_model().to_string(),
            fetch_temperature: config.generation.fetch_temperature,
            research_temperature: config.generation.research_temperature,
            write_temperature: config.generation.write_temperature,
            retry: RetryPolicy::from(&config.retry),
            publish_url: config.publish.standard_url.clone(),
            draft_url: config.publish.technical_url.clone(),
            scrape_task: config.scrape.task.clone(),
        }
    }

    /// Origin the draft site's login is keyed by, without a trailing slash.
    pub fn draft_origin(&self) -> &str {
        self.draft_url.trim_end_matches('/')
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.agent_model, "gemini-2.5-flash");
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.draft_origin(), "https://dev.to");
        assert!(config.write_temperature.is_none());
    }
}
