//! Test harness wiring stub services into the pipelines.

#![allow(dead_code)]

use std::sync::Arc;

use secrecy::SecretString;

use blogflow::browser::{BrowserHandle, BrowserSession};
use blogflow::config::{Credentials, SiteLogin};
use blogflow::pipeline::{PipelineConfig, Services, StandardPipeline, TechnicalPipeline};

use super::stubs::{RecordingProgress, StubAgent, StubGenerator, StubResearcher};

pub struct TestHarness {
    pub generator: Arc<StubGenerator>,
    pub researcher: Arc<StubResearcher>,
    pub agent: Arc<StubAgent>,
    pub progress: RecordingProgress,
    pub config: PipelineConfig,
    pub credentials: Credentials,
}

impl TestHarness {
    pub fn new(generator: StubGenerator, researcher: StubResearcher, agent: StubAgent) -> Self {
        Self {
            generator: Arc::new(generator),
            researcher: Arc::new(researcher),
            agent: Arc::new(agent),
            progress: RecordingProgress::new(),
            config: PipelineConfig::default(),
            credentials: Credentials::default(),
        }
    }

    /// Adds a publishing-site login to the credentials.
    pub fn with_login(mut self, email: &str, password: &str) -> Self {
        self.credentials.login = Some(SiteLogin {
            email: SecretString::from(email.to_string()),
            password: SecretString::from(password.to_string()),
        });
        self
    }

    pub fn services(&self) -> Services {
        Services {
            generator: self.generator.clone(),
            researcher: self.researcher.clone(),
            agent: self.agent.clone(),
            credentials: self.credentials.clone(),
        }
    }

    pub fn browser(&self) -> BrowserHandle {
        BrowserSession::new().into_handle()
    }

    pub fn standard(&self) -> StandardPipeline {
        StandardPipeline::new(
            Arc::new(self.config.clone()),
            self.services(),
            self.browser(),
        )
    }

    pub fn technical(&self) -> TechnicalPipeline {
        TechnicalPipeline::new(
            Arc::new(self.config.clone()),
            self.services(),
            self.browser(),
            BrowserSession::new()
                .with_allowed_domains(vec!["https://dev.to/".to_string()])
                .into_handle(),
        )
    }
}
