use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::AgentConfig;
use crate::secrets::expand_home;

/// Shared, exclusively-locked browser session.
///
/// Runs that share a handle serialize on its lock.
pub type BrowserHandle = Arc<Mutex<BrowserSession>>;

/// Settings for one browser the agent drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSession {
    pub id: String,
    /// Empty means unrestricted.
    pub allowed_domains: Vec<String>,
    pub user_data_dir: Option<PathBuf>,
    pub headless: bool,
    pub executable_path: Option<String>,
}

impl BrowserSession {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            allowed_domains: Vec::new(),
            user_data_dir: None,
            headless: false,
            executable_path: None,
        }
    }

    pub fn from_agent_config(config: &AgentConfig) -> Self {
        Self {
            headless: config.headless,
            executable_path: config.executable_path.clone(),
            user_data_dir: config
                .user_data_dir
                .as_deref()
                .map(|dir| PathBuf::from(expand_home(dir))),
            ..Self::new()
        }
    }

    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = domains;
        self
    }

    pub fn into_handle(self) -> BrowserHandle {
        Arc::new(Mutex::new(self))
    }
}

impl Default for BrowserSession {
    fn default() -> Self {
        Self::new()
    }
}
