//! Per-stage API key lookup.
//!
//! Each generative stage may use its own key so quota can be split across
//! projects. Lookup order:
//!
//! | stage    | tried in order                     |
//! |----------|------------------------------------|
//! | fetch    | fetch, default                     |
//! | research | research, default                  |
//! | write    | write, default                     |
//! | publish  | publish, write, default            |
//!
//! The default key also accepts the `GEMINI_KEY` variable as an alias.

use std::fmt;

use log::warn;
use secrecy::SecretString;

use crate::config::schema::{CredentialsConfig, LoginConfig, SecretSource};
use crate::secrets::{self, SecretError};

/// Alternate name accepted for the shared default key.
pub const DEFAULT_KEY_ALIAS: &str = "GEMINI_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKey {
    Fetch,
    Research,
    Write,
    Publish,
}

impl StageKey {
    pub const ALL: [StageKey; 4] = [
        StageKey::Fetch,
        StageKey::Research,
        StageKey::Write,
        StageKey::Publish,
    ];
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKey::Fetch => write!(f, "fetch"),
            StageKey::Research => write!(f, "research"),
            StageKey::Write => write!(f, "write"),
            StageKey::Publish => write!(f, "publish"),
        }
    }
}

/// Resolved credentials, one optional secret per consumer.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub fetch: Option<SecretString>,
    pub research: Option<SecretString>,
    pub write: Option<SecretString>,
    pub publish: Option<SecretString>,
    pub research_api: Option<SecretString>,
    pub login: Option<SiteLogin>,
}

/// Username and password for the publishing site.
#[derive(Debug, Clone)]
pub struct SiteLogin {
    pub email: SecretString,
    pub password: SecretString,
}

impl Credentials {
    /// Resolves every key through its fallback chain.
    pub fn resolve(config: &CredentialsConfig, login: &LoginConfig) -> Result<Self, SecretError> {
        let default = resolve_default(&config.default_key)?;
        let write = first_of(&[&config.write_key])?.or_else(|| default.clone());

        let credentials = Self {
            fetch: first_of(&[&config.fetch_key])?.or_else(|| default.clone()),
            research: first_of(&[&config.research_key])?.or_else(|| default.clone()),
            publish: first_of(&[&config.publish_key])?.or_else(|| write.clone()),
            write,
            research_api: secrets::resolve_source(&config.research_api_key)?,
            login: resolve_login(login)?,
        };

        Ok(credentials)
    }

    pub fn stage_key(&self, stage: StageKey) -> Option<&SecretString> {
        match stage {
            StageKey::Fetch => self.fetch.as_ref(),
            StageKey::Research => self.research.as_ref(),
            StageKey::Write => self.write.as_ref(),
            StageKey::Publish => self.publish.as_ref(),
        }
    }

    /// Names of credentials that could not be resolved.
    pub fn missing(&self) -> Vec<String> {
        let mut missing: Vec<String> = StageKey::ALL
            .iter()
            .filter(|stage| self.stage_key(**stage).is_none())
            .map(|stage| format!("{} key", stage))
            .collect();

        if self.research_api.is_none() {
            missing.push("research API key".to_string());
        }
        if self.login.is_none() {
            missing.push("publishing site login".to_string());
        }
        missing
    }

    /// Logs one warning per missing credential. Never fails.
    pub fn warn_missing(&self) {
        for name in self.missing() {
            warn!("Credential not configured: {}", name);
        }
    }
}

fn resolve_default(source: &SecretSource) -> Result<Option<SecretString>, SecretError> {
    match secrets::resolve_source(source)? {
        Some(secret) => Ok(Some(secret)),
        None => secrets::resolve_source(&SecretSource::env(DEFAULT_KEY_ALIAS)),
    }
}

fn first_of(sources: &[&SecretSource]) -> Result<Option<SecretString>, SecretError> {
    for source in sources {
        if let Some(secret) = secrets::resolve_source(source)? {
            return Ok(Some(secret));
        }
    }
    Ok(None)
}

fn resolve_login(login: &LoginConfig) -> Result<Option<SiteLogin>, SecretError> {
    let email = secrets::resolve_source(&login.email)?;
    let password = secrets::resolve_source(&login.password)?;
    Ok(match (email, password) {
        (Some(email), Some(password)) => Some(SiteLogin { email, password }),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn direct(value: &str) -> SecretSource {
        SecretSource {
            value: Some(value.to_string()),
            file: None,
            env_var: None,
        }
    }

    fn unset() -> SecretSource {
        SecretSource::env("BLOGFLOW_UNSET_CREDENTIAL_FOR_TESTS")
    }

    fn config_with(default: SecretSource) -> CredentialsConfig {
        CredentialsConfig {
            default_key: default,
            fetch_key: unset(),
            research_key: unset(),
            write_key: unset(),
            publish_key: unset(),
            research_api_key: unset(),
        }
    }

    fn no_login() -> LoginConfig {
        LoginConfig {
            email: unset(),
            password: unset(),
        }
    }

    #[test]
    fn test_all_stages_fall_back_to_default() {
        let creds = Credentials::resolve(&config_with(direct("shared")), &no_login()).unwrap();
        for stage in StageKey::ALL {
            assert_eq!(creds.stage_key(stage).unwrap().expose_secret(), "shared");
        }
    }

    #[test]
    fn test_stage_specific_key_wins() {
        let mut config = config_with(direct("shared"));
        config.research_key = direct("research-only");

        let creds = Credentials::resolve(&config, &no_login()).unwrap();
        assert_eq!(
            creds
                .stage_key(StageKey::Research)
                .unwrap()
                .expose_secret(),
            "research-only"
        );
        assert_eq!(
            creds.stage_key(StageKey::Fetch).unwrap().expose_secret(),
            "shared"
        );
    }

    #[test]
    fn test_publish_falls_back_to_write_before_default() {
        let mut config = config_with(direct("shared"));
        config.write_key = direct("writer");

        let creds = Credentials::resolve(&config, &no_login()).unwrap();
        assert_eq!(
            creds.stage_key(StageKey::Publish).unwrap().expose_secret(),
            "writer"
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_missing_lists_unresolved_credentials() {
        std::env::remove_var(DEFAULT_KEY_ALIAS);
        let mut config = config_with(unset());
        config.fetch_key = direct("fetch");

        let creds = Credentials::resolve(&config, &no_login()).unwrap();
        let missing = creds.missing();
        assert!(!missing.contains(&"fetch key".to_string()));
        assert!(missing.contains(&"write key".to_string()));
        assert!(missing.contains(&"publishing site login".to_string()));
    }

    #[test]
    fn test_login_requires_both_parts() {
        let login = LoginConfig {
            email: direct("writer@example.com"),
            password: unset(),
        };
        let creds = Credentials::resolve(&config_with(direct("k")), &login).unwrap();
        assert!(creds.login.is_none());

        let login = LoginConfig {
            email: direct("writer@example.com"),
            password: direct("hunter2"),
        };
        let creds = Credentials::resolve(&config_with(direct("k")), &login).unwrap();
        let site = creds.login.unwrap();
        assert_eq!(site.email.expose_secret(), "writer@example.com");
        assert_eq!(site.password.expose_secret(), "hunter2");
    }
}
