//! Secret resolution for API keys and publishing-site logins.
//!
//! A [`SecretSource`] names up to three places a secret may live, tried in
//! priority order:
//!
//! 1. **Direct value** (`value`) for quick local runs
//! 2. **File** (`file`) for mounted secrets, `~` is expanded
//! 3. **Environment variable** (`env_var`), the default for every stage key

use secrecy::SecretString;
use std::fs;

use crate::config::SecretSource;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret from a direct value, a file, or an environment variable,
/// in that order. Empty inputs are skipped; values are trimmed.
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    if let Some(value) = direct.filter(|v| !v.is_empty()) {
        return Ok(SecretString::from(value.to_string()));
    }

    if let Some(path) = file_path.filter(|p| !p.is_empty()) {
        let expanded = expand_home(path);
        return fs::read_to_string(&expanded)
            .map(|content| SecretString::from(content.trim().to_string()))
            .map_err(|source| SecretError::FileReadError {
                path: expanded,
                source,
            });
    }

    if let Some(name) = env_var.filter(|n| !n.is_empty()) {
        return match std::env::var(name) {
            Ok(value) => Ok(SecretString::from(value.trim().to_string())),
            Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                name: name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                name: name.to_string(),
            }),
        };
    }

    Err(SecretError::NoSourceProvided)
}

/// Like [`resolve_secret`], but a missing source is `Ok(None)`.
pub fn resolve_secret_optional(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<Option<SecretString>> {
    match resolve_secret(direct, file_path, env_var) {
        Ok(secret) => Ok(Some(secret)),
        Err(SecretError::NoSourceProvided) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Resolves a configured [`SecretSource`].
///
/// An unset environment variable or an empty resolved value counts as "not
/// configured" so callers can fall through to the next key in a chain. File
/// read failures are still reported.
pub fn resolve_source(source: &SecretSource) -> Result<Option<SecretString>> {
    use secrecy::ExposeSecret;

    let resolved = resolve_secret_optional(
        source.value.as_deref(),
        source.file.as_deref(),
        source.env_var.as_deref(),
    );

    match resolved {
        Ok(Some(secret)) if secret.expose_secret().is_empty() => Ok(None),
        Ok(secret) => Ok(secret),
        Err(SecretError::EnvVarNotSet { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Expands `~` and `~/...` to the current user's home directory.
pub(crate) fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
