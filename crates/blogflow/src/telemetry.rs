//! Logging setup for binaries.
//!
//! Library code logs through both `log` (service clients) and `tracing`
//! (pipelines). Records from `log` are forwarded into the tracing
//! subscriber so both end up in one stream.

use tracing_subscriber::EnvFilter;

/// Output format of the log stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Builds the filter: `RUST_LOG` wins, then `level`, then `info`.
pub fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init_logging(level: Option<&str>, format: LogFormat) {
    // Fails only if a logger is already set
    let _ = tracing_log::LogTracer::init();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(true);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = result {
        tracing::debug!("Logging already initialized: {}", e);
    }
}
