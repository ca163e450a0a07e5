use serde::{Deserialize, Serialize};

/// Content produced by a service-backed stage, or why it could not be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutput<T> {
    Ready(T),
    Failed { reason: String },
}

impl<T> StageOutput<T> {
    pub fn failed(reason: impl Into<String>) -> Self {
        StageOutput::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, StageOutput::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            StageOutput::Ready(value) => Some(value),
            StageOutput::Failed { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            StageOutput::Ready(_) => None,
            StageOutput::Failed { reason } => Some(reason.as_str()),
        }
    }

    /// The ready value, or a reason string naming `what` as unavailable.
    pub fn require(&self, what: &str) -> Result<&T, String> {
        match self {
            StageOutput::Ready(value) => Ok(value),
            StageOutput::Failed { reason } => Err(format!("{} unavailable: {}", what, reason)),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for StageOutput<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => StageOutput::Ready(value),
            Err(e) => StageOutput::failed(e.to_string()),
        }
    }
}
