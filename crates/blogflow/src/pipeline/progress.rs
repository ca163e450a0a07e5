//! Stage progress reporting for the CLI and dashboard sessions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Stage of either pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FetchHeadlines,
    Research,
    Write,
    Publish,
    FetchIdeas,
    SelectIdeas,
    PickIdea,
    Draft,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::FetchHeadlines => write!(f, "Fetching headlines"),
            Stage::Research => write!(f, "Researching"),
            Stage::Write => write!(f, "Writing"),
            Stage::Publish => write!(f, "Publishing"),
            Stage::FetchIdeas => write!(f, "Fetching ideas"),
            Stage::SelectIdeas => write!(f, "Selecting ideas"),
            Stage::PickIdea => write!(f, "Picking next idea"),
            Stage::Draft => write!(f, "Drafting"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Running,
    Completed,
    Failed,
}

/// Events emitted by the pipelines while a stage runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started { stage: Stage, message: String },
    Completed { stage: Stage, message: String },
    Failed { stage: Stage, error: String },
}

impl ProgressEvent {
    pub fn started(stage: Stage, message: impl Into<String>) -> Self {
        ProgressEvent::Started {
            stage,
            message: message.into(),
        }
    }

    pub fn completed(stage: Stage, message: impl Into<String>) -> Self {
        ProgressEvent::Completed {
            stage,
            message: message.into(),
        }
    }

    pub fn failed(stage: Stage, error: impl Into<String>) -> Self {
        ProgressEvent::Failed {
            stage,
            error: error.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            ProgressEvent::Started { stage, .. }
            | ProgressEvent::Completed { stage, .. }
            | ProgressEvent::Failed { stage, .. } => *stage,
        }
    }
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Serializable progress record sent to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEvent {
    pub run_id: String,
    pub stage: Stage,
    pub status: StageStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageEvent {
    fn from_progress(run_id: &str, event: ProgressEvent) -> Self {
        let (stage, status, message, error) = match event {
            ProgressEvent::Started { stage, message } => {
                (stage, StageStatus::Running, message, None)
            }
            ProgressEvent::Completed { stage, message } => {
                (stage, StageStatus::Completed, message, None)
            }
            ProgressEvent::Failed { stage, error } => (
                stage,
                StageStatus::Failed,
                format!("{} failed", stage),
                Some(error),
            ),
        };

        Self {
            run_id: run_id.to_string(),
            stage,
            status,
            message,
            timestamp: Utc::now(),
            error,
        }
    }
}

/// Fan-out of stage events to any number of subscribers.
#[derive(Clone)]
pub struct ProgressBroadcaster {
    sender: Arc<broadcast::Sender<StageEvent>>,
}

impl ProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StageEvent> {
        self.sender.subscribe()
    }

    /// Reporter tagging every event with `run_id`.
    pub fn reporter(&self, run_id: &str) -> BroadcastProgress {
        BroadcastProgress {
            run_id: run_id.to_string(),
            sender: Arc::clone(&self.sender),
        }
    }
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

pub struct BroadcastProgress {
    run_id: String,
    sender: Arc<broadcast::Sender<StageEvent>>,
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        // No receivers is fine
        let _ = self
            .sender
            .send(StageEvent::from_progress(&self.run_id, event));
    }
}

/// Writes each event to the log.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { stage, message } => log::info!("[{}] {}", stage, message),
            ProgressEvent::Completed { stage, message } => log::info!("[{}] {}", stage, message),
            ProgressEvent::Failed { stage, error } => log::warn!("[{}] {}", stage, error),
        }
    }
}
