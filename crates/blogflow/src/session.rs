//! Dashboard sessions for the standard pipeline.
//!
//! A session runs one stage per user action and keeps the state between
//! actions. Each step carries a status, and a step can only start once the
//! one before it is done.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::DEFAULT_TOPICS;
use crate::pipeline::{PipelineError, ProgressReporter, StageOutput, StandardPipeline, StandardState};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    FetchNews,
    SelectHeadline,
    Research,
    Write,
    Publish,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::FetchNews,
        Step::SelectHeadline,
        Step::Research,
        Step::Write,
        Step::Publish,
    ];

    fn index(self) -> usize {
        match self {
            Step::FetchNews => 0,
            Step::SelectHeadline => 1,
            Step::Research => 2,
            Step::Write => 3,
            Step::Publish => 4,
        }
    }

    fn previous(self) -> Option<Step> {
        self.index().checked_sub(1).map(|i| Step::ALL[i])
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::FetchNews => write!(f, "fetch_news"),
            Step::SelectHeadline => write!(f, "select_headline"),
            Step::Research => write!(f, "research"),
            Step::Write => write!(f, "write"),
            Step::Publish => write!(f, "publish"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    WaitingForUser,
    Done,
    Failed,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Step '{step}' cannot start: '{blocked_by}' is not done")]
    StepNotReady { step: Step, blocked_by: Step },

    #[error("Step '{0}' has already completed")]
    AlreadyDone(Step),

    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Serializable view of a session for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub steps: Vec<(Step, StepStatus)>,
    pub state: StandardState,
    pub updated_at: DateTime<Utc>,
}

pub struct DashboardSession {
    id: String,
    topics: Vec<String>,
    statuses: [StepStatus; 5],
    state: StandardState,
    updated_at: DateTime<Utc>,
}

impl DashboardSession {
    pub fn new(id: impl Into<String>, topics: Vec<String>) -> Self {
        let topics = if topics.is_empty() {
            DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect()
        } else {
            topics
        };
        let state = StandardState::new(topics[0].clone());
        Self {
            id: id.into(),
            topics,
            statuses: [StepStatus::Pending; 5],
            state,
            updated_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn state(&self) -> &StandardState {
        &self.state
    }

    pub fn status(&self, step: Step) -> StepStatus {
        self.statuses[step.index()]
    }

    /// Chooses the topic category. Only allowed before news is fetched.
    pub fn set_topic(&mut self, topic: &str) -> Result<(), SessionError> {
        if self.status(Step::FetchNews) == StepStatus::Done {
            return Err(SessionError::AlreadyDone(Step::FetchNews));
        }
        if !self.topics.iter().any(|t| t == topic) {
            return Err(SessionError::UnknownTopic(topic.to_string()));
        }
        self.state.topic = topic.to_string();
        self.touch();
        Ok(())
    }

    pub async fn fetch_news(
        &mut self,
        pipeline: &StandardPipeline,
        progress: &dyn ProgressReporter,
    ) -> Result<(), SessionError> {
        self.begin(Step::FetchNews)?;
        let result = pipeline.step_fetch_headlines(&mut self.state, progress).await;
        let ok = self.finish(Step::FetchNews, result, |s| s.headlines.as_ref())?;
        if ok {
            self.set(Step::SelectHeadline, StepStatus::WaitingForUser);
        }
        Ok(())
    }

    /// Records the pick. A different headline may be chosen until the post
    /// is published; later steps then start over.
    pub fn select_headline(&mut self, headline: &str) -> Result<(), SessionError> {
        match self.status(Step::SelectHeadline) {
            StepStatus::WaitingForUser | StepStatus::Done => {}
            _ => {
                return Err(SessionError::StepNotReady {
                    step: Step::SelectHeadline,
                    blocked_by: Step::FetchNews,
                })
            }
        }
        if self.status(Step::Publish) == StepStatus::Done {
            return Err(SessionError::AlreadyDone(Step::Publish));
        }
        if self.state.selected_headline.as_deref() == Some(headline) {
            return Ok(());
        }

        self.state.select_headline(headline)?;
        self.set(Step::SelectHeadline, StepStatus::Done);
        for step in [Step::Research, Step::Write, Step::Publish] {
            self.set(step, StepStatus::Pending);
        }
        Ok(())
    }

    pub async fn research(
        &mut self,
        pipeline: &StandardPipeline,
        progress: &dyn ProgressReporter,
    ) -> Result<(), SessionError> {
        self.begin(Step::Research)?;
        let result = pipeline.step_research(&mut self.state, progress).await;
        self.finish(Step::Research, result, |s| s.research.as_ref())?;
        Ok(())
    }

    pub async fn write(
        &mut self,
        pipeline: &StandardPipeline,
        progress: &dyn ProgressReporter,
    ) -> Result<(), SessionError> {
        self.begin(Step::Write)?;
        let result = pipeline.step_write(&mut self.state, progress).await;
        self.finish(Step::Write, result, |s| s.blog_post.as_ref())?;
        Ok(())
    }

    pub async fn publish(
        &mut self,
        pipeline: &StandardPipeline,
        progress: &dyn ProgressReporter,
    ) -> Result<(), SessionError> {
        self.begin(Step::Publish)?;
        let result = pipeline.step_publish(&mut self.state, progress).await;
        self.finish(Step::Publish, result, |s| s.publish_status.as_ref())?;
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            steps: Step::ALL.iter().map(|s| (*s, self.status(*s))).collect(),
            state: self.state.clone(),
            updated_at: self.updated_at,
        }
    }

    /// Gate: predecessor done, step not already done. Fetch may be re-run
    /// only after it failed.
    fn begin(&mut self, step: Step) -> Result<(), SessionError> {
        if self.status(step) == StepStatus::Done {
            return Err(SessionError::AlreadyDone(step));
        }
        if let Some(previous) = step.previous() {
            if self.status(previous) != StepStatus::Done {
                return Err(SessionError::StepNotReady {
                    step,
                    blocked_by: previous,
                });
            }
        }
        self.set(step, StepStatus::Running);
        Ok(())
    }

    /// Marks the step from its output. Returns whether it succeeded.
    fn finish<T>(
        &mut self,
        step: Step,
        result: Result<(), PipelineError>,
        output: impl Fn(&StandardState) -> Option<&StageOutput<T>>,
    ) -> Result<bool, SessionError> {
        if let Err(e) = result {
            self.set(step, StepStatus::Failed);
            return Err(e.into());
        }
        let ok = output(&self.state).is_some_and(StageOutput::is_ready);
        self.set(
            step,
            if ok {
                StepStatus::Done
            } else {
                StepStatus::Failed
            },
        );
        Ok(ok)
    }

    fn set(&mut self, step: Step, status: StepStatus) {
        self.statuses[step.index()] = status;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Sessions keyed by id. Created on first access, dropped on reset.
#[derive(Default)]
pub struct SessionStore {
    topics: Vec<String>,
    sessions: RwLock<HashMap<String, Arc<Mutex<DashboardSession>>>>,
}

impl SessionStore {
    pub fn new(topics: Vec<String>) -> Self {
        Self {
            topics,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_or_create(&self, id: &str) -> Arc<Mutex<DashboardSession>> {
        if let Ok(sessions) = self.sessions.read() {
            if let Some(session) = sessions.get(id) {
                return Arc::clone(session);
            }
        }

        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(sessions.entry(id.to_string()).or_insert_with(|| {
            Arc::new(Mutex::new(DashboardSession::new(id, self.topics.clone())))
        }))
    }

    /// Starts a fresh session under a new id.
    pub fn create(&self) -> (String, Arc<Mutex<DashboardSession>>) {
        let id = uuid::Uuid::new_v4().to_string();
        let session = self.get_or_create(&id);
        (id, session)
    }

    /// Drops the session. Returns whether it existed.
    pub fn reset(&self, id: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
