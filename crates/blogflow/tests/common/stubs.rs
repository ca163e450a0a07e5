//! Scriptable service stand-ins.
//!
//! Each stub answers through a closure and records what it was asked, so
//! tests can assert both on pipeline state and on the calls made.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;

use blogflow::browser::{AgentError, AgentTask, AgentTranscript, BrowserAgent, BrowserSession};
use blogflow::config::StageKey;
use blogflow::llm::{GenerationRequest, GenerativeClient, LlmError};
use blogflow::pipeline::{ProgressEvent, ProgressReporter, Stage};
use blogflow::research::{ResearchClient, ResearchError};

type GenerateFn = dyn Fn(&GenerationRequest) -> Result<String, LlmError> + Send + Sync;

/// Generative client answering from a closure.
pub struct StubGenerator {
    handler: Box<GenerateFn>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl StubGenerator {
    pub fn new(
        handler: impl Fn(&GenerationRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fixed answer per stage key. Unlisted stages get an HTTP error.
    pub fn by_stage(answers: &[(StageKey, &str)]) -> Self {
        let answers: Vec<(StageKey, String)> = answers
            .iter()
            .map(|(stage, text)| (*stage, text.to_string()))
            .collect();
        Self::new(move |request| {
            answers
                .iter()
                .find(|(stage, _)| *stage == request.stage)
                .map(|(_, text)| text.clone())
                .ok_or_else(|| LlmError::Http(format!("no answer for {}", request.stage)))
        })
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn calls_for(&self, stage: StageKey) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.stage == stage)
            .count()
    }
}

#[async_trait]
impl GenerativeClient for StubGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        let answer = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        answer
    }
}

type ResearchFn = dyn Fn(&str) -> Result<String, ResearchError> + Send + Sync;

/// Research client answering from a closure.
pub struct StubResearcher {
    handler: Box<ResearchFn>,
    queries: Mutex<Vec<String>>,
}

impl StubResearcher {
    pub fn new(
        handler: impl Fn(&str) -> Result<String, ResearchError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Answers `Research on <idea>` for every idea.
    pub fn echo() -> Self {
        Self::new(|idea| Ok(format!("Research on {}", idea)))
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResearchClient for StubResearcher {
    async fn research(&self, idea: &str) -> Result<String, ResearchError> {
        self.queries.lock().unwrap().push(idea.to_string());
        (self.handler)(idea)
    }
}

type AgentFn = dyn Fn(&AgentTask, usize) -> Result<AgentTranscript, AgentError> + Send + Sync;

/// Browser agent answering from a closure. The closure also receives the
/// 1-based call number.
pub struct StubAgent {
    handler: Box<AgentFn>,
    tasks: Mutex<Vec<AgentTask>>,
    sessions: Mutex<Vec<String>>,
}

impl StubAgent {
    pub fn new(
        handler: impl Fn(&AgentTask, usize) -> Result<AgentTranscript, AgentError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            tasks: Mutex::new(Vec::new()),
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Every run succeeds with the given final result.
    pub fn finishing_with(final_result: Option<&str>) -> Self {
        let final_result = final_result.map(str::to_string);
        Self::new(move |_, _| Ok(transcript(final_result.as_deref())))
    }

    /// Every run fails.
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |_, _| Err(AgentError::TaskFailed(message.clone())))
    }

    /// Fails the first `failures` calls, then succeeds.
    pub fn flaky(failures: usize, final_result: &str) -> Self {
        let final_result = final_result.to_string();
        Self::new(move |_, call| {
            if call <= failures {
                Err(AgentError::Status {
                    status: 502,
                    body: "browser crashed".to_string(),
                })
            } else {
                Ok(transcript(Some(&final_result)))
            }
        })
    }

    pub fn tasks(&self) -> Vec<AgentTask> {
        self.tasks.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserAgent for StubAgent {
    async fn run(
        &self,
        task: &AgentTask,
        session: &BrowserSession,
    ) -> Result<AgentTranscript, AgentError> {
        let call = {
            let mut tasks = self.tasks.lock().unwrap();
            tasks.push(task.clone());
            tasks.len()
        };
        self.sessions.lock().unwrap().push(session.id.clone());
        (self.handler)(task, call)
    }
}

pub fn transcript(final_result: Option<&str>) -> AgentTranscript {
    AgentTranscript {
        final_result: final_result.map(str::to_string),
        steps: vec!["opened page".to_string(), "done".to_string()],
        errors: Vec::new(),
    }
}

/// Collects every progress event.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn failures(&self, stage: Stage) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Failed { stage: s, error } if s == stage => Some(error),
                _ => None,
            })
            .collect()
    }

    pub fn completed(&self, stage: Stage) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, ProgressEvent::Completed { stage: s, .. } if *s == stage))
            .count()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}
