use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::pipeline::error::PipelineError;
use crate::pipeline::outcome::StageOutput;

use super::machine::TechnicalPhase;

/// Outcome of the browser draft for one idea.
pub type DraftStatus = StageOutput<String>;

/// A drained idea and what became of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedBlog {
    pub blog_post: StageOutput<String>,
    pub draft: DraftStatus,
}

/// State threaded through the technical pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalState {
    pub phase: TechnicalPhase,

    // Raw scrape result
    pub ideas: Vec<String>,

    // Filled by selection, drained from the front
    pub queue: VecDeque<String>,

    // At most one idea in flight, never also in `queue`
    pub current_idea: Option<String>,

    // Per-idea results, cleared after each draft
    pub research: Option<StageOutput<String>>,
    pub blog_post: Option<StageOutput<String>>,

    // Append-only; one entry per drained idea
    pub completed_blogs: BTreeMap<String, CompletedBlog>,
}

impl TechnicalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves to `next`, rejecting transitions the pipeline never makes.
    pub fn transition(&mut self, next: TechnicalPhase) -> Result<(), PipelineError> {
        if !self.phase.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Takes the first queued idea as the current one. With an empty queue
    /// nothing changes.
    pub fn pick_next(&mut self) -> Option<&str> {
        let next = self.queue.pop_front()?;
        self.current_idea = Some(next);
        self.current_idea.as_deref()
    }

    /// Records the finished idea and clears the per-idea fields.
    ///
    /// Returns `false` if the idea was already recorded; the first record
    /// is kept.
    pub fn complete_current(&mut self, draft: DraftStatus) -> Result<bool, PipelineError> {
        let idea = self.current_idea.take().ok_or(PipelineError::MissingInput {
            stage: "draft",
            field: "current_idea",
        })?;
        let blog_post = self
            .blog_post
            .take()
            .unwrap_or_else(|| StageOutput::failed("no blog post was written"));
        self.research = None;

        if self.completed_blogs.contains_key(&idea) {
            return Ok(false);
        }
        self.completed_blogs
            .insert(idea, CompletedBlog { blog_post, draft });
        Ok(true)
    }
}
