use thiserror::Error;

use super::technical::TechnicalPhase;

/// Contract violations and run-halting conditions. Service failures are
/// recorded in the state as `StageOutput::Failed` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Stage '{stage}' requires '{field}', which no earlier stage has set")]
    MissingInput {
        stage: &'static str,
        field: &'static str,
    },

    #[error("Headline is not one of the fetched headlines: {0}")]
    UnknownHeadline(String),

    #[error("No ideas to work on: {0}")]
    NoIdeas(String),

    #[error("Idea still in flight: {0}")]
    IdeaInFlight(String),

    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: TechnicalPhase,
        to: TechnicalPhase,
    },
}
