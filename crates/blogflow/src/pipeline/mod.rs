pub mod config;
pub mod error;
pub mod outcome;
pub mod progress;
pub mod prompts;
pub mod services;
pub mod standard;
pub mod technical;
pub mod text;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use outcome::StageOutput;
pub use progress::{
    BroadcastProgress, LogProgress, NoopProgress, ProgressBroadcaster, ProgressEvent,
    ProgressReporter, Stage, StageEvent, StageStatus,
};
pub use services::Services;
pub use standard::{StandardPipeline, StandardState};
pub use technical::{CompletedBlog, TechnicalPhase, TechnicalPipeline, TechnicalState};

/// Reports `Completed` or `Failed` for a finished stage.
pub(crate) fn report_outcome<T>(
    progress: &dyn ProgressReporter,
    stage: Stage,
    output: &StageOutput<T>,
    describe: impl FnOnce(&T) -> String,
) {
    match output {
        StageOutput::Ready(value) => progress.report(ProgressEvent::completed(stage, describe(value))),
        StageOutput::Failed { reason } => {
            progress.report(ProgressEvent::failed(stage, reason.clone()))
        }
    }
}
