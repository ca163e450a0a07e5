pub mod context;
pub mod ideas;
pub mod machine;
pub mod runner;

pub use context::{CompletedBlog, DraftStatus, TechnicalState};
pub use ideas::parse_selected_ideas;
pub use machine::TechnicalPhase;
pub use runner::TechnicalPipeline;
