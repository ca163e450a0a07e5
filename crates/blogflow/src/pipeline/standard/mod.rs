pub mod context;
pub mod runner;

pub use context::StandardState;
pub use runner::{StandardPipeline, DEFAULT_PUBLISH_STATUS};
