use serde::{Deserialize, Serialize};

use crate::pipeline::error::PipelineError;
use crate::pipeline::outcome::StageOutput;

/// State threaded through the standard pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardState {
    // Chosen once at start
    pub topic: String,

    // Set by fetch
    pub headlines: Option<StageOutput<Vec<String>>>,

    // Set by the user; always one of `headlines`
    pub selected_headline: Option<String>,

    // Set by research
    pub research: Option<StageOutput<String>>,

    // Set by write
    pub blog_post: Option<StageOutput<String>>,

    // Set by publish
    pub publish_status: Option<StageOutput<String>>,
}

impl StandardState {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    /// Records the user's pick. It must be one of the fetched headlines.
    ///
    /// Picking a different headline drops research, post and status from
    /// the previous pick.
    pub fn select_headline(&mut self, headline: &str) -> Result<(), PipelineError> {
        let headlines = self.headlines.as_ref().ok_or(PipelineError::MissingInput {
            stage: "select_headline",
            field: "headlines",
        })?;

        let known = headlines
            .ready()
            .is_some_and(|list| list.iter().any(|h| h == headline));
        if !known {
            return Err(PipelineError::UnknownHeadline(headline.to_string()));
        }

        if self.selected_headline.as_deref() != Some(headline) {
            self.research = None;
            self.blog_post = None;
            self.publish_status = None;
            self.selected_headline = Some(headline.to_string());
        }
        Ok(())
    }

    /// Convenience for the final status text.
    pub fn status(&self) -> Option<&str> {
        self.publish_status
            .as_ref()
            .and_then(|s| s.ready())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched(headlines: &[&str]) -> StandardState {
        let mut state = StandardState::new("Technology");
        state.headlines = Some(StageOutput::Ready(
            headlines.iter().map(|h| h.to_string()).collect(),
        ));
        state
    }

    #[test]
    fn test_select_known_headline() {
        let mut state = fetched(&["H1", "H2"]);
        state.select_headline("H2").unwrap();
        assert_eq!(state.selected_headline.as_deref(), Some("H2"));
    }

    #[test]
    fn test_select_unknown_headline_rejected() {
        let mut state = fetched(&["H1"]);
        assert_eq!(
            state.select_headline("H9"),
            Err(PipelineError::UnknownHeadline("H9".to_string()))
        );
        assert!(state.selected_headline.is_none());
    }

    #[test]
    fn test_reselect_clears_downstream() {
        let mut state = fetched(&["H1", "H2"]);
        state.select_headline("H1").unwrap();
        state.research = Some(StageOutput::Ready("R1".to_string()));
        state.blog_post = Some(StageOutput::Ready("# H1".to_string()));
        state.publish_status = Some(StageOutput::Ready("Draft Created".to_string()));

        state.select_headline("H2").unwrap();

        assert_eq!(state.selected_headline.as_deref(), Some("H2"));
        assert!(state.research.is_none());
        assert!(state.blog_post.is_none());
        assert!(state.publish_status.is_none());
    }

    #[test]
    fn test_same_headline_keeps_results() {
        let mut state = fetched(&["H1"]);
        state.select_headline("H1").unwrap();
        state.research = Some(StageOutput::Ready("R1".to_string()));

        state.select_headline("H1").unwrap();
        assert_eq!(state.research, Some(StageOutput::Ready("R1".to_string())));
    }

    #[test]
    fn test_select_before_fetch_is_missing_input() {
        let mut state = StandardState::new("Crypto");
        assert!(matches!(
            state.select_headline("H1"),
            Err(PipelineError::MissingInput {
                field: "headlines",
                ..
            })
        ));
    }

    #[test]
    fn test_select_after_failed_fetch_rejected() {
        let mut state = StandardState::new("Crypto");
        state.headlines = Some(StageOutput::failed("quota"));
        assert!(matches!(
            state.select_headline("H1"),
            Err(PipelineError::UnknownHeadline(_))
        ));
    }
}
