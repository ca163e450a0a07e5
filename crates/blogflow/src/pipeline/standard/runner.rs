use std::sync::Arc;

use tracing::{info_span, Instrument};

use crate::browser::{run_with_retry, AgentTask, BrowserHandle};
use crate::config::StageKey;
use crate::llm::GenerationRequest;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::error::PipelineError;
use crate::pipeline::outcome::StageOutput;
use crate::pipeline::progress::{ProgressEvent, ProgressReporter, Stage};
use crate::pipeline::services::Services;
use crate::pipeline::{prompts, report_outcome, text};
use crate::sanitize;

use super::context::StandardState;

/// Status recorded when the agent finishes without a final message.
pub const DEFAULT_PUBLISH_STATUS: &str = "Draft Created";

/// Headline → research → blog post → publishing-site draft.
pub struct StandardPipeline {
    config: Arc<PipelineConfig>,
    services: Services,
    browser: BrowserHandle,
}

impl StandardPipeline {
    pub fn new(config: Arc<PipelineConfig>, services: Services, browser: BrowserHandle) -> Self {
        Self {
            config,
            services,
            browser,
        }
    }

    /// Runs the fetch stage. The run then waits for a headline selection.
    pub async fn start(
        &self,
        state: &mut StandardState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        self.step_fetch_headlines(state, progress).await
    }

    /// Runs research, write and publish for the selected headline.
    pub async fn resume(
        &self,
        state: &mut StandardState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        let headline = state
            .selected_headline
            .as_deref()
            .map(sanitize::short_label)
            .unwrap_or_default();

        async {
            self.step_research(state, progress).await?;
            self.step_write(state, progress).await?;
            self.step_publish(state, progress).await
        }
        .instrument(info_span!("standard_pipeline", headline = %headline))
        .await
    }

    pub async fn step_fetch_headlines(
        &self,
        state: &mut StandardState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        if state.topic.trim().is_empty() {
            return Err(PipelineError::MissingInput {
                stage: "fetch_headlines",
                field: "topic",
            });
        }

        let span = info_span!("fetch_headlines", topic = %state.topic);
        async {
            progress.report(ProgressEvent::started(
                Stage::FetchHeadlines,
                format!("Searching news for: {}", state.topic),
            ));

            let request =
                GenerationRequest::new(StageKey::Fetch, prompts::headline_search(&state.topic))
                    .with_temperature(Some(self.config.fetch_temperature))
                    .grounded();

            let headlines = match self.services.generator.generate(request).await {
                Ok(response) => {
                    let list = text::parse_lines(&response);
                    if list.is_empty() {
                        StageOutput::failed("no headlines in response")
                    } else {
                        StageOutput::Ready(list)
                    }
                }
                Err(e) => StageOutput::failed(e.to_string()),
            };

            report_outcome(progress, Stage::FetchHeadlines, &headlines, |list| {
                format!("Found {} headlines", list.len())
            });

            *state = StandardState {
                topic: std::mem::take(&mut state.topic),
                headlines: Some(headlines),
                ..StandardState::default()
            };
            Ok(())
        }
        .instrument(span)
        .await
    }

    pub async fn step_research(
        &self,
        state: &mut StandardState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        let headline = state
            .selected_headline
            .clone()
            .ok_or(PipelineError::MissingInput {
                stage: "research",
                field: "selected_headline",
            })?;

        async {
            progress.report(ProgressEvent::started(
                Stage::Research,
                format!("Researching: {}", headline),
            ));

            let request = GenerationRequest::new(StageKey::Research, prompts::research(&headline))
                .with_temperature(Some(self.config.research_temperature))
                .grounded();
            let research: StageOutput<String> =
                self.services.generator.generate(request).await.into();

            report_outcome(progress, Stage::Research, &research, |text| {
                format!("Research complete ({} chars)", text.len())
            });
            state.research = Some(research);
            Ok(())
        }
        .instrument(info_span!("research"))
        .await
    }

    pub async fn step_write(
        &self,
        state: &mut StandardState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        let headline = state
            .selected_headline
            .clone()
            .ok_or(PipelineError::MissingInput {
                stage: "write",
                field: "selected_headline",
            })?;
        let research = state.research.as_ref().ok_or(PipelineError::MissingInput {
            stage: "write",
            field: "research",
        })?;

        let blog_post: StageOutput<String> = match research.require("research") {
            Err(reason) => StageOutput::failed(reason),
            Ok(research) => {
                progress.report(ProgressEvent::started(
                    Stage::Write,
                    format!("Writing blog post for: {}", headline),
                ));
                let request = GenerationRequest::new(
                    StageKey::Write,
                    prompts::standard_writer(&headline, research),
                )
                .with_temperature(self.config.write_temperature);

                self.services
                    .generator
                    .generate(request)
                    .instrument(info_span!("write"))
                    .await
                    .into()
            }
        };

        report_outcome(progress, Stage::Write, &blog_post, |post| {
            format!("Blog post written ({} chars)", post.len())
        });
        state.blog_post = Some(blog_post);
        Ok(())
    }

    pub async fn step_publish(
        &self,
        state: &mut StandardState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        let headline = state
            .selected_headline
            .clone()
            .ok_or(PipelineError::MissingInput {
                stage: "publish",
                field: "selected_headline",
            })?;
        let blog_post = state.blog_post.as_ref().ok_or(PipelineError::MissingInput {
            stage: "publish",
            field: "blog_post",
        })?;

        let status = match blog_post.require("blog post") {
            Err(reason) => StageOutput::failed(reason),
            Ok(post) => {
                let title = prompts::extract_title(post, &headline);
                progress.report(ProgressEvent::started(
                    Stage::Publish,
                    format!("Drafting \"{}\" in the browser", title),
                ));

                let task = AgentTask::new(
                    prompts::publish_task(&self.config.publish_url, &title, post),
                    self.config.agent_model.clone(),
                )
                .with_api_key(
                    self.services
                        .credentials
                        .stage_key(StageKey::Publish)
                        .cloned(),
                );

                let outcome =
                    run_with_retry(&*self.services.agent, &task, &self.browser, &self.config.retry)
                        .instrument(info_span!("publish", title = %sanitize::short_label(&title)))
                        .await;

                match outcome.result {
                    Some(transcript) => StageOutput::Ready(
                        transcript
                            .final_result
                            .filter(|r| !r.trim().is_empty())
                            .unwrap_or_else(|| DEFAULT_PUBLISH_STATUS.to_string()),
                    ),
                    None => StageOutput::failed(outcome.failure_reason()),
                }
            }
        };

        report_outcome(progress, Stage::Publish, &status, |s| s.clone());
        state.publish_status = Some(status);
        Ok(())
    }
}
