use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use crate::browser::{run_with_retry, AgentTask, AgentTranscript, BrowserHandle};
use crate::config::StageKey;
use crate::llm::GenerationRequest;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::error::PipelineError;
use crate::pipeline::outcome::StageOutput;
use crate::pipeline::progress::{ProgressEvent, ProgressReporter, Stage};
use crate::pipeline::services::Services;
use crate::pipeline::standard::DEFAULT_PUBLISH_STATUS;
use crate::pipeline::{prompts, report_outcome, text};
use crate::sanitize;

use super::context::{DraftStatus, TechnicalState};
use super::ideas;
use super::machine::TechnicalPhase;

/// Scrape → select → (pick → research → write → draft)* until the queue
/// is empty.
pub struct TechnicalPipeline {
    config: Arc<PipelineConfig>,
    services: Services,
    scrape_browser: BrowserHandle,
    draft_browser: BrowserHandle,
}

impl TechnicalPipeline {
    /// The scrape and draft stages may use separate browser sessions, e.g.
    /// one restricted to the drafting site.
    pub fn new(
        config: Arc<PipelineConfig>,
        services: Services,
        scrape_browser: BrowserHandle,
        draft_browser: BrowserHandle,
    ) -> Self {
        Self {
            config,
            services,
            scrape_browser,
            draft_browser,
        }
    }

    /// Full run starting with the browser scrape.
    pub async fn run(
        &self,
        state: &mut TechnicalState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        state.transition(TechnicalPhase::Fetching)?;
        self.step_fetch_ideas(state, progress).await?;
        self.drain(state, progress).await
    }

    /// Skips the scrape and works from a given idea list.
    pub async fn run_with_ideas(
        &self,
        state: &mut TechnicalState,
        ideas: Vec<String>,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        state.transition(TechnicalPhase::Fetching)?;
        state.ideas = text::dedup_preserving_order(ideas);
        if state.ideas.is_empty() {
            return Err(PipelineError::NoIdeas("idea list is empty".to_string()));
        }
        progress.report(ProgressEvent::completed(
            Stage::FetchIdeas,
            format!("Loaded {} ideas", state.ideas.len()),
        ));
        self.drain(state, progress).await
    }

    async fn drain(
        &self,
        state: &mut TechnicalState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        state.transition(TechnicalPhase::Selecting)?;
        self.step_select_ideas(state, progress).await?;

        loop {
            state.transition(TechnicalPhase::Picking)?;
            let Some(idea) = self.step_pick_next(state, progress)? else {
                state.transition(TechnicalPhase::Done)?;
                break;
            };

            let span = info_span!("idea", idea = %sanitize::short_label(&idea));
            async {
                state.transition(TechnicalPhase::Researching)?;
                self.step_research(state, progress).await?;
                state.transition(TechnicalPhase::Writing)?;
                self.step_write(state, progress).await?;
                state.transition(TechnicalPhase::Drafting)?;
                self.step_draft(state, progress).await
            }
            .instrument(span)
            .await?;

            let next = TechnicalPhase::after_idea(state.queue.is_empty());
            if next.is_terminal() {
                state.transition(next)?;
                break;
            }
        }

        info!(
            completed = state.completed_blogs.len(),
            "Technical pipeline finished"
        );
        Ok(())
    }

    pub async fn step_fetch_ideas(
        &self,
        state: &mut TechnicalState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        progress.report(ProgressEvent::started(
            Stage::FetchIdeas,
            "Scraping ideas with the browser agent",
        ));

        let task = AgentTask::new(
            self.config.scrape_task.clone(),
            self.config.agent_model.clone(),
        )
        .with_api_key(self.services.credentials.stage_key(StageKey::Fetch).cloned());

        let outcome = run_with_retry(
            &*self.services.agent,
            &task,
            &self.scrape_browser,
            &self.config.retry,
        )
        .instrument(info_span!("fetch_ideas"))
        .await;

        let Some(transcript) = outcome.result.as_ref() else {
            let reason = outcome.failure_reason();
            progress.report(ProgressEvent::failed(Stage::FetchIdeas, reason.clone()));
            return Err(PipelineError::NoIdeas(reason));
        };

        let raw = self.extract_final_output(transcript).await;
        let scraped = ideas::parse_scraped_ideas(&raw);
        if scraped.is_empty() {
            let reason = "scrape produced no ideas".to_string();
            progress.report(ProgressEvent::failed(Stage::FetchIdeas, reason.clone()));
            return Err(PipelineError::NoIdeas(reason));
        }

        progress.report(ProgressEvent::completed(
            Stage::FetchIdeas,
            format!("Scraped {} ideas", scraped.len()),
        ));
        state.ideas = scraped;
        Ok(())
    }

    /// Asks the model for the agent's final output; falls back to the
    /// transcript's own final result.
    async fn extract_final_output(&self, transcript: &AgentTranscript) -> String {
        let request = GenerationRequest::new(
            StageKey::Fetch,
            prompts::transcript_extraction(&transcript.render()),
        );

        match self.services.generator.generate(request).await {
            Ok(output) if !output.trim().is_empty() => output.trim().to_string(),
            Ok(_) => transcript.final_result.clone().unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Transcript extraction failed, using agent final result");
                transcript.final_result.clone().unwrap_or_default()
            }
        }
    }

    pub async fn step_select_ideas(
        &self,
        state: &mut TechnicalState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        if state.ideas.is_empty() {
            return Err(PipelineError::MissingInput {
                stage: "select_ideas",
                field: "ideas",
            });
        }

        progress.report(ProgressEvent::started(
            Stage::SelectIdeas,
            format!("Selecting from {} ideas", state.ideas.len()),
        ));

        let request =
            GenerationRequest::new(StageKey::Research, prompts::content_selector(&state.ideas));
        let selected = match self
            .services
            .generator
            .generate(request)
            .instrument(info_span!("select_ideas"))
            .await
        {
            Ok(raw) => ideas::parse_selected_ideas(&raw),
            Err(e) => {
                progress.report(ProgressEvent::failed(Stage::SelectIdeas, e.to_string()));
                Vec::new()
            }
        };

        progress.report(ProgressEvent::completed(
            Stage::SelectIdeas,
            format!("Queued {} ideas", selected.len()),
        ));
        state.queue = selected.into();
        Ok(())
    }

    /// Moves the next queued idea into flight. `None` when the queue is
    /// drained.
    pub fn step_pick_next(
        &self,
        state: &mut TechnicalState,
        progress: &dyn ProgressReporter,
    ) -> Result<Option<String>, PipelineError> {
        if let Some(current) = &state.current_idea {
            return Err(PipelineError::IdeaInFlight(current.clone()));
        }

        let picked = state.pick_next().map(str::to_string);
        if let Some(idea) = &picked {
            progress.report(ProgressEvent::completed(
                Stage::PickIdea,
                format!("Picked: {} ({} left)", idea, state.queue.len()),
            ));
        }
        Ok(picked)
    }

    pub async fn step_research(
        &self,
        state: &mut TechnicalState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        let idea = state
            .current_idea
            .clone()
            .ok_or(PipelineError::MissingInput {
                stage: "research",
                field: "current_idea",
            })?;

        progress.report(ProgressEvent::started(
            Stage::Research,
            format!("Researching: {}", idea),
        ));

        let research = match self.services.researcher.research(&idea).await {
            Ok(text) if text.trim().is_empty() => {
                StageOutput::failed("research API returned no content")
            }
            Ok(text) => StageOutput::Ready(text),
            Err(e) => StageOutput::failed(e.to_string()),
        };

        report_outcome(progress, Stage::Research, &research, |text| {
            format!("Research complete ({} chars)", text.len())
        });
        state.research = Some(research);
        Ok(())
    }

    pub async fn step_write(
        &self,
        state: &mut TechnicalState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        let research = state.research.as_ref().ok_or(PipelineError::MissingInput {
            stage: "write",
            field: "research",
        })?;

        let blog_post: StageOutput<String> = match research.require("research") {
            Err(reason) => StageOutput::failed(reason),
            Ok(research) => {
                progress.report(ProgressEvent::started(
                    Stage::Write,
                    "Writing technical blog post",
                ));
                let request =
                    GenerationRequest::new(StageKey::Write, prompts::technical_writer(research))
                        .with_temperature(self.config.write_temperature);
                self.services.generator.generate(request).await.into()
            }
        };

        report_outcome(progress, Stage::Write, &blog_post, |post| {
            format!("Blog post written ({} chars)", post.len())
        });
        state.blog_post = Some(blog_post);
        Ok(())
    }

    pub async fn step_draft(
        &self,
        state: &mut TechnicalState,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        let idea = state
            .current_idea
            .clone()
            .ok_or(PipelineError::MissingInput {
                stage: "draft",
                field: "current_idea",
            })?;
        let blog_post = state.blog_post.as_ref().ok_or(PipelineError::MissingInput {
            stage: "draft",
            field: "blog_post",
        })?;

        let draft: DraftStatus = match blog_post.require("blog post") {
            Err(reason) => StageOutput::failed(reason),
            Ok(post) => {
                progress.report(ProgressEvent::started(
                    Stage::Draft,
                    format!("Drafting on {}", self.config.draft_url),
                ));
                let mut task = AgentTask::new(
                    prompts::draft_task(&self.config.draft_url, post),
                    self.config.agent_model.clone(),
                )
                .with_api_key(
                    self.services
                        .credentials
                        .stage_key(StageKey::Publish)
                        .cloned(),
                )
                .without_vision();
                if let Some(login) = &self.services.credentials.login {
                    task = task.with_login(self.config.draft_origin(), login.clone());
                }

                let outcome = run_with_retry(
                    &*self.services.agent,
                    &task,
                    &self.draft_browser,
                    &self.config.retry,
                )
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

        report_outcome(progress, Stage::Draft, &draft, |status| status.clone());
        if !state.complete_current(draft)? {
            warn!(idea = %idea, "Idea already completed, keeping the first result");
        }
        Ok(())
    }
}
