//! blogflow CLI
//!
//! Runs the standard (news headline) or technical (scraped idea queue)
//! pipeline from the terminal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use blogflow::browser::BrowserSession;
use blogflow::config::Credentials;
use blogflow::pipeline::progress::{LogProgress, StageEvent, StageStatus};
use blogflow::pipeline::ProgressBroadcaster;
use blogflow::pipeline::{PipelineConfig, Services, StageOutput};
use blogflow::session::{DashboardSession, Step, StepStatus};
use blogflow::telemetry::{init_logging, LogFormat};
use blogflow::{
    load_config_or_default, Config, StandardPipeline, StandardState, TechnicalPipeline,
    TechnicalState,
};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

#[derive(Parser)]
#[command(name = "blogflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Research, write and publish blog posts with hosted models and a browser agent")]
#[command(long_about = r#"
Two pipelines are available:

  standard   fetch news headlines for a topic, pick one, research it,
             write a post and create a draft on the publishing site
  technical  scrape post ideas, select the promising ones and research,
             write and draft each of them in turn

Examples:
  blogflow standard --topic "Crypto"
  blogflow standard --pick 2
  blogflow technical --ideas-file ideas.txt
"#)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short, long, env = "BLOGFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "BLOGFLOW_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format (text or json)
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline → research → write → publish
    Standard {
        /// Topic category; defaults to the configured default topic
        #[arg(short, long)]
        topic: Option<String>,

        /// 1-based headline index; prompts when omitted
        #[arg(short, long)]
        pick: Option<usize>,
    },

    /// Same as `standard`, one confirmed step at a time
    Dashboard {
        #[arg(short, long)]
        topic: Option<String>,
    },

    /// Scrape ideas and drain them through research, write and draft
    Technical {
        /// Newline-separated ideas to use instead of scraping
        #[arg(long)]
        ideas_file: Option<PathBuf>,
    },

    /// Print the effective configuration and missing credentials
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(Some(&cli.log_level), cli.log_format);

    let config = load_config_or_default(cli.config.as_deref()).context("loading config")?;
    let credentials = Credentials::resolve(&config.credentials, &config.publish.login)
        .context("resolving credentials")?;
    credentials.warn_missing();

    match cli.command {
        Commands::Config => show_config(&config, &credentials),
        Commands::Standard { topic, pick } => {
            let pipeline = standard_pipeline(&config, credentials)?;
            run_standard(&pipeline, topic_or_default(&config, topic), pick).await
        }
        Commands::Dashboard { topic } => {
            let pipeline = standard_pipeline(&config, credentials)?;
            run_dashboard(&pipeline, &config, topic).await
        }
        Commands::Technical { ideas_file } => {
            run_technical(&config, credentials, ideas_file.as_deref()).await
        }
    }
}

fn topic_or_default(config: &Config, topic: Option<String>) -> String {
    topic.unwrap_or_else(|| config.default_topic.clone())
}

fn standard_pipeline(config: &Config, credentials: Credentials) -> Result<StandardPipeline> {
    let services = Services::from_config(config, credentials)?;
    let browser = BrowserSession::from_agent_config(&config.agent).into_handle();
    Ok(StandardPipeline::new(
        Arc::new(PipelineConfig::from_config(config)),
        services,
        browser,
    ))
}

fn show_config(config: &Config, credentials: &Credentials) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    let missing = credentials.missing();
    if missing.is_empty() {
        println!("\nAll credentials resolved");
    } else {
        println!("\nMissing: {}", missing.join(", "));
    }
    Ok(())
}

async fn run_standard(pipeline: &StandardPipeline, topic: String, pick: Option<usize>) -> Result<()> {
    let progress = LogProgress;
    let mut state = StandardState::new(topic);
    pipeline.start(&mut state, &progress).await?;

    let headlines = fetched_headlines(&state)?;
    let headline = choose_headline(&headlines, pick).await?;
    state.select_headline(&headline)?;

    pipeline.resume(&mut state, &progress).await?;
    print_standard_result(&state);
    Ok(())
}

async fn run_dashboard(
    pipeline: &StandardPipeline,
    config: &Config,
    topic: Option<String>,
) -> Result<()> {
    let mut session = DashboardSession::new("cli", config.topics.clone());
    if let Some(topic) = topic {
        session.set_topic(&topic)?;
    }
    let broadcaster = ProgressBroadcaster::default();
    let board = spawn_status_board(broadcaster.subscribe());
    let progress = broadcaster.reporter(session.id());

    session.fetch_news(pipeline, &progress).await?;
    if session.status(Step::FetchNews) != StepStatus::Done {
        print_standard_result(session.state());
        bail!("fetching headlines failed");
    }

    let headlines = fetched_headlines(session.state())?;
    let headline = choose_headline(&headlines, None).await?;
    session.select_headline(&headline)?;

    for step in [Step::Research, Step::Write, Step::Publish] {
        if !confirm(&format!("Run {}? [Y/n] ", step)).await? {
            break;
        }
        match step {
            Step::Research => session.research(pipeline, &progress).await?,
            Step::Write => session.write(pipeline, &progress).await?,
            _ => session.publish(pipeline, &progress).await?,
        }
        if session.status(step) == StepStatus::Failed {
            break;
        }
    }

    // Closing the channel ends the board
    drop(progress);
    drop(broadcaster);
    let _ = board.await;

    println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    Ok(())
}

/// Prints one status line per stage event until the channel closes.
fn spawn_status_board(mut events: broadcast::Receiver<StageEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => eprintln!("{}", status_line(&event)),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn status_line(event: &StageEvent) -> String {
    let mark = match event.status {
        StageStatus::Running => "..",
        StageStatus::Completed => "ok",
        StageStatus::Failed => "!!",
    };
    match &event.error {
        Some(error) => format!("[{}] {}: {}", mark, event.message, error),
        None => format!("[{}] {}", mark, event.message),
    }
}

async fn run_technical(
    config: &Config,
    credentials: Credentials,
    ideas_file: Option<&Path>,
) -> Result<()> {
    let services = Services::from_config(config, credentials)?;
    let scrape_browser = BrowserSession::from_agent_config(&config.agent).into_handle();
    let draft_browser = BrowserSession::from_agent_config(&config.agent)
        .with_allowed_domains(config.publish.allowed_domains.clone())
        .into_handle();
    let pipeline = TechnicalPipeline::new(
        Arc::new(PipelineConfig::from_config(config)),
        services,
        scrape_browser,
        draft_browser,
    );

    let progress = LogProgress;
    let mut state = TechnicalState::new();
    match ideas_file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let ideas = content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            pipeline.run_with_ideas(&mut state, ideas, &progress).await?;
        }
        None => pipeline.run(&mut state, &progress).await?,
    }

    if state.completed_blogs.is_empty() {
        println!("No ideas were selected");
    }
    for (idea, blog) in &state.completed_blogs {
        println!("{}", idea);
        println!("  post:  {}", describe(&blog.blog_post, |p| format!("{} chars", p.len())));
        println!("  draft: {}", describe(&blog.draft, String::clone));
    }
    Ok(())
}

fn fetched_headlines(state: &StandardState) -> Result<Vec<String>> {
    match &state.headlines {
        Some(StageOutput::Ready(list)) => Ok(list.clone()),
        Some(StageOutput::Failed { reason }) => bail!("fetching headlines failed: {}", reason),
        None => bail!("no headlines fetched"),
    }
}

async fn choose_headline(headlines: &[String], pick: Option<usize>) -> Result<String> {
    for (i, headline) in headlines.iter().enumerate() {
        println!("{:>2}. {}", i + 1, headline);
    }

    let index = match pick {
        Some(index) => index,
        None => {
            let answer = prompt("Pick a headline: ").await?;
            answer
                .trim()
                .parse::<usize>()
                .with_context(|| format!("not a number: {}", answer.trim()))?
        }
    };

    index
        .checked_sub(1)
        .and_then(|i| headlines.get(i))
        .cloned()
        .with_context(|| format!("no headline number {}", index))
}

async fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(question).await?;
    Ok(!matches!(answer.trim().to_ascii_lowercase().as_str(), "n" | "no"))
}

async fn prompt(question: &str) -> Result<String> {
    use tokio::io::AsyncWriteExt;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(question.as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(line)
}

fn print_standard_result(state: &StandardState) {
    let line = |label: &str, output: Option<String>| {
        println!("{:<10} {}", label, output.unwrap_or_else(|| "-".to_string()));
    };
    line(
        "research",
        state
            .research
            .as_ref()
            .map(|r| describe(r, |t| format!("{} chars", t.len()))),
    );
    line(
        "post",
        state
            .blog_post
            .as_ref()
            .map(|p| describe(p, |t| format!("{} chars", t.len()))),
    );
    line(
        "status",
        state
            .publish_status
            .as_ref()
            .map(|s| describe(s, String::clone)),
    );
}

fn describe<T>(output: &StageOutput<T>, ready: impl FnOnce(&T) -> String) -> String {
    match output {
        StageOutput::Ready(value) => ready(value),
        StageOutput::Failed { reason } => format!("failed: {}", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogflow::pipeline::{ProgressEvent, ProgressReporter, Stage};

    fn received(event: ProgressEvent) -> StageEvent {
        let broadcaster = ProgressBroadcaster::new(4);
        let mut events = broadcaster.subscribe();
        broadcaster.reporter("cli").report(event);
        events.try_recv().unwrap()
    }

    #[test]
    fn test_status_lines() {
        let running = received(ProgressEvent::started(Stage::Research, "Researching: H1"));
        assert_eq!(status_line(&running), "[..] Researching: H1");

        let failed = received(ProgressEvent::failed(Stage::Publish, "captcha"));
        assert_eq!(status_line(&failed), "[!!] Publishing failed: captcha");
    }

    #[tokio::test]
    async fn test_status_board_stops_when_channel_closes() {
        let broadcaster = ProgressBroadcaster::new(4);
        let board = spawn_status_board(broadcaster.subscribe());
        broadcaster
            .reporter("cli")
            .report(ProgressEvent::completed(Stage::Write, "done"));

        drop(broadcaster);
        tokio::time::timeout(std::time::Duration::from_secs(1), board)
            .await
            .unwrap()
            .unwrap();
    }
}
