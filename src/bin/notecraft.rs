//! CLI binary for notecraft.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig`, renders pipeline state as a terminal progress bar, and
//! prints the resulting markdown.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use notecraft::{
    Document, PipelineConfig, PipelineObserver, ProcessingState, StudyPipeline,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (stdout)
  notecraft notes.png

  # Write the study guide to a file
  notecraft notes.pdf -o guide.md

  # Also dump the raw transcription
  notecraft notes.jpg --raw-text raw.txt -o guide.md

  # Without a Serper key the guide still builds; the resources
  # section carries a configuration note instead of links.
  notecraft notes.png

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY     Google Gemini API key (required)
  SERPER_API_KEY     Serper search API key (optional — enables resources)

SETUP:
  1. Set API key:  export GEMINI_API_KEY=AIza...
  2. Convert:      notecraft notes.png -o guide.md
"#;

/// Turn photos and PDFs of handwritten notes into structured study guides.
#[derive(Parser, Debug)]
#[command(
    name = "notecraft",
    version,
    about = "Turn photos and PDFs of handwritten notes into structured study guides",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image (png, jpg, webp) or PDF of the notes.
    input: PathBuf,

    /// Write the study guide to this file instead of stdout.
    #[arg(short, long, env = "NOTECRAFT_OUTPUT")]
    output: Option<PathBuf>,

    /// Also write the raw transcribed text to this file.
    #[arg(long)]
    raw_text: Option<PathBuf>,

    /// Gemini model ID.
    #[arg(long, env = "NOTECRAFT_MODEL", default_value = notecraft::DEFAULT_MODEL)]
    model: String,

    /// Generation temperature (0.0–2.0).
    #[arg(long, env = "NOTECRAFT_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Per-remote-call timeout in seconds.
    #[arg(long, env = "NOTECRAFT_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Disable the progress bar.
    #[arg(long, env = "NOTECRAFT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "NOTECRAFT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the markdown itself.
    #[arg(short, long, env = "NOTECRAFT_QUIET")]
    quiet: bool,
}

/// Terminal observer: one bar for the transcription phase, a spinner for
/// generation.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Reading");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl PipelineObserver for CliObserver {
    fn on_state_change(&self, state: &ProcessingState) {
        match state {
            ProcessingState::TranscribingDocument {
                progress_percent,
                message,
            } => {
                self.bar.set_position(u64::from(*progress_percent));
                self.bar.set_message(message.clone());
            }
            ProcessingState::GeneratingContent { message } => {
                self.bar.set_prefix("Structuring");
                self.bar.set_position(100);
                self.bar.set_message(message.clone());
            }
            ProcessingState::Complete => self.bar.finish_and_clear(),
            ProcessingState::Failed { .. } => self.bar.abandon_with_message("failed"),
            ProcessingState::Idle => {}
        }
    }
}

/// Map a file extension to the media type the transcription service expects.
fn detect_mime(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    Ok(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        other => bail!("unsupported input type '.{other}' (expected png, jpg, webp, gif, or pdf)"),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.quiet || show_progress {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();

    let gemini_key = std::env::var("GEMINI_API_KEY")
        .context("GEMINI_API_KEY is not set — get a key at https://aistudio.google.com")?;
    let serper_key = std::env::var("SERPER_API_KEY").unwrap_or_default();

    let config = PipelineConfig::builder()
        .gemini_api_key(gemini_key)
        .serper_api_key(serper_key)
        .model(&cli.model)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout)
        .build()?;

    let mime = detect_mime(&cli.input)?;
    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read '{}'", cli.input.display()))?;

    let mut pipeline = StudyPipeline::new(config)?;
    if show_progress {
        pipeline = pipeline.observer(CliObserver::new());
    }

    let material = pipeline
        .submit(Document::new(bytes, mime))
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if let Some(path) = &cli.raw_text {
        std::fs::write(path, &material.raw_transcribed_text)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
    }

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &material.final_markdown)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            if !cli.quiet {
                eprintln!("✔ study guide written to {}", path.display());
            }
        }
        None => println!("{}", material.final_markdown),
    }

    Ok(())
}
