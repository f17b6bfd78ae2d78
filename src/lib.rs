//! # notecraft
//!
//! Turn a photo or PDF of handwritten notes into a structured study guide
//! using two chained AI calls, with web-sourced learning resources appended.
//!
//! ## Why this crate?
//!
//! Classic OCR gives you a wall of raw text. Students want structure:
//! prerequisites, organised notes, worked examples, a summary, and somewhere
//! to go next. notecraft chains a multimodal transcription call (verbatim
//! text extraction) with a generation call (study-guide markdown), then
//! augments the result with real video and article links from a search API —
//! real links, because models hallucinate URLs when asked to invent them.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document (image/PDF bytes)
//!  │
//!  ├─ 1. Transcribe  multimodal call, verbatim text; simulated progress
//!  ├─ 2. Generate    study-guide markdown + trailing SEARCH_QUERY marker
//!  ├─ 3. Postprocess capture/strip the marker, strip leaked artifacts
//!  ├─ 4. Resources   concurrent video + article search → appended section
//!  └─ 5. Output      StudyMaterial { raw text, final markdown }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notecraft::{Document, PipelineConfig, StudyPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder()
//!         .gemini_api_key(std::env::var("GEMINI_API_KEY")?)
//!         .serper_api_key(std::env::var("SERPER_API_KEY").unwrap_or_default())
//!         .build()?;
//!
//!     let pipeline = StudyPipeline::new(config)?;
//!     let bytes = std::fs::read("notes.png")?;
//!     let material = pipeline.submit(Document::new(bytes, "image/png")).await?;
//!     println!("{}", material.final_markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## State machine
//!
//! The pipeline exposes [`ProcessingState`] to the host UI: `Idle` →
//! `TranscribingDocument` (with simulated 0–100 progress) →
//! `GeneratingContent` → `Complete`, with `Failed` reachable from either
//! working state. Attach a [`PipelineObserver`] to receive every transition.
//!
//! ## Degraded modes
//!
//! A missing Serper key is not an error: the pipeline still succeeds and the
//! resources section carries a configuration-missing note instead of links.
//! A failed resource lookup likewise never fails the run.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `notecraft` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! notecraft = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod gemini;
pub mod orchestrator;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod serper;
pub mod state;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder, DEFAULT_MODEL};
pub use error::StudyGuideError;
pub use orchestrator::StudyPipeline;
pub use pipeline::generate::{ContentGenerator, GenerationOutcome};
pub use pipeline::resources::ResourceSearch;
pub use pipeline::transcribe::DocumentTranscriber;
pub use progress::{NoopObserver, PipelineObserver, ProgressSimulator, ProgressSink};
pub use state::{Document, ProcessingState, ResourceEntry, ResourceKind, StudyMaterial};
