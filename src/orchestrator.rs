//! Pipeline orchestrator: drives the full note → study-guide sequence and
//! owns the [`ProcessingState`] machine exposed to the UI.
//!
//! ## Algorithm
//!
//! 1. `TranscribingDocument { 0, … }` — transcription call with a
//!    [`ProgressSimulator`] ticking simulated progress into the state; the
//!    simulator is bound to the call's scope, so both exit paths cancel it
//!    (success additionally forces the terminal 100). Output shorter than
//!    5 trimmed characters fails the run before generation is ever invoked.
//! 2. `GeneratingContent { … }` — generation call, sanitisation, query
//!    extraction, resource augmentation, then body + resources concatenation.
//! 3. `Complete` — the [`StudyMaterial`] is stored and returned.
//!
//! Any error from steps 1–2 is caught once at the boundary and mapped to
//! `Failed { error_message }` with the error's own message verbatim. No
//! retries, no partial output: a failed run produces no markdown.
//!
//! One logical run at a time per pipeline instance. No stage holds the state
//! lock across an await; progress ticks take it briefly from the simulator
//! task and ignore ticks that arrive after transcription has ended.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::StudyGuideError;
use crate::gemini::GeminiClient;
use crate::pipeline::generate::{generate_study_guide, ContentGenerator};
use crate::pipeline::postprocess::{extract_search_query, sanitize, split_search_query};
use crate::pipeline::resources::{augment, ResourceSearch};
use crate::pipeline::transcribe::{transcribe_document, DocumentTranscriber};
use crate::progress::{NoopObserver, PipelineObserver, ProgressSimulator, ProgressSink};
use crate::serper::SerperClient;
use crate::state::{Document, ProcessingState, StudyMaterial};

const TRANSCRIBING_MESSAGE: &str = "Extracting text from document...";
const GENERATING_MESSAGE: &str = "Structuring content with AI...";
const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred.";

/// Minimum trimmed transcription length to proceed to generation.
const MIN_TRANSCRIPTION_CHARS: usize = 5;

/// The two-stage pipeline with its externally visible state machine.
pub struct StudyPipeline {
    config: PipelineConfig,
    transcriber: Arc<dyn DocumentTranscriber>,
    generator: Arc<dyn ContentGenerator>,
    search: Option<Arc<dyn ResourceSearch>>,
    observer: Arc<dyn PipelineObserver>,
    state: Arc<Mutex<ProcessingState>>,
    material: Mutex<Option<StudyMaterial>>,
}

impl std::fmt::Debug for StudyPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudyPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StudyPipeline {
    /// Build a pipeline backed by the real Gemini and Serper clients.
    ///
    /// # Errors
    /// [`StudyGuideError::InvalidConfig`] when the Gemini key is missing or
    /// a client cannot be constructed. An absent Serper key is not an error;
    /// it selects the degraded no-resources mode.
    pub fn new(config: PipelineConfig) -> Result<Self, StudyGuideError> {
        let gemini = Arc::new(GeminiClient::new(&config)?);
        let search = SerperClient::from_config(&config)?
            .map(|c| Arc::new(c) as Arc<dyn ResourceSearch>);
        Ok(Self::with_services(config, gemini.clone(), gemini, search))
    }

    /// Build a pipeline over caller-provided service implementations.
    ///
    /// This is the seam tests use to substitute mocks for the remote
    /// services; `search: None` reproduces the missing-credential mode.
    pub fn with_services(
        config: PipelineConfig,
        transcriber: Arc<dyn DocumentTranscriber>,
        generator: Arc<dyn ContentGenerator>,
        search: Option<Arc<dyn ResourceSearch>>,
    ) -> Self {
        Self {
            config,
            transcriber,
            generator,
            search,
            observer: Arc::new(NoopObserver),
            state: Arc::new(Mutex::new(ProcessingState::Idle)),
            material: Mutex::new(None),
        }
    }

    /// Attach an observer that receives every state transition.
    pub fn observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Current pipeline state.
    pub fn state(&self) -> ProcessingState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The stored result of the last successful run, if any.
    pub fn material(&self) -> Option<StudyMaterial> {
        self.material
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Return to `Idle` and discard all produced data.
    ///
    /// Intended for the `Complete` and `Failed` states; the UI is expected
    /// not to offer reset while a stage is in flight.
    pub fn reset(&self) {
        *self.material.lock().unwrap_or_else(|e| e.into_inner()) = None;
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = ProcessingState::Idle;
        self.observer.on_state_change(&ProcessingState::Idle);
    }

    /// Run the full pipeline on one document.
    ///
    /// Drives the state machine from `Idle` through to `Complete` or
    /// `Failed`; a terminal state from a previous run is cleared first.
    pub async fn submit(&self, document: Document) -> Result<StudyMaterial, StudyGuideError> {
        if !self.state().is_active() {
            self.reset();
        }
        self.set_state(ProcessingState::TranscribingDocument {
            progress_percent: 0,
            message: TRANSCRIBING_MESSAGE.to_string(),
        });

        match self.run(document).await {
            Ok(material) => {
                self.set_state(ProcessingState::Complete);
                *self.material.lock().unwrap_or_else(|e| e.into_inner()) =
                    Some(material.clone());
                info!(
                    markdown_bytes = material.final_markdown.len(),
                    "pipeline complete"
                );
                Ok(material)
            }
            Err(e) => {
                let mut error_message = e.to_string();
                if error_message.trim().is_empty() {
                    error_message = GENERIC_FAILURE_MESSAGE.to_string();
                }
                warn!(%error_message, "pipeline failed");
                self.set_state(ProcessingState::Failed { error_message });
                Err(e)
            }
        }
    }

    async fn run(&self, document: Document) -> Result<StudyMaterial, StudyGuideError> {
        // ── Stage 1: transcription with simulated progress ───────────────
        info!(mime = %document.mime_type, "stage 1: transcription");
        let simulator = ProgressSimulator::start(
            self.config.progress_ceiling,
            Duration::from_millis(self.config.progress_tick_ms),
            self.transcribing_sink(),
        );
        // `?` drops the simulator, cancelling the ticker on the error path.
        let raw_text = transcribe_document(self.transcriber.as_ref(), &document).await?;
        simulator.complete().await;

        if raw_text.trim().chars().count() < MIN_TRANSCRIPTION_CHARS {
            return Err(StudyGuideError::TranscriptionInsufficient);
        }

        // ── Stage 2: generation, cleanup, resources ──────────────────────
        info!("stage 2: generation");
        self.set_state(ProcessingState::GeneratingContent {
            message: GENERATING_MESSAGE.to_string(),
        });
        let generated = generate_study_guide(self.generator.as_ref(), &raw_text).await?;

        let query = extract_search_query(&generated);
        let (body, _marker) = split_search_query(&generated);
        let body = sanitize(&body);

        let resources = augment(
            self.search.as_deref(),
            &query,
            self.config.resources_per_kind,
        )
        .await;

        Ok(StudyMaterial {
            raw_transcribed_text: raw_text,
            final_markdown: format!("{body}{resources}"),
        })
    }

    /// Progress sink that folds simulator ticks into the transcribing state.
    ///
    /// Ticks arriving after the state has moved on are dropped; the lock is
    /// held only for the assignment, never across the observer call's own
    /// downstream work or an await.
    fn transcribing_sink(&self) -> ProgressSink {
        let state = Arc::clone(&self.state);
        let observer = Arc::clone(&self.observer);
        Arc::new(move |progress_percent| {
            let next = {
                let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
                if !matches!(*guard, ProcessingState::TranscribingDocument { .. }) {
                    return;
                }
                let next = ProcessingState::TranscribingDocument {
                    progress_percent,
                    message: TRANSCRIBING_MESSAGE.to_string(),
                };
                *guard = next.clone();
                next
            };
            observer.on_state_change(&next);
        })
    }

    fn set_state(&self, next: ProcessingState) {
        {
            let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
            debug_assert!(
                guard.can_transition_to(&next),
                "illegal state transition: {guard:?} -> {next:?}"
            );
            *guard = next.clone();
        }
        self.observer.on_state_change(&next);
    }
}
