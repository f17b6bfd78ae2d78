//! Configuration for the study-guide pipeline.
//!
//! All behaviour is controlled through [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. Credentials are injected here explicitly rather
//! than read from the environment deep inside the call stack — tests swap in
//! fake keys (or none) per case, and the degraded no-search-credential mode
//! is just `serper_api_key: None`.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor breaks on every new knob. The builder lets
//! callers set only what they care about and rely on documented defaults.

use crate::error::StudyGuideError;

/// Default Gemini model for both transcription and generation.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for a [`crate::orchestrator::StudyPipeline`].
///
/// # Example
/// ```rust
/// use notecraft::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .gemini_api_key("AIza...")
///     .serper_api_key("serper-key")
///     .temperature(0.3)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Gemini API key. Required for the built-in transcription and
    /// generation clients; unused when custom service impls are injected.
    pub gemini_api_key: String,

    /// Serper search API key. `None` is a recognised degraded mode: resource
    /// augmentation is skipped entirely and a configuration-missing
    /// placeholder is emitted instead (no network calls are made).
    pub serper_api_key: Option<String>,

    /// Gemini model identifier used for both pipeline stages.
    /// Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Sampling temperature for the generation stage. Default: 0.3.
    ///
    /// Low temperature keeps the study-guide structure consistent between
    /// runs on the same notes. Transcription always uses 0.0 regardless —
    /// verbatim extraction wants determinism.
    pub temperature: f32,

    /// Maximum tokens the generation call may produce. Default: 8192.
    ///
    /// Dense lecture notes expand a lot once prerequisites, examples and
    /// summaries are added; 8192 covers that comfortably.
    pub max_output_tokens: u32,

    /// Per-remote-call timeout in seconds, applied by the HTTP client to
    /// every Gemini and Serper request. Default: 60.
    ///
    /// The base design had no deadline at all, which let one hanging call
    /// block the pipeline forever. Expiry surfaces as the owning stage's
    /// failure and therefore as a `Failed` transition.
    pub api_timeout_secs: u64,

    /// Ceiling the simulated transcription progress approaches but never
    /// reaches while the call is pending. Default: 90.
    pub progress_ceiling: f64,

    /// Interval between simulated progress ticks in milliseconds.
    /// Default: 300.
    pub progress_tick_ms: u64,

    /// Maximum resource entries requested per category. Default: 3.
    pub resources_per_kind: usize,

    /// Base URL of the Gemini API. Overridable for tests against a local
    /// mock server. Default: `https://generativelanguage.googleapis.com`.
    pub gemini_base_url: String,

    /// Base URL of the Serper API. Default: `https://google.serper.dev`.
    pub serper_base_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            serper_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_output_tokens: 8192,
            api_timeout_secs: 60,
            progress_ceiling: 90.0,
            progress_tick_ms: 300,
            resources_per_kind: 3,
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            serper_base_url: "https://google.serper.dev".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a new builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn gemini_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.gemini_api_key = key.into();
        self
    }

    pub fn serper_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.serper_api_key = if key.is_empty() { None } else { Some(key) };
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn progress_ceiling(mut self, ceiling: f64) -> Self {
        self.config.progress_ceiling = ceiling;
        self
    }

    pub fn progress_tick_ms(mut self, ms: u64) -> Self {
        self.config.progress_tick_ms = ms.max(1);
        self
    }

    pub fn resources_per_kind(mut self, n: usize) -> Self {
        self.config.resources_per_kind = n;
        self
    }

    pub fn gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gemini_base_url = url.into();
        self
    }

    pub fn serper_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.serper_base_url = url.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, StudyGuideError> {
        let c = &self.config;
        if !(c.progress_ceiling > 0.0 && c.progress_ceiling < 100.0) {
            return Err(StudyGuideError::InvalidConfig(format!(
                "progress ceiling must be in (0, 100), got {}",
                c.progress_ceiling
            )));
        }
        if c.model.is_empty() {
            return Err(StudyGuideError::InvalidConfig("model must not be empty".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(StudyGuideError::InvalidConfig(
                "api timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
