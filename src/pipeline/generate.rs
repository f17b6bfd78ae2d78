//! Content-generation stage: raw transcribed text → study-guide markdown.
//!
//! The trait carries the completion reason alongside the text so the stage
//! can tell three outcomes apart: usable text, a diagnosable stop (content
//! filtered, length-truncated, prompt blocked) and a silent empty response.
//! The distinction matters to the user — "Generation stopped: SAFETY" is
//! actionable, "empty response" is not.

use async_trait::async_trait;
use tracing::debug;

use crate::error::StudyGuideError;

/// The completion reason Gemini reports for a normal stop.
pub const NORMAL_STOP: &str = "STOP";

/// Result of one generation call, before stage-level interpretation.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    /// Concatenated text parts, if any came back.
    pub text: Option<String>,
    /// Service-reported reason generation stopped (`STOP`, `SAFETY`,
    /// `MAX_TOKENS`, ...), when available.
    pub completion_reason: Option<String>,
}

/// The remote generation call.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Transform raw notes into study-guide markdown.
    ///
    /// # Errors
    /// [`StudyGuideError::GenerationFailed`] on network or service failure.
    async fn generate(&self, raw_text: &str) -> Result<GenerationOutcome, StudyGuideError>;
}

/// Run the generation stage and interpret the outcome.
///
/// # Errors
/// - [`StudyGuideError::GenerationFailed`] — call failed, or it returned no
///   text for a non-normal completion reason.
/// - [`StudyGuideError::GenerationEmpty`] — no text and no diagnosable
///   reason.
pub async fn generate_study_guide(
    generator: &dyn ContentGenerator,
    raw_text: &str,
) -> Result<String, StudyGuideError> {
    let outcome = generator.generate(raw_text).await?;

    if let Some(text) = outcome.text.filter(|t| !t.trim().is_empty()) {
        debug!(chars = text.len(), "generation complete");
        return Ok(text);
    }

    match outcome.completion_reason {
        Some(reason) if reason != NORMAL_STOP => Err(StudyGuideError::GenerationFailed {
            reason: format!("Generation stopped: {reason}"),
        }),
        _ => Err(StudyGuideError::GenerationEmpty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGenerator(GenerationOutcome);

    #[async_trait]
    impl ContentGenerator for FixedGenerator {
        async fn generate(&self, _raw_text: &str) -> Result<GenerationOutcome, StudyGuideError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn text_passes_through() {
        let g = FixedGenerator(GenerationOutcome {
            text: Some("# Newton's Laws\n\nNotes.".into()),
            completion_reason: Some(NORMAL_STOP.into()),
        });
        let text = generate_study_guide(&g, "raw").await.unwrap();
        assert!(text.starts_with("# Newton's Laws"));
    }

    #[tokio::test]
    async fn abnormal_stop_reason_surfaces() {
        let g = FixedGenerator(GenerationOutcome {
            text: None,
            completion_reason: Some("SAFETY".into()),
        });
        let err = generate_study_guide(&g, "raw").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to generate study material: Generation stopped: SAFETY"
        );
    }

    #[tokio::test]
    async fn empty_with_normal_stop_is_generation_empty() {
        let g = FixedGenerator(GenerationOutcome {
            text: Some("   ".into()),
            completion_reason: Some(NORMAL_STOP.into()),
        });
        let err = generate_study_guide(&g, "raw").await.unwrap_err();
        assert!(matches!(err, StudyGuideError::GenerationEmpty));
    }

    #[tokio::test]
    async fn empty_with_no_reason_is_generation_empty() {
        let g = FixedGenerator(GenerationOutcome::default());
        let err = generate_study_guide(&g, "raw").await.unwrap_err();
        assert!(matches!(err, StudyGuideError::GenerationEmpty));
    }
}
