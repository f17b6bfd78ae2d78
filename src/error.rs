//! Error types for the notecraft library.
//!
//! One enum covers the whole pipeline because every fatal error ends the same
//! way: the run aborts and the `Display` string becomes the user-facing
//! message attached to [`crate::state::ProcessingState::Failed`]. There is no
//! partial output to salvage, so no per-stage error payloads are needed.
//!
//! The one *non*-fatal kind, [`StudyGuideError::SearchFailed`], never escapes
//! the resource augmenter — it is rendered into a placeholder line inside the
//! "Recommended Resources" section instead (see
//! [`crate::pipeline::resources`]).

use thiserror::Error;

/// All errors produced by the notecraft pipeline.
#[derive(Debug, Error)]
pub enum StudyGuideError {
    // ── Transcription errors ──────────────────────────────────────────────
    /// The remote transcription call failed (network, HTTP status, decode).
    #[error("Failed to extract text. Please ensure the file is a clear image or PDF. ({reason})")]
    TranscriptionFailed { reason: String },

    /// The transcription call succeeded but returned no usable text.
    #[error("No text identified in the document.")]
    TranscriptionEmpty,

    /// Transcription returned text, but too little to build a study guide
    /// from. Raised by the orchestrator, not the stage: the minimum-length
    /// policy is a pipeline decision, not a transport one.
    #[error("Could not detect enough text. Please try a clearer image or document.")]
    TranscriptionInsufficient,

    // ── Generation errors ─────────────────────────────────────────────────
    /// The generation call failed, or completed for a non-normal reason
    /// (content filtered, length-truncated, prompt blocked).
    #[error("Failed to generate study material: {reason}")]
    GenerationFailed { reason: String },

    /// The generation call returned no text and no diagnosable reason.
    #[error("Empty response from the generation service.")]
    GenerationEmpty,

    // ── Search errors ─────────────────────────────────────────────────────
    /// A resource lookup failed. Always recovered inside the augmenter;
    /// never surfaces as a pipeline failure.
    #[error("Resource search failed: {reason}")]
    SearchFailed { reason: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_text_display_is_the_user_message() {
        let e = StudyGuideError::TranscriptionInsufficient;
        assert_eq!(
            e.to_string(),
            "Could not detect enough text. Please try a clearer image or document."
        );
    }

    #[test]
    fn generation_failed_display_names_the_reason() {
        let e = StudyGuideError::GenerationFailed {
            reason: "Generation stopped: SAFETY".into(),
        };
        assert!(e.to_string().contains("SAFETY"));
    }

    #[test]
    fn transcription_failed_display_keeps_detail() {
        let e = StudyGuideError::TranscriptionFailed {
            reason: "HTTP 503".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("clear image or PDF"));
        assert!(msg.contains("HTTP 503"));
    }
}
