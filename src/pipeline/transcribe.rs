//! Transcription stage: document payload → verbatim extracted text.
//!
//! The stage is split across a seam: [`DocumentTranscriber`] is the remote
//! call (payload encoding, request, response decoding — see
//! [`crate::gemini::GeminiClient`]), while [`transcribe_document`] owns the
//! stage-level policy of what counts as a usable result. Tests inject mock
//! transcribers through the trait.

use async_trait::async_trait;
use tracing::debug;

use crate::error::StudyGuideError;
use crate::state::Document;

/// The remote transcription call.
///
/// Implementations return the raw text the service extracted, which may be
/// empty — emptiness is judged by the stage, not the transport.
#[async_trait]
pub trait DocumentTranscriber: Send + Sync {
    /// Transcribe the document verbatim.
    ///
    /// # Errors
    /// [`StudyGuideError::TranscriptionFailed`] on network or service
    /// failure.
    async fn transcribe(&self, document: &Document) -> Result<String, StudyGuideError>;
}

/// Run the transcription stage.
///
/// # Errors
/// - [`StudyGuideError::TranscriptionFailed`] — propagated from the service.
/// - [`StudyGuideError::TranscriptionEmpty`] — the call succeeded but no
///   usable text came back.
///
/// The minimum-length policy (≥ 5 trimmed characters) is *not* applied here;
/// it belongs to the orchestrator, which owns pipeline-level judgements over
/// stage output.
pub async fn transcribe_document(
    transcriber: &dyn DocumentTranscriber,
    document: &Document,
) -> Result<String, StudyGuideError> {
    debug!(
        bytes = document.bytes.len(),
        mime = %document.mime_type,
        "transcribing document"
    );
    let text = transcriber.transcribe(document).await?;
    if text.trim().is_empty() {
        return Err(StudyGuideError::TranscriptionEmpty);
    }
    debug!(chars = text.len(), "transcription complete");
    Ok(text)
}
