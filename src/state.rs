//! Pipeline state machine and output types.
//!
//! [`ProcessingState`] is a sum type rather than a struct of optionals so
//! illegal combinations (a progress value on a completed run, an error
//! message on an idle one) cannot be represented. The UI layer consumes it
//! directly; each variant carries exactly the payload that phase needs.

use serde::{Deserialize, Serialize};

/// A document submitted to the pipeline: raw bytes plus the declared
/// media type (e.g. `image/png`, `application/pdf`).
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Document {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Externally visible pipeline progress, one active state at a time.
///
/// Legal transitions are strictly forward:
///
/// ```text
/// Idle ──▶ TranscribingDocument ──▶ GeneratingContent ──▶ Complete
///                   │                       │                 │
///                   └──────▶ Failed ◀───────┘                 │
///                               │                             │
///                               └────────▶ Idle ◀─────────────┘   (reset)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingState {
    /// Nothing submitted yet, or the pipeline was reset.
    Idle,
    /// The transcription call is in flight. `progress_percent` comes from
    /// the simulated-progress ticker (0–100).
    TranscribingDocument {
        progress_percent: u8,
        message: String,
    },
    /// The generation call is in flight. No progress value exists for this
    /// phase, only a status message.
    GeneratingContent { message: String },
    /// A run finished; the result is available from the orchestrator.
    Complete,
    /// A run aborted. `error_message` is shown to the user verbatim.
    Failed { error_message: String },
}

impl ProcessingState {
    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Progress updates within `TranscribingDocument` count as legal
    /// self-transitions. `Idle` is reachable only from terminal states.
    pub fn can_transition_to(&self, next: &ProcessingState) -> bool {
        use ProcessingState::*;
        match (self, next) {
            (Idle, TranscribingDocument { .. }) => true,
            (TranscribingDocument { .. }, TranscribingDocument { .. }) => true,
            (TranscribingDocument { .. }, GeneratingContent { .. }) => true,
            (GeneratingContent { .. }, Complete) => true,
            (TranscribingDocument { .. }, Failed { .. }) => true,
            (GeneratingContent { .. }, Failed { .. }) => true,
            (Complete, Idle) => true,
            (Failed { .. }, Idle) => true,
            _ => false,
        }
    }

    /// True while a stage is in flight.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ProcessingState::TranscribingDocument { .. } | ProcessingState::GeneratingContent { .. }
        )
    }
}

/// The final output of a successful run.
///
/// Immutable once created; discarded on reset. `raw_transcribed_text` is
/// kept so the UI can offer a "view extracted text" toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyMaterial {
    pub raw_transcribed_text: String,
    pub final_markdown: String,
}

/// Category of an external learning resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Video,
    Article,
}

/// One search hit from the resource lookup, in service order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub kind: ResourceKind,
    pub title: String,
    pub url: String,
}
