//! Pipeline stages for the notes-to-study-guide transformation.
//!
//! Each submodule implements exactly one step, behind a trait where the step
//! touches the network. Keeping stages separate makes each independently
//! testable and lets tests replace the remote services with mocks.
//!
//! ## Data Flow
//!
//! ```text
//! transcribe ──▶ generate ──▶ postprocess ──▶ resources
//! (document →    (raw text →  (sanitize,      (search →
//!  raw text)      markdown)    query)          markdown section)
//! ```
//!
//! 1. [`transcribe`]  — verbatim text extraction from the document payload
//! 2. [`generate`]    — study-guide generation with completion-reason mapping
//! 3. [`postprocess`] — marker-line capture, artifact stripping, query
//!    extraction; all pure functions
//! 4. [`resources`]   — concurrent video/article lookups rendered as the
//!    appended "Recommended Resources" section; never fatal
//!
//! The [`crate::orchestrator`] drives the sequence and owns the state
//! machine exposed to the UI.

pub mod generate;
pub mod postprocess;
pub mod resources;
pub mod transcribe;
