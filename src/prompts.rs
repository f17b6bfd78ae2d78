//! Prompts for the two Gemini calls.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the study-guide structure or the
//!    transcription rules means editing exactly one place.
//!
//! 2. **Testability** — the sanitizer and query extractor are written against
//!    the marker contract defined here (`SEARCH_QUERY:`), and unit tests can
//!    assert the prompt actually demands that marker without calling a model.

/// Instruction sent alongside the document payload in the transcription call.
///
/// Verbatim extraction only: the generation stage owns all restructuring, so
/// anything the transcriber adds (summaries, invented headings) is noise.
pub const TRANSCRIPTION_PROMPT: &str = "Transcribe the text from this document verbatim. \
Return ONLY the raw text found in the document. Do not summarize, explain, or add \
markdown formatting unless it exists in the original text.";

/// The marker prefix the generation prompt demands on its final line.
///
/// [`crate::pipeline::postprocess`] captures and strips this line; keep the
/// two in sync.
pub const SEARCH_QUERY_MARKER: &str = "SEARCH_QUERY:";

/// System instruction for the study-guide generation call.
///
/// Rules 1 and 2 exist because reasoning-trace and tool-call echoes have been
/// observed leaking into output; the sanitizer strips them when they slip
/// through anyway. Rule 3 keeps the resources section out of the generated
/// body — it is appended programmatically by the resource augmenter so its
/// links are real, not hallucinated.
pub const STUDY_GUIDE_SYSTEM_PROMPT: &str = r#"
You are an expert educational content creator and tutor. Your goal is to transform raw, potentially messy handwritten notes into structured, high-quality study materials.

**OUTPUT RULES:**
1.  **NO INTERNAL THOUGHTS:** Do NOT output "thought" or reasoning steps.
2.  **MARKDOWN ONLY:** Start directly with the Markdown content.
3.  **NO RESOURCES YET:** Do NOT generate the "Recommended Resources" section yet. I will add that later programmatically.
4.  **SEARCH QUERY:** At the very end of your response, on a new line, strictly output: "SEARCH_QUERY: <Best search query for this topic>"

Output Structure:
# [Title of Topic Detected]

## 📋 Prerequisites
*List 3-5 key concepts needed.*

## 📝 Structured Notes
*Organize the content logically with bolding and bullet points.*

## 💡 Key Examples
*Provide 1-2 concrete examples.*

## 🎯 Summary
*Concise summary.*

## 🚀 Next Steps
*Actionable items.*

SEARCH_QUERY: [Insert Topic Here]
"#;

/// Build the user-turn content for the generation call.
pub fn generation_user_prompt(raw_text: &str) -> String {
    format!(
        "Transform these handwritten notes into a study guide:\n\n{}",
        raw_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_demands_the_marker() {
        assert!(STUDY_GUIDE_SYSTEM_PROMPT.contains(SEARCH_QUERY_MARKER));
    }

    #[test]
    fn system_prompt_reserves_resources_section() {
        assert!(STUDY_GUIDE_SYSTEM_PROMPT.contains("Recommended Resources"));
    }

    #[test]
    fn user_prompt_embeds_the_notes() {
        let p = generation_user_prompt("F = ma");
        assert!(p.ends_with("F = ma"));
        assert!(p.starts_with("Transform these handwritten notes"));
    }
}
