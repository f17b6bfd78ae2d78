//! Post-processing of generated study-guide text: query extraction and
//! artifact sanitisation.
//!
//! ## Why is post-processing necessary?
//!
//! Even well-prompted models occasionally disobey the output rules in
//! [`crate::prompts::STUDY_GUIDE_SYSTEM_PROMPT`]:
//!
//! - the `SEARCH_QUERY:` marker line is machine-readable plumbing and must
//!   never reach the rendered guide;
//! - tool-invocation echoes (`tool_code`, `print(`) or reasoning traces
//!   (`thought`) sometimes leak in *before* the first heading.
//!
//! Every function here is pure (`&str → value`) with no shared state, and
//! the extractor is an ordered list of matchers where the first hit wins —
//! the same layered-fallback shape as the cleanup rules this module grew
//! out of. Sanitisation never touches well-formed content: absence of
//! artifact markers means the input passes through unchanged, which also
//! makes [`sanitize`] idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::prompts::SEARCH_QUERY_MARKER;

/// Query used when neither the marker line nor a title heading is present.
pub const DEFAULT_SEARCH_QUERY: &str = "Educational topic from notes";

// Both marker regexes derive from the prompt constant so the instruction
// text and the stripping rules cannot drift apart.
static RE_MARKER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?m)^{}[ \t]*(.*)$",
        regex::escape(SEARCH_QUERY_MARKER)
    ))
    .expect("valid regex")
});

static RE_TRAILING_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\n?{}[^\n]*\s*\z",
        regex::escape(SEARCH_QUERY_MARKER)
    ))
    .expect("valid regex")
});

static RE_TITLE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#[ \t]+(.+)$").expect("valid regex"));

/// Markers whose presence before the first heading identifies a leaked
/// non-content block. Matched case-insensitively.
const ARTIFACT_MARKERS: [&str; 3] = ["tool_code", "thought", "print("];

// ── Query extraction ─────────────────────────────────────────────────────

/// Extract the best search query from generated text.
///
/// Prioritised strategies, first match wins:
/// 1. explicit `SEARCH_QUERY: <value>` marker line (last one, if repeated);
/// 2. first top-level `# <title>` heading;
/// 3. [`DEFAULT_SEARCH_QUERY`].
///
/// Total: always returns a non-empty string.
pub fn extract_search_query(text: &str) -> String {
    let matchers: [fn(&str) -> Option<String>; 2] = [marker_query, title_query];
    matchers
        .iter()
        .find_map(|m| m(text))
        .unwrap_or_else(|| DEFAULT_SEARCH_QUERY.to_string())
}

fn marker_query(text: &str) -> Option<String> {
    RE_MARKER_LINE
        .captures_iter(text)
        .last()
        .map(|caps| caps[1].trim().to_string())
        .filter(|q| !q.is_empty())
}

fn title_query(text: &str) -> Option<String> {
    RE_TITLE_HEADING
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|q| !q.is_empty())
}

// ── Sanitisation ─────────────────────────────────────────────────────────

/// Split generated text into the display body and the captured search query.
///
/// The trailing marker line is removed from the body; the query value is
/// returned separately so the caller can hand it to the resource augmenter.
/// A missing marker yields `None` and the body unchanged (minus outer
/// whitespace).
pub fn split_search_query(text: &str) -> (String, Option<String>) {
    let query = marker_query(text);
    let body = RE_TRAILING_MARKER.replace(text, "").trim().to_string();
    (body, query)
}

/// Strip leaked model artifacts from the start of generated text.
///
/// Drops everything before the first markdown heading, but only when that
/// prefix contains a known artifact marker — ordinary prose before a heading
/// is left alone. No heading, or no markers, means no modification.
pub fn sanitize(text: &str) -> String {
    strip_leading_artifacts(text).trim().to_string()
}

fn strip_leading_artifacts(text: &str) -> &str {
    let Some(heading_at) = first_heading_offset(text) else {
        return text;
    };
    if heading_at == 0 {
        return text;
    }
    let prefix = text[..heading_at].to_lowercase();
    if ARTIFACT_MARKERS.iter().any(|m| prefix.contains(m)) {
        &text[heading_at..]
    } else {
        text
    }
}

/// Byte offset of the first line that starts a markdown heading.
fn first_heading_offset(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            // Offset of the line itself, including its leading indentation.
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── extract_search_query ────────────────────────────────────────────

    #[test]
    fn marker_line_wins() {
        let text = "# Graph Theory Basics\n\nNotes here.\n\nSEARCH_QUERY: Binary Search Trees";
        assert_eq!(extract_search_query(text), "Binary Search Trees");
    }

    #[test]
    fn extraction_uses_the_prompt_marker_constant() {
        let text = format!("body\n{SEARCH_QUERY_MARKER} Linear Algebra");
        assert_eq!(extract_search_query(&text), "Linear Algebra");
        let (body, query) = split_search_query(&text);
        assert_eq!(body, "body");
        assert_eq!(query.as_deref(), Some("Linear Algebra"));
    }

    #[test]
    fn title_heading_is_the_fallback() {
        let text = "# Graph Theory Basics\n\nNotes without a marker.";
        assert_eq!(extract_search_query(text), "Graph Theory Basics");
    }

    #[test]
    fn default_when_neither_present() {
        assert_eq!(extract_search_query("plain text, no structure"), DEFAULT_SEARCH_QUERY);
        assert_eq!(extract_search_query(""), DEFAULT_SEARCH_QUERY);
    }

    #[test]
    fn marker_value_is_trimmed() {
        let text = "body\nSEARCH_QUERY:    Newton's Laws   ";
        assert_eq!(extract_search_query(text), "Newton's Laws");
    }

    #[test]
    fn empty_marker_falls_through_to_title() {
        let text = "# Thermodynamics\n\nSEARCH_QUERY:";
        assert_eq!(extract_search_query(text), "Thermodynamics");
    }

    #[test]
    fn subheading_does_not_count_as_title() {
        let text = "## Section Only\ncontent";
        assert_eq!(extract_search_query(text), DEFAULT_SEARCH_QUERY);
    }

    // ── split_search_query ──────────────────────────────────────────────

    #[test]
    fn marker_line_is_removed_from_body() {
        let text = "# Title\n\nBody text.\n\nSEARCH_QUERY: Newton's Laws\n";
        let (body, query) = split_search_query(text);
        assert_eq!(query.as_deref(), Some("Newton's Laws"));
        assert!(!body.contains("SEARCH_QUERY"));
        assert!(body.ends_with("Body text."));
    }

    #[test]
    fn body_unchanged_without_marker() {
        let text = "# Title\n\nBody text.";
        let (body, query) = split_search_query(text);
        assert_eq!(query, None);
        assert_eq!(body, text);
    }

    // ── sanitize ────────────────────────────────────────────────────────

    #[test]
    fn strips_tool_call_echo_before_heading() {
        let text = "tool_code\nprint(search(\"x\"))\n\n# Photosynthesis\n\nContent.";
        let clean = sanitize(text);
        assert!(clean.starts_with("# Photosynthesis"));
        assert!(!clean.contains("tool_code"));
    }

    #[test]
    fn strips_reasoning_trace_before_heading() {
        let text = "Thought: the user wants a study guide.\n\n# Cell Biology\n\nContent.";
        assert!(sanitize(text).starts_with("# Cell Biology"));
    }

    #[test]
    fn plain_prose_prefix_is_preserved() {
        let text = "A short intro sentence.\n\n# Heading\n\nContent.";
        assert_eq!(sanitize(text), text.trim());
    }

    #[test]
    fn no_heading_means_no_modification() {
        let text = "thought: stray trace but nothing to anchor on";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn well_formed_markdown_passes_through() {
        let text = "# Title\n\n## 📋 Prerequisites\n- algebra\n";
        assert_eq!(sanitize(text), text.trim());
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "tool_code\nleak\n\n# A\n\nB.",
            "# A\n\nB.",
            "no heading at all",
            "Thought: x\n# H\ncontent with the word thought inside",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn markers_after_the_heading_are_content() {
        let text = "# Python Basics\n\nUse print(...) to write output.";
        assert_eq!(sanitize(text), text);
    }
}
