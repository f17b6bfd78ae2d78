//! Gemini REST client: the concrete implementation of both remote AI calls.
//!
//! One client serves both pipeline stages — transcription sends the document
//! bytes as `inlineData` next to the verbatim instruction, generation sends
//! the raw text under the study-guide system instruction. Requests go to
//! `models/{model}:generateContent` with the API key as a query parameter.
//!
//! Transport and service errors are reported as plain reason strings by the
//! private `post_generate`; each trait impl wraps them in its own stage
//! error so the orchestrator's error mapping stays uniform.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::StudyGuideError;
use crate::pipeline::generate::{ContentGenerator, GenerationOutcome};
use crate::pipeline::transcribe::DocumentTranscriber;
use crate::prompts::{generation_user_prompt, STUDY_GUIDE_SYSTEM_PROMPT, TRANSCRIPTION_PROMPT};
use crate::state::Document;

// ── Request types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

impl Content {
    fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

// ── Response types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    fn joined_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn completion_reason(&self) -> Option<String> {
        self.candidates.first().and_then(|c| c.finish_reason.clone())
    }

    fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }
}

// ── Client ───────────────────────────────────────────────────────────────

/// Gemini `generateContent` client, shared by both pipeline stages.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Build a client from the pipeline configuration.
    ///
    /// # Errors
    /// [`StudyGuideError::InvalidConfig`] when the API key is missing or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &PipelineConfig) -> Result<Self, StudyGuideError> {
        if config.gemini_api_key.is_empty() {
            return Err(StudyGuideError::InvalidConfig(
                "Gemini API key is required".into(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| StudyGuideError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            http,
            api_key: config.gemini_api_key.clone(),
            model: config.model.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Issue one `generateContent` request.
    ///
    /// Returns a plain reason string on failure; the calling trait impl
    /// wraps it in the appropriate stage error.
    async fn post_generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(format!("HTTP {status}: {snippet}"));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| format!("invalid response body: {e}"))
    }
}

#[async_trait]
impl DocumentTranscriber for GeminiClient {
    async fn transcribe(&self, document: &Document) -> Result<String, StudyGuideError> {
        let data = STANDARD.encode(&document.bytes);
        debug!(
            payload_bytes = data.len(),
            mime = %document.mime_type,
            "sending transcription request"
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: document.mime_type.clone(),
                            data,
                        },
                    },
                    Part::Text {
                        text: TRANSCRIPTION_PROMPT.to_string(),
                    },
                ],
            }],
            system_instruction: None,
            // Verbatim extraction wants determinism, not creativity.
            generation_config: Some(GenerationConfig {
                temperature: 0.0,
                max_output_tokens: Some(self.max_output_tokens),
            }),
        };

        let response = self
            .post_generate(&request)
            .await
            .map_err(|reason| StudyGuideError::TranscriptionFailed { reason })?;

        if let Some(reason) = response.block_reason() {
            return Err(StudyGuideError::TranscriptionFailed {
                reason: format!("request blocked: {reason}"),
            });
        }

        Ok(response.joined_text())
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, raw_text: &str) -> Result<GenerationOutcome, StudyGuideError> {
        let request = GenerateContentRequest {
            contents: vec![Content::text(generation_user_prompt(raw_text))],
            system_instruction: Some(Content::text(STUDY_GUIDE_SYSTEM_PROMPT)),
            generation_config: Some(GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: Some(self.max_output_tokens),
            }),
        };

        let response = self
            .post_generate(&request)
            .await
            .map_err(|reason| StudyGuideError::GenerationFailed { reason })?;

        if let Some(reason) = response.block_reason() {
            return Err(StudyGuideError::GenerationFailed {
                reason: format!("prompt blocked: {reason}"),
            });
        }

        let text = response.joined_text();
        Ok(GenerationOutcome {
            text: if text.is_empty() { None } else { Some(text) },
            completion_reason: response.completion_reason(),
        })
    }
}
