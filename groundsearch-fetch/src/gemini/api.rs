//! Gemini `generateContent` wire types.

use serde::{Deserialize, Serialize};

use crate::client::GenerationOptions;
use crate::error::SearchError;

/// Finish reasons that mean the service refused to answer.
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "RECITATION",
];

// ============================================================================
// Request Types
// ============================================================================

/// Body of a `generateContent` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; always a single user turn here.
    pub contents: Vec<Content>,
    /// Tools the model may call.
    pub tools: Vec<Tool>,
    /// Sampling and output configuration.
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Builds a single-turn, search-grounded request.
    pub fn grounded(prompt: &str, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            tools: vec![Tool::google_search()],
            generation_config,
        }
    }
}

/// A conversation turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    /// `user` or `model`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A content part. Only text parts are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    /// Part text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A tool declaration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Google Search grounding.
    pub google_search: GoogleSearch,
}

impl Tool {
    /// The Google Search grounding tool.
    pub fn google_search() -> Self {
        Self {
            google_search: GoogleSearch {},
        }
    }
}

/// Empty marker object enabling Google Search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GoogleSearch {}

/// `generationConfig` block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus sampling mass.
    pub top_p: f64,
    /// Top-k cutoff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl GenerationConfig {
    /// Sampling settings from `options`.
    ///
    /// There is no `responseMimeType`/`responseSchema` here: Gemini 2.x
    /// rejects JSON output mode together with the search tool, so
    /// structured requests carry their schema in the prompt instead.
    pub fn from_options(options: &GenerationOptions) -> Self {
        Self {
            temperature: options.temperature,
            top_p: options.top_p,
            top_k: options.top_k,
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Body of a `generateContent` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate answers; the first one is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Prompt-level feedback (blocking).
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// A candidate answer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content.
    #[serde(default)]
    pub content: Option<Content>,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// Search grounding details.
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Prompt feedback.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was blocked.
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Search grounding details for a candidate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    /// Retrieved web chunks.
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
    /// Which chunks support which text segments.
    #[serde(default)]
    pub grounding_supports: Vec<GroundingSupport>,
    /// Queries the model sent to Google Search.
    #[serde(default)]
    pub web_search_queries: Vec<String>,
}

/// A retrieved chunk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingChunk {
    /// Web source, for search-grounded chunks.
    #[serde(default)]
    pub web: Option<WebChunk>,
}

/// A web source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebChunk {
    /// Source URI.
    #[serde(default)]
    pub uri: Option<String>,
    /// Page title.
    #[serde(default)]
    pub title: Option<String>,
}

/// Links a text segment to the chunks supporting it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingSupport {
    /// The supported text segment.
    #[serde(default)]
    pub segment: Option<Segment>,
    /// Indices into `grounding_chunks`.
    #[serde(default)]
    pub grounding_chunk_indices: Vec<usize>,
}

/// A text segment. Indices are UTF-8 byte offsets into the response text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Start offset.
    #[serde(default)]
    pub start_index: Option<usize>,
    /// End offset (exclusive).
    #[serde(default)]
    pub end_index: Option<usize>,
    /// Segment text.
    #[serde(default)]
    pub text: Option<String>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// HTTP-like code.
    #[serde(default)]
    pub code: Option<u16>,
    /// Message.
    #[serde(default)]
    pub message: Option<String>,
    /// Canonical status (e.g. `INVALID_ARGUMENT`).
    #[serde(default)]
    pub status: Option<String>,
}

/// Extracts a readable message from an error response body.
pub fn api_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(body) {
        let message = parsed.error.message.unwrap_or_default();
        return match parsed.error.status {
            Some(status) if !message.is_empty() => format!("{status}: {message}"),
            Some(status) => status,
            None => message,
        };
    }
    body.chars().take(200).collect()
}

// ============================================================================
// Grounded Answer
// ============================================================================

/// The usable part of a response: first candidate's text and grounding.
#[derive(Debug, Clone)]
pub struct GroundedAnswer {
    /// Concatenated text parts.
    pub text: String,
    /// Grounding metadata, if the answer was grounded.
    pub metadata: Option<GroundingMetadata>,
}

impl GenerateContentResponse {
    /// Reduces the response to its first candidate.
    ///
    /// Blocked prompts and refusals are [`SearchError::Blocked`]; responses
    /// without text are [`SearchError::EmptyResponse`].
    pub fn into_answer(self) -> Result<GroundedAnswer, SearchError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(SearchError::Blocked(reason));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(SearchError::EmptyResponse)?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if BLOCKING_FINISH_REASONS.contains(&reason) {
                return Err(SearchError::Blocked(reason.to_string()));
            }
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SearchError::EmptyResponse);
        }

        Ok(GroundedAnswer {
            text,
            metadata: candidate.grounding_metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest::grounded(
            "find it",
            GenerationConfig::from_options(&GenerationOptions::structured()),
        );
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["contents"][0]["parts"][0]["text"], "find it");
        assert_eq!(value["tools"], json!([{"googleSearch": {}}]));
        assert_eq!(value["generationConfig"]["temperature"], 0.2);
        assert!(value["generationConfig"].get("topK").is_none());
        assert!(value["generationConfig"].get("responseMimeType").is_none());
        assert!(value["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_search_options_carry_top_k() {
        let request = GenerateContentRequest::grounded(
            "q",
            GenerationConfig::from_options(&GenerationOptions::search()),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["generationConfig"]["topK"], 40);
    }

    #[test]
    fn test_parse_grounded_response() {
        let json = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Part one. "}, {"text": "Part two."}]},
                "finishReason": "STOP",
                "groundingMetadata": {
                    "webSearchQueries": ["acme x-1 weight"],
                    "groundingChunks": [{"web": {"uri": "https://a.example.com", "title": "a.example.com"}}],
                    "groundingSupports": [{"segment": {"endIndex": 9}, "groundingChunkIndices": [0]}]
                }
            }]
        }"#;

        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let answer = response.into_answer().unwrap();
        assert_eq!(answer.text, "Part one. Part two.");
        let metadata = answer.metadata.unwrap();
        assert_eq!(metadata.web_search_queries, vec!["acme x-1 weight"]);
        assert_eq!(metadata.grounding_supports[0].grounding_chunk_indices, vec![0]);
    }

    #[test]
    fn test_blocked_prompt() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.into_answer(), Err(SearchError::Blocked(r)) if r == "SAFETY"));
    }

    #[test]
    fn test_empty_candidates() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(response.into_answer(), Err(SearchError::EmptyResponse)));

        let json = r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.into_answer(), Err(SearchError::EmptyResponse)));
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error": {"code": 400, "message": "Invalid schema", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "INVALID_ARGUMENT: Invalid schema");
        assert_eq!(api_error_message("plain text"), "plain text");
    }
}
