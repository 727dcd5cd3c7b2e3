//! The grounded search client seam.
//!
//! Extraction code talks to [`SearchClient`]; the Gemini adapter is one
//! implementation and tests script their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SearchError;

// ============================================================================
// Generation Options
// ============================================================================

/// Sampling parameters sent with each request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus sampling probability mass.
    pub top_p: f64,
    /// Top-k sampling cutoff, if any.
    pub top_k: Option<u32>,
}

impl GenerationOptions {
    /// Options for free-form grounded search.
    pub fn search() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.8,
            top_k: Some(40),
        }
    }

    /// Options for schema-constrained extraction.
    pub fn structured() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.9,
            top_k: None,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::search()
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A web source the service grounded its answer in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Source URI.
    pub uri: String,
    /// Page title, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Result of a schema-constrained search.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredResponse {
    /// The JSON payload, unvalidated.
    pub payload: Value,
    /// Grounding citations, deduplicated, in order of first appearance.
    pub citations: Vec<Citation>,
    /// Web search queries the service issued.
    pub search_queries: Vec<String>,
}

impl StructuredResponse {
    /// Citation URIs in order.
    pub fn citation_uris(&self) -> impl Iterator<Item = &str> {
        self.citations.iter().map(|c| c.uri.as_str())
    }
}

/// Result of a free-form search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeformResponse {
    /// Response text.
    pub text: String,
    /// Response text with inline `[n](uri)` citation markers.
    pub text_with_citations: String,
    /// Grounding citations, deduplicated, in order of first appearance.
    pub citations: Vec<Citation>,
    /// Web search queries the service issued.
    pub search_queries: Vec<String>,
}

// ============================================================================
// Search Client
// ============================================================================

/// A grounded search service.
///
/// Implementations make exactly one remote call per method invocation.
/// Retrying is the caller's decision, guided by
/// [`SearchError::is_transient`].
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Returns a short identifier for logs (e.g. the model name).
    fn id(&self) -> &str;

    /// Requests a JSON payload conforming to `response_schema`.
    async fn search_structured(
        &self,
        prompt: &str,
        response_schema: &Value,
        options: &GenerationOptions,
    ) -> Result<StructuredResponse, SearchError>;

    /// Requests a free-form grounded answer.
    async fn search_freeform(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<FreeformResponse, SearchError>;
}
