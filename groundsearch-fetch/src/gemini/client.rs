//! Gemini search client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::api::{GenerateContentRequest, GenerateContentResponse, GenerationConfig, api_error_message};
use super::citations::{
    add_citations, collect_citations, extract_json, optimize_search_query, with_schema_instructions,
};
use crate::client::{FreeformResponse, GenerationOptions, SearchClient, StructuredResponse};
use crate::error::SearchError;

// ============================================================================
// Constants
// ============================================================================

/// Generative Language API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// User agent for API requests.
const USER_AGENT_VALUE: &str = concat!("GroundSearch/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Configuration
// ============================================================================

/// Connection settings for [`GeminiSearchClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    /// Model name, e.g. `gemini-2.5-pro`.
    pub model: String,
    /// API base URL, without the `/v1beta` path.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// [`SearchClient`] backed by Gemini with Google Search grounding.
pub struct GeminiSearchClient {
    http: reqwest::Client,
    api_key: String,
    config: GeminiConfig,
}

impl fmt::Debug for GeminiSearchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSearchClient")
            .field("api_key", &"<redacted>")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GeminiSearchClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Fails if the key is blank or the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: GeminiConfig) -> Result<Self, SearchError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SearchError::Authentication("API key is empty".to_string()));
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    /// Returns the connection settings.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_headers(&self) -> Result<HeaderMap, SearchError> {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(self.api_key.trim()).map_err(|_| {
                SearchError::Authentication("API key contains invalid characters".to_string())
            })?,
        );

        Ok(headers)
    }

    /// Sends one `generateContent` request and maps the HTTP status.
    #[instrument(skip(self, request), fields(model = %self.config.model))]
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, SearchError> {
        debug!("Sending generateContent request");

        let response = self
            .http
            .post(self.endpoint())
            .headers(self.build_headers()?)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, "Response received");

        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body).map_err(|e| {
                warn!(error = %e, "Failed to parse generateContent response");
                SearchError::InvalidResponse(format!("JSON error: {e}"))
            });
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let message = api_error_message(&response.text().await.unwrap_or_default());

        Err(match status.as_u16() {
            401 | 403 => SearchError::Authentication(message),
            429 => SearchError::RateLimited { retry_after },
            400 | 404 => SearchError::BadRequest(message),
            code if code >= 500 => SearchError::Server {
                status: code,
                message,
            },
            code => SearchError::InvalidResponse(format!("HTTP {code}: {message}")),
        })
    }
}

#[async_trait]
impl SearchClient for GeminiSearchClient {
    fn id(&self) -> &str {
        &self.config.model
    }

    async fn search_structured(
        &self,
        prompt: &str,
        response_schema: &Value,
        options: &GenerationOptions,
    ) -> Result<StructuredResponse, SearchError> {
        if prompt.trim().is_empty() {
            return Err(SearchError::EmptyPrompt);
        }

        let request = GenerateContentRequest::grounded(
            &with_schema_instructions(prompt, response_schema),
            GenerationConfig::from_options(options),
        );
        let answer = self.generate(&request).await?.into_answer()?;

        let citations = collect_citations(answer.metadata.as_ref());
        if citations.is_empty() {
            warn!("Structured response carried no grounding citations");
            return Err(SearchError::NoCitations);
        }

        let payload = extract_json(&answer.text)?;
        let search_queries = answer
            .metadata
            .map(|m| m.web_search_queries)
            .unwrap_or_default();

        debug!(
            citations = citations.len(),
            queries = search_queries.len(),
            "Structured response parsed"
        );

        Ok(StructuredResponse {
            payload,
            citations,
            search_queries,
        })
    }

    async fn search_freeform(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<FreeformResponse, SearchError> {
        if prompt.trim().is_empty() {
            return Err(SearchError::EmptyPrompt);
        }

        let request = GenerateContentRequest::grounded(
            &optimize_search_query(prompt),
            GenerationConfig::from_options(options),
        );
        let answer = self.generate(&request).await?.into_answer()?;

        let citations = collect_citations(answer.metadata.as_ref());
        let text_with_citations = match &answer.metadata {
            Some(metadata) => add_citations(&answer.text, metadata),
            None => answer.text.clone(),
        };
        let search_queries = answer
            .metadata
            .map(|m| m.web_search_queries)
            .unwrap_or_default();

        Ok(FreeformResponse {
            text: answer.text,
            text_with_citations,
            citations,
            search_queries,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
