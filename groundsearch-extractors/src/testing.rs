//! Scripted search client for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use groundsearch_fetch::{
    Citation, FreeformResponse, GenerationOptions, SearchClient, SearchError, StructuredResponse,
};
use serde_json::Value;

/// Replays queued responses in order. An exhausted queue answers
/// [`SearchError::EmptyResponse`].
#[derive(Default)]
pub(crate) struct ScriptedClient {
    structured: Mutex<VecDeque<Result<StructuredResponse, SearchError>>>,
    freeform: Mutex<VecDeque<Result<FreeformResponse, SearchError>>>,
    structured_calls: AtomicUsize,
    freeform_calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_structured(&self, result: Result<StructuredResponse, SearchError>) -> &Self {
        self.structured.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn push_freeform(&self, result: Result<FreeformResponse, SearchError>) -> &Self {
        self.freeform.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn freeform_calls(&self) -> usize {
        self.freeform_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchClient for ScriptedClient {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn search_structured(
        &self,
        prompt: &str,
        _response_schema: &Value,
        _options: &GenerationOptions,
    ) -> Result<StructuredResponse, SearchError> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.structured
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SearchError::EmptyResponse))
    }

    async fn search_freeform(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<FreeformResponse, SearchError> {
        self.freeform_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.freeform
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SearchError::EmptyResponse))
    }
}

/// A structured response grounded in one citation.
pub(crate) fn grounded(payload: Value, citation: &str) -> StructuredResponse {
    StructuredResponse {
        payload,
        citations: vec![Citation {
            uri: citation.to_string(),
            title: None,
        }],
        search_queries: vec![],
    }
}

/// A free-form answer with no citations.
pub(crate) fn answer(text: &str) -> FreeformResponse {
    FreeformResponse {
        text: text.to_string(),
        text_with_citations: text.to_string(),
        citations: vec![],
        search_queries: vec![],
    }
}
