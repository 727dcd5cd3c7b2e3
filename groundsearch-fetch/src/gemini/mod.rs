//! Google Gemini grounded search.
//!
//! Talks to the Generative Language REST API (`generateContent`) with the
//! `google_search` tool enabled, and turns grounding metadata into
//! citations.
//!
//! ## Modules
//!
//! - [`api`] - Request/response wire types
//! - [`citations`] - Citation extraction, inline markers, JSON payload recovery
//! - [`client`] - The [`GeminiSearchClient`] adapter

pub mod api;
pub mod citations;
pub mod client;

pub use citations::{
    add_citations, collect_citations, extract_json, optimize_search_query, with_schema_instructions,
};
pub use client::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiConfig, GeminiSearchClient};
