// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `GroundSearch` Fetch
//!
//! Grounded search clients and host APIs for `GroundSearch`.
//!
//! ## Search
//!
//! - [`client::SearchClient`] - Trait for grounded search services
//! - [`gemini::GeminiSearchClient`] - Gemini `generateContent` with Google Search grounding
//! - [`retry::RetryStrategy`] - Backoff schedule for transient failures
//!
//! The search client makes one remote call per request. Retrying is left
//! to the caller, driven by [`SearchError::is_transient`].
//!
//! ## Host APIs
//!
//! - [`host::http`] - Page fetching with per-request timeouts
//!
//! ## Example
//!
//! ```ignore
//! use groundsearch_fetch::{GeminiConfig, GeminiSearchClient, GenerationOptions, SearchClient};
//!
//! let client = GeminiSearchClient::new(api_key, GeminiConfig::default())?;
//! let answer = client
//!     .search_freeform("Fluke MS2-100 weight", &GenerationOptions::search())
//!     .await?;
//! println!("{}", answer.text_with_citations);
//! ```

// Core modules
pub mod client;
pub mod error;
pub mod gemini;
pub mod host;
pub mod retry;

// Re-export key types at crate root

// Errors
pub use error::{HttpError, SearchError};

// Search
pub use client::{Citation, FreeformResponse, GenerationOptions, SearchClient, StructuredResponse};
pub use gemini::{GeminiConfig, GeminiSearchClient};

// Host APIs
pub use host::http::HttpClient;

pub use retry::RetryStrategy;
