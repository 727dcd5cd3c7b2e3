//! Host APIs for GroundSearch.
//!
//! - [`http`] - Page fetching for source URL evaluation

pub mod http;

pub use http::{HttpClient, truncate_chars};
