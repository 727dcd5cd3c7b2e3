//! Product specification extraction.
//!
//! Looks up weight and outer dimensions (metric) for one exact part
//! number. Unknown measurements stay empty; the service is told to answer
//! `null` rather than guess.
//!
//! ## Output columns
//!
//! `weight_kg`, `length_cm`, `width_cm`, `height_cm`, all with three
//! decimals.

mod prompt;
mod strategy;

pub use prompt::{specs_prompt, specs_schema};
pub use strategy::ProductSpecsStrategy;
