// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `GroundSearch` Core
//!
//! Core types, models, and traits for `GroundSearch`.
//!
//! This crate provides the foundational abstractions used across all other
//! `GroundSearch` crates, including:
//!
//! - Validated record models (product specifications, battery information)
//! - The product lookup key
//! - Error types
//! - The [`ExtractedRecord`] output trait
//!
//! ## Key Types
//!
//! ### Records
//! - [`ProductSpecification`] - Weight and dimensions, metric units
//! - [`BatteryInformation`] - Battery presence and characteristics
//! - [`RawProductSpecification`] / [`RawBatteryInformation`] - Unvalidated service payloads
//!
//! ### Query & Sources
//! - [`ProductQuery`] - Manufacturer, exact part number, description
//! - [`SourceUrl`] - A validated reference URL
//!
//! ### Errors
//! - [`ValidationError`] - Every violated field constraint of a record
//! - [`CoreError`] - Everything else

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::{CoreError, FieldViolation, ValidationError};

// Re-export all model types
pub use models::{
    // Records
    BatteryChemistry,
    BatteryInformation,
    BatteryIntegration,
    ImperialSpecification,
    ProductSpecification,
    RawBatteryInformation,
    RawProductSpecification,
    // Query & sources
    ProductQuery,
    SourceUrl,
    collect_sources,
    // Limits
    MAX_BATTERY_COUNT,
    MAX_BATTERY_WEIGHT_KG,
    MAX_DIMENSION_CM,
    MAX_PRODUCT_WEIGHT_KG,
    MAX_REFERENCE_SOURCES,
    MIN_MEASUREMENT,
    // CSV helpers
    format_decimal,
    format_yes_no,
    source_column,
};

// Re-export traits
pub use traits::ExtractedRecord;
