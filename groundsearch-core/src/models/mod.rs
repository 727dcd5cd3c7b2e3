//! Domain models for GroundSearch.
//!
//! ## Submodules
//!
//! - [`query`] - The product lookup key
//! - [`specification`] - Weight and dimensions
//! - [`battery`] - Battery presence and characteristics
//! - [`source`] - Validated reference URLs

mod battery;
mod fields;
mod query;
mod source;
mod specification;

pub use battery::{
    BatteryChemistry, BatteryInformation, BatteryIntegration, MAX_BATTERY_COUNT,
    MAX_BATTERY_WEIGHT_KG, RawBatteryInformation,
};
pub use fields::{MIN_MEASUREMENT, format_decimal, format_yes_no, source_column};
pub use query::ProductQuery;
pub use source::{MAX_REFERENCE_SOURCES, SourceUrl, collect_sources};
pub use specification::{
    ImperialSpecification, MAX_DIMENSION_CM, MAX_PRODUCT_WEIGHT_KG, ProductSpecification,
    RawProductSpecification,
};
