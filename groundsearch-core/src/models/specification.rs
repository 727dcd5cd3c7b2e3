//! Physical product specification (weight and dimensions).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::fields::{
    blank_as_none, check_positive, format_decimal, lenient_f64, parse_decimal_cell, source_column,
    text_cell,
};
use super::source::{MAX_REFERENCE_SOURCES, SourceUrl, collect_sources};
use crate::error::{CoreError, ValidationError, Violations};
use crate::traits::ExtractedRecord;

/// Heaviest product weight accepted, in kilograms.
pub const MAX_PRODUCT_WEIGHT_KG: f64 = 1000.0;

/// Longest accepted product dimension, in centimeters.
pub const MAX_DIMENSION_CM: f64 = 1000.0;

const KG_TO_LBS: f64 = 2.20462;
const CM_TO_IN: f64 = 0.393701;

// ============================================================================
// Raw Specification
// ============================================================================

/// Product specification fields as returned by the search service.
///
/// Every field is optional; nothing here is validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProductSpecification {
    /// Part number the service says the data belongs to.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub matched_part_number: Option<String>,
    /// Weight in kilograms.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight_kg: Option<f64>,
    /// Length in centimeters.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub length_cm: Option<f64>,
    /// Width in centimeters.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub width_cm: Option<f64>,
    /// Height in centimeters.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub height_cm: Option<f64>,
    /// Candidate reference URLs.
    #[serde(default)]
    pub reference_sources: Vec<String>,
}

// ============================================================================
// Product Specification
// ============================================================================

/// A validated product specification.
///
/// Unknown values are `None`, never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSpecification {
    weight_kg: Option<f64>,
    length_cm: Option<f64>,
    width_cm: Option<f64>,
    height_cm: Option<f64>,
    sources: Vec<SourceUrl>,
}

impl ProductSpecification {
    /// Output column names, in order.
    pub const FIELDS: &'static [&'static str] = &["weight_kg", "length_cm", "width_cm", "height_cm"];

    /// Weight in kilograms.
    pub fn weight_kg(&self) -> Option<f64> {
        self.weight_kg
    }

    /// Length in centimeters.
    pub fn length_cm(&self) -> Option<f64> {
        self.length_cm
    }

    /// Width in centimeters.
    pub fn width_cm(&self) -> Option<f64> {
        self.width_cm
    }

    /// Height in centimeters.
    pub fn height_cm(&self) -> Option<f64> {
        self.height_cm
    }

    /// Returns true if at least one measurement was found.
    pub fn has_measurements(&self) -> bool {
        self.weight_kg.is_some()
            || self.length_cm.is_some()
            || self.width_cm.is_some()
            || self.height_cm.is_some()
    }

    /// Converts the measurements to pounds and inches.
    pub fn to_imperial(&self) -> ImperialSpecification {
        ImperialSpecification {
            weight_lbs: self.weight_kg.map(|kg| kg * KG_TO_LBS),
            length_in: self.length_cm.map(|cm| cm * CM_TO_IN),
            width_in: self.width_cm.map(|cm| cm * CM_TO_IN),
            height_in: self.height_cm.map(|cm| cm * CM_TO_IN),
        }
    }

    /// Rebuilds a specification from an output CSV row.
    ///
    /// The row goes through the same validation as a fresh response.
    pub fn from_output_fields(fields: &HashMap<String, String>) -> Result<Self, CoreError> {
        let raw = RawProductSpecification {
            matched_part_number: text_cell(fields, "Part Number"),
            weight_kg: parse_decimal_cell(fields, "weight_kg")?,
            length_cm: parse_decimal_cell(fields, "length_cm")?,
            width_cm: parse_decimal_cell(fields, "width_cm")?,
            height_cm: parse_decimal_cell(fields, "height_cm")?,
            reference_sources: (1..=MAX_REFERENCE_SOURCES)
                .filter_map(|i| text_cell(fields, &source_column(i)))
                .collect(),
        };
        Ok(Self::try_from(raw)?)
    }
}

impl TryFrom<RawProductSpecification> for ProductSpecification {
    type Error = ValidationError;

    fn try_from(raw: RawProductSpecification) -> Result<Self, Self::Error> {
        let mut violations = Violations::new();

        check_positive(&mut violations, "weight_kg", raw.weight_kg, MAX_PRODUCT_WEIGHT_KG, "kg");
        check_positive(&mut violations, "length_cm", raw.length_cm, MAX_DIMENSION_CM, "cm");
        check_positive(&mut violations, "width_cm", raw.width_cm, MAX_DIMENSION_CM, "cm");
        check_positive(&mut violations, "height_cm", raw.height_cm, MAX_DIMENSION_CM, "cm");

        let spec = Self {
            weight_kg: raw.weight_kg,
            length_cm: raw.length_cm,
            width_cm: raw.width_cm,
            height_cm: raw.height_cm,
            sources: collect_sources(&raw.reference_sources, MAX_REFERENCE_SOURCES),
        };

        violations.finish("ProductSpecification", spec)
    }
}

impl ExtractedRecord for ProductSpecification {
    fn field_names() -> &'static [&'static str] {
        Self::FIELDS
    }

    fn field_values(&self) -> Vec<String> {
        vec![
            format_decimal(self.weight_kg),
            format_decimal(self.length_cm),
            format_decimal(self.width_cm),
            format_decimal(self.height_cm),
        ]
    }

    fn sources(&self) -> &[SourceUrl] {
        &self.sources
    }
}

// ============================================================================
// Imperial Specification
// ============================================================================

/// A specification in pounds and inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImperialSpecification {
    /// Weight in pounds.
    pub weight_lbs: Option<f64>,
    /// Length in inches.
    pub length_in: Option<f64>,
    /// Width in inches.
    pub width_in: Option<f64>,
    /// Height in inches.
    pub height_in: Option<f64>,
}
