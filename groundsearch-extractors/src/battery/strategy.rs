//! Battery information strategy.

use groundsearch_core::{BatteryInformation, ProductQuery, RawBatteryInformation};
use groundsearch_fetch::StructuredResponse;
use serde_json::Value;
use tracing::{debug, instrument};

use super::prompt::{battery_prompt, battery_schema};
use crate::error::ExtractError;
use crate::strategy::{ExtractionStrategy, decode_payload};

/// Extracts battery presence and characteristics.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatteryInfoStrategy;

impl BatteryInfoStrategy {
    /// Creates the strategy.
    pub fn new() -> Self {
        Self
    }
}

/// Clears the zero/false placeholders the service still sends for
/// products without a battery (`battery_count: 0`, `is_rechargeable:
/// false`). Real values are left for validation to judge.
fn clear_absent_placeholders(raw: &mut RawBatteryInformation) {
    if raw.contains_battery != Some(false) {
        return;
    }
    if raw.battery_count == Some(0) {
        raw.battery_count = None;
    }
    if raw.battery_weight_kg == Some(0.0) {
        raw.battery_weight_kg = None;
    }
    if raw.is_rechargeable == Some(false) {
        raw.is_rechargeable = None;
    }
}

impl ExtractionStrategy for BatteryInfoStrategy {
    type Record = BatteryInformation;

    fn id(&self) -> &'static str {
        "battery"
    }

    fn display_name(&self) -> &'static str {
        "Battery information"
    }

    fn build_prompt(&self, query: &ProductQuery) -> String {
        battery_prompt(query)
    }

    fn response_schema(&self) -> Value {
        battery_schema()
    }

    #[instrument(skip(self, response), fields(part_number = %query.part_number))]
    fn map_response(
        &self,
        query: &ProductQuery,
        response: StructuredResponse,
    ) -> Result<BatteryInformation, ExtractError> {
        let mut raw: RawBatteryInformation = decode_payload(query, response)?;
        clear_absent_placeholders(&mut raw);

        let info = BatteryInformation::try_from(raw)?;
        debug!(
            contains_battery = info.contains_battery(),
            battery_count = ?info.battery_count(),
            "Battery information validated"
        );
        Ok(info)
    }

    fn default_output_suffix(&self) -> &'static str {
        "battery_output"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundsearch_core::{BatteryChemistry, BatteryIntegration, ExtractedRecord};
    use groundsearch_fetch::Citation;
    use serde_json::json;

    fn response(payload: Value) -> StructuredResponse {
        StructuredResponse {
            payload,
            citations: vec![Citation {
                uri: "https://www.jabra.example.com/support/9559-583-125".to_string(),
                title: None,
            }],
            search_queries: vec![],
        }
    }

    fn query() -> ProductQuery {
        ProductQuery::new("Jabra", "9559-583-125", "Wireless headset")
    }

    #[test]
    fn test_maps_battery_payload() {
        let info = BatteryInfoStrategy
            .map_response(
                &query(),
                response(json!({
                    "matched_part_number": "9559-583-125",
                    "contains_battery": true,
                    "battery_count": 1,
                    "battery_weight_kg": 0.012,
                    "battery_type_model": "Li-ion pack",
                    "battery_chemistry": "Lithium Ion",
                    "is_rechargeable": true,
                    "battery_brand": null,
                    "battery_integration": "Integrated",
                    "reference_sources": []
                })),
            )
            .unwrap();

        assert_eq!(info.chemistry(), Some(BatteryChemistry::LithiumIon));
        assert_eq!(info.integration(), Some(BatteryIntegration::Integrated));
        assert_eq!(
            info.field_values(),
            vec!["Yes", "1", "0.012", "Li-ion pack", "Li-ion", "Yes", "", "Integrated"]
        );
        assert_eq!(
            info.source_cells(3),
            vec!["https://www.jabra.example.com/support/9559-583-125", "", ""]
        );
    }

    #[test]
    fn test_no_battery_placeholders_cleared() {
        let info = BatteryInfoStrategy
            .map_response(
                &query(),
                response(json!({
                    "matched_part_number": "9559-583-125",
                    "contains_battery": false,
                    "battery_count": 0,
                    "battery_weight_kg": 0.0,
                    "battery_type_model": "",
                    "is_rechargeable": false,
                    "battery_integration": "None",
                    "reference_sources": []
                })),
            )
            .unwrap();

        assert!(!info.contains_battery());
        assert_eq!(info.field_values(), vec!["No", "", "", "", "", "", "", "None"]);
    }

    #[test]
    fn test_no_battery_with_real_count_rejected() {
        let err = BatteryInfoStrategy
            .map_response(
                &query(),
                response(json!({
                    "matched_part_number": "9559-583-125",
                    "contains_battery": false,
                    "battery_count": 2,
                    "battery_chemistry": "NiMH",
                    "reference_sources": []
                })),
            )
            .unwrap_err();

        match err {
            ExtractError::Validation(e) => {
                assert!(e.has_field("battery_count"));
                assert!(e.has_field("battery_chemistry"));
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_metadata() {
        let strategy = BatteryInfoStrategy::new();
        assert_eq!(strategy.id(), "battery");
        assert_eq!(strategy.output_fields().len(), 8);
        assert_eq!(strategy.default_output_suffix(), "battery_output");
    }
}
