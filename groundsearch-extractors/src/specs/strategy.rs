//! Product specification strategy.

use groundsearch_core::{ProductQuery, ProductSpecification, RawProductSpecification};
use groundsearch_fetch::StructuredResponse;
use serde_json::Value;
use tracing::{debug, instrument};

use super::prompt::{specs_prompt, specs_schema};
use crate::error::ExtractError;
use crate::strategy::{ExtractionStrategy, decode_payload};

/// Extracts weight and dimensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductSpecsStrategy;

impl ProductSpecsStrategy {
    /// Creates the strategy.
    pub fn new() -> Self {
        Self
    }
}

impl ExtractionStrategy for ProductSpecsStrategy {
    type Record = ProductSpecification;

    fn id(&self) -> &'static str {
        "specs"
    }

    fn display_name(&self) -> &'static str {
        "Product specifications"
    }

    fn build_prompt(&self, query: &ProductQuery) -> String {
        specs_prompt(query)
    }

    fn response_schema(&self) -> Value {
        specs_schema()
    }

    #[instrument(skip(self, response), fields(part_number = %query.part_number))]
    fn map_response(
        &self,
        query: &ProductQuery,
        response: StructuredResponse,
    ) -> Result<ProductSpecification, ExtractError> {
        let raw: RawProductSpecification = decode_payload(query, response)?;
        let spec = ProductSpecification::try_from(raw)?;
        debug!(
            has_measurements = spec.has_measurements(),
            "Product specification validated"
        );
        Ok(spec)
    }

    fn default_output_suffix(&self) -> &'static str {
        "specs_output"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundsearch_core::ExtractedRecord;
    use groundsearch_fetch::Citation;
    use serde_json::json;

    fn response(payload: Value) -> StructuredResponse {
        StructuredResponse {
            payload,
            citations: vec![
                Citation {
                    uri: "https://www.jabra.example.com/9559-583-125".to_string(),
                    title: Some("Jabra".to_string()),
                },
                Citation {
                    uri: "https://distributor.example.com/p/9559".to_string(),
                    title: None,
                },
            ],
            search_queries: vec!["Jabra 9559-583-125 weight".to_string()],
        }
    }

    fn query() -> ProductQuery {
        ProductQuery::new("Jabra", "9559-583-125", "Wireless headset")
    }

    #[test]
    fn test_maps_valid_payload() {
        let spec = ProductSpecsStrategy
            .map_response(
                &query(),
                response(json!({
                    "matched_part_number": "9559-583-125",
                    "weight_kg": 0.094,
                    "length_cm": 17.2,
                    "width_cm": null,
                    "height_cm": 4,
                    "reference_sources": [
                        "https://www.jabra.example.com/9559-583-125",
                        "not a url"
                    ]
                })),
            )
            .unwrap();

        assert_eq!(
            spec.field_values(),
            vec!["0.094", "17.200", "", "4.000"]
        );
        // Duplicate citation collapses into the payload source.
        let sources: Vec<&str> = spec.sources().iter().map(|s| s.as_str()).collect();
        assert_eq!(
            sources,
            vec![
                "https://www.jabra.example.com/9559-583-125",
                "https://distributor.example.com/p/9559"
            ]
        );
    }

    #[test]
    fn test_out_of_bound_payload_fails_validation() {
        let err = ProductSpecsStrategy
            .map_response(
                &query(),
                response(json!({
                    "matched_part_number": "9559-583-125",
                    "weight_kg": 10000,
                    "length_cm": -1,
                    "reference_sources": []
                })),
            )
            .unwrap_err();

        match err {
            ExtractError::Validation(e) => assert_eq!(e.fields(), vec!["weight_kg", "length_cm"]),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_metadata() {
        let strategy = ProductSpecsStrategy::new();
        assert_eq!(strategy.id(), "specs");
        assert_eq!(
            strategy.output_fields(),
            &["weight_kg", "length_cm", "width_cm", "height_cm"]
        );
        assert_eq!(strategy.default_output_suffix(), "specs_output");
    }
}
