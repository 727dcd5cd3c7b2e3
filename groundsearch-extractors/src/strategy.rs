//! The extraction strategy seam.
//!
//! A strategy owns everything that differs between record types: the
//! prompt, the response schema and the mapping from a raw payload to a
//! validated record. The row processor owns everything else.

use groundsearch_core::{ExtractedRecord, ProductQuery, RawBatteryInformation, RawProductSpecification};
use groundsearch_fetch::StructuredResponse;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ExtractError;

// ============================================================================
// Extraction Strategy
// ============================================================================

/// One kind of product attribute extraction.
pub trait ExtractionStrategy: Send + Sync {
    /// The validated record this strategy produces.
    type Record: ExtractedRecord;

    /// Short identifier (`specs`, `battery`).
    fn id(&self) -> &'static str;

    /// Human-readable name for logs and summaries.
    fn display_name(&self) -> &'static str;

    /// Builds the search prompt for one product.
    fn build_prompt(&self, query: &ProductQuery) -> String;

    /// JSON schema the service must answer with.
    fn response_schema(&self) -> Value;

    /// Validates a structured response and builds the record.
    ///
    /// # Errors
    ///
    /// Fails on part number mismatch, undecodable payloads and
    /// constraint violations.
    fn map_response(
        &self,
        query: &ProductQuery,
        response: StructuredResponse,
    ) -> Result<Self::Record, ExtractError>;

    /// Output column names for the extracted fields.
    fn output_fields(&self) -> &'static [&'static str] {
        <Self::Record as ExtractedRecord>::field_names()
    }

    /// Suffix for default output file names (`specs_output`).
    fn default_output_suffix(&self) -> &'static str;
}

// ============================================================================
// Payload Decoding
// ============================================================================

/// Raw payloads that carry a matched part number and reference sources.
pub(crate) trait GroundedPayload: DeserializeOwned {
    fn matched_part_number(&self) -> Option<&str>;
    fn reference_sources_mut(&mut self) -> &mut Vec<String>;
}

impl GroundedPayload for RawProductSpecification {
    fn matched_part_number(&self) -> Option<&str> {
        self.matched_part_number.as_deref()
    }

    fn reference_sources_mut(&mut self) -> &mut Vec<String> {
        &mut self.reference_sources
    }
}

impl GroundedPayload for RawBatteryInformation {
    fn matched_part_number(&self) -> Option<&str> {
        self.matched_part_number.as_deref()
    }

    fn reference_sources_mut(&mut self) -> &mut Vec<String> {
        &mut self.reference_sources
    }
}

/// Decodes a payload, enforces the exact part number match and appends
/// grounding citations after the payload's own sources.
pub(crate) fn decode_payload<T: GroundedPayload>(
    query: &ProductQuery,
    response: StructuredResponse,
) -> Result<T, ExtractError> {
    let citations: Vec<String> = response.citation_uris().map(str::to_string).collect();
    let mut raw: T = serde_json::from_value(response.payload)?;

    match raw.matched_part_number() {
        Some(found) if query.matches_part_number(found) => {}
        found => {
            warn!(
                manufacturer = %query.manufacturer,
                part_number = %query.part_number,
                found = ?found,
                "Response is for a different part number"
            );
            return Err(ExtractError::PartNumberMismatch {
                expected: query.part_number.clone(),
                found: found.map(str::to_string),
            });
        }
    }

    debug!(
        payload_sources = raw.reference_sources_mut().len(),
        citations = citations.len(),
        "Merging grounding citations"
    );
    raw.reference_sources_mut().extend(citations);
    Ok(raw)
}
