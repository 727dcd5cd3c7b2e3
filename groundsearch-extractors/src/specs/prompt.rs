//! Product specification prompt and response schema.

use groundsearch_core::{MAX_REFERENCE_SOURCES, ProductQuery};
use serde_json::{Value, json};

/// Builds the product specification prompt.
pub fn specs_prompt(query: &ProductQuery) -> String {
    let ProductQuery {
        manufacturer,
        part_number,
        description,
    } = query;

    format!(
        r#"You are a precise product specification extraction assistant. Extract ONLY verified technical specifications for this exact product:

Product Details:
- Manufacturer: {manufacturer}
- Part Number: {part_number}
- Description: {description}

SEARCH REQUIREMENTS:
Search using EXACT product identifiers: "{manufacturer} {part_number}" OR "{manufacturer} {part_number} {description}"
Prefer sources in this order: the manufacturer's own website and datasheets, then authorized distributors, then the general web.
Verify the part number matches exactly. Reject specifications for similar but different part numbers.

REQUIRED OUTPUT (JSON):
{{
    "matched_part_number": "the exact part number the sources describe",
    "weight_kg": weight in kg as a decimal number greater than 0, or null,
    "length_cm": length in cm as a decimal number greater than 0, or null,
    "width_cm": width in cm as a decimal number greater than 0, or null,
    "height_cm": height in cm as a decimal number greater than 0, or null,
    "reference_sources": [1-{MAX_REFERENCE_SOURCES} URLs of pages that show the exact part number]
}}

SEARCH STRATEGY:
1. Search for: "{manufacturer} {part_number} specifications datasheet"
2. Search for: "{manufacturer} {part_number} dimensions weight"
3. Search the manufacturer's official website using the part number
4. Check authorized distributors: Digi-Key, Mouser, Arrow, etc.
5. Look for technical documentation and product manuals
6. Cross-reference multiple sources to confirm the part number

VALIDATION RULES:
- The part number must match EXACTLY in every source used
- All measurements must be positive numbers in metric units
- Weight should be realistic for the product type
- Dimensions should be consistent across sources
- URLs must link to pages that explicitly mention the exact part number
- Use null for any value you cannot find with confidence. Never estimate and never use 0

CRITICAL: Only return specifications you can verify are for the EXACT part number "{part_number}".
Set "matched_part_number" to the part number exactly as the sources print it.
Do not use specifications from similar or related products."#
    )
}

/// Response schema for product specifications.
pub fn specs_schema() -> Value {
    let measurement = |description: &str| {
        json!({
            "type": "NUMBER",
            "nullable": true,
            "description": description,
        })
    };

    json!({
        "type": "OBJECT",
        "properties": {
            "matched_part_number": {
                "type": "STRING",
                "description": "Exact part number the sources describe",
            },
            "weight_kg": measurement("Product weight in kilograms"),
            "length_cm": measurement("Length in centimeters"),
            "width_cm": measurement("Width in centimeters"),
            "height_cm": measurement("Height in centimeters"),
            "reference_sources": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "URLs of pages that mention the exact part number",
            },
        },
        "required": ["matched_part_number", "reference_sources"],
        "propertyOrdering": [
            "matched_part_number",
            "weight_kg",
            "length_cm",
            "width_cm",
            "height_cm",
            "reference_sources",
        ],
    })
}
