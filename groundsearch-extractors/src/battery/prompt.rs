//! Battery information prompt and response schema.

use groundsearch_core::{MAX_REFERENCE_SOURCES, ProductQuery};
use serde_json::{Value, json};

/// Builds the battery information prompt.
pub fn battery_prompt(query: &ProductQuery) -> String {
    let ProductQuery {
        manufacturer,
        part_number,
        description,
    } = query;

    format!(
        r#"You are a precise battery information extraction assistant. Extract ONLY verified battery specifications for this exact product:

Product Details:
- Manufacturer: {manufacturer}
- Part Number: {part_number}
- Description: {description}

SEARCH REQUIREMENTS:
Search using EXACT product identifiers: "{manufacturer} {part_number}" OR "{manufacturer} {part_number} {description}"
Prefer sources in this order: the manufacturer's own website, datasheets and user manuals, then authorized distributors, then the general web.
Verify the part number matches exactly. Reject information for similar but different part numbers.

REQUIRED OUTPUT (JSON):
{{
    "matched_part_number": "the exact part number the sources describe",
    "contains_battery": true or false, whether the product contains any battery,
    "battery_count": number of batteries per unit, or null,
    "battery_weight_kg": weight of a single battery in kg, or null,
    "battery_type_model": battery type or model such as "AA", "18650", "BL-5C", or null,
    "battery_chemistry": chemistry such as "Li-ion", "Li-Po", "NiMH", "NiCd", "Alkaline", "Lithium", "Lead-acid", or null,
    "is_rechargeable": true or false, or null,
    "battery_brand": battery brand if stated, or null,
    "battery_integration": "Integrated" if built in, "Removable" if user-replaceable or stand-alone, "None" if there is no battery, or null,
    "reference_sources": [1-{MAX_REFERENCE_SOURCES} URLs of pages that show the exact part number]
}}

SEARCH STRATEGY:
1. Search for: "{manufacturer} {part_number} battery specifications"
2. Search for: "{manufacturer} {part_number} user manual datasheet"
3. Search for: "{manufacturer} {part_number} power requirements"
4. Search the manufacturer's official website using the part number
5. Check authorized distributors and technical documentation
6. Look for FCC ID documents, which often describe the battery
7. Search for product teardowns or technical reviews

VALIDATION RULES:
- The part number must match EXACTLY in every source used
- If the product has no battery, set contains_battery=false, battery_integration="None" and every other battery field to null
- For integrated batteries, look for charging specifications and built-in power
- For stand-alone batteries, check whether they are included or sold separately
- Battery weight should be realistic for the battery type and product category
- URLs must link to pages that explicitly mention the exact part number
- Use null for any value you cannot find with confidence. Never estimate and never use 0

SPECIAL CONSIDERATIONS:
- Headsets and audio devices often have rechargeable Li-ion batteries
- Network testing equipment may use AA/AAA batteries or rechargeable packs
- Some products have backup batteries in addition to main power
- Charging docks, USB charging or battery life in hours indicate a battery is present

CRITICAL: Only return battery information you can verify is for the EXACT part number "{part_number}".
Set "matched_part_number" to the part number exactly as the sources print it.
Do not use information from similar or related products."#
    )
}

/// Response schema for battery information.
pub fn battery_schema() -> Value {
    let nullable = |kind: &str, description: &str| {
        json!({
            "type": kind,
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
            "contains_battery": {
                "type": "BOOLEAN",
                "description": "Whether the product contains any battery",
            },
            "battery_count": nullable("INTEGER", "Batteries per unit"),
            "battery_weight_kg": nullable("NUMBER", "Weight of a single battery in kilograms"),
            "battery_type_model": nullable("STRING", "Battery type or model"),
            "battery_chemistry": nullable("STRING", "Battery chemistry"),
            "is_rechargeable": nullable("BOOLEAN", "Whether the battery is rechargeable"),
            "battery_brand": nullable("STRING", "Battery brand"),
            "battery_integration": {
                "type": "STRING",
                "nullable": true,
                "enum": ["Removable", "Integrated", "None"],
                "description": "How the battery is fitted",
            },
            "reference_sources": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "URLs of pages that mention the exact part number",
            },
        },
        "required": ["matched_part_number", "contains_battery", "reference_sources"],
        "propertyOrdering": [
            "matched_part_number",
            "contains_battery",
            "battery_count",
            "battery_weight_kg",
            "battery_type_model",
            "battery_chemistry",
            "is_rechargeable",
            "battery_brand",
            "battery_integration",
            "reference_sources",
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_identifiers() {
        let query = ProductQuery::new("Fluke", "MS2-100", "Cable tester");
        let prompt = battery_prompt(&query);

        assert!(prompt.contains("- Manufacturer: Fluke"));
        assert!(prompt.contains("\"Fluke MS2-100 battery specifications\""));
        assert!(prompt.contains("battery_integration"));
        assert!(!prompt.contains("is_integrated"));
    }

    #[test]
    fn test_schema_shape() {
        let schema = battery_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "matched_part_number"));
        assert!(required.iter().any(|v| v == "contains_battery"));
        assert_eq!(schema["properties"]["battery_count"]["type"], "INTEGER");
        assert_eq!(
            schema["properties"]["battery_integration"]["enum"],
            json!(["Removable", "Integrated", "None"])
        );
    }
}
