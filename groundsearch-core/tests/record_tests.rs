//! Integration tests for validated record types.

use std::collections::HashMap;

use groundsearch_core::{
    BatteryInformation, ExtractedRecord, MAX_DIMENSION_CM, MIN_MEASUREMENT, ProductSpecification,
    RawBatteryInformation, RawProductSpecification, source_column,
};

fn output_row<R: ExtractedRecord>(record: &R, part_number: &str) -> HashMap<String, String> {
    let mut row = HashMap::new();
    row.insert("Part Number".to_string(), part_number.to_string());
    for (name, value) in R::field_names().iter().zip(record.field_values()) {
        row.insert((*name).to_string(), value);
    }
    for (i, cell) in record.source_cells(3).into_iter().enumerate() {
        row.insert(source_column(i + 1), cell);
    }
    row
}

#[test]
fn test_specification_roundtrips_through_output_row() {
    let raw: RawProductSpecification = serde_json::from_str(
        r#"{
            "matched_part_number": "WH-1000XM5",
            "weight_kg": 0.2504,
            "length_cm": 26.4,
            "width_cm": 19.5,
            "height_cm": null,
            "reference_sources": ["https://www.sony.com/wh-1000xm5", "https://shop.example.com/x"]
        }"#,
    )
    .unwrap();
    let spec = ProductSpecification::try_from(raw).unwrap();

    let row = output_row(&spec, "WH-1000XM5");
    assert_eq!(row["weight_kg"], "0.250");
    assert_eq!(row["height_cm"], "");
    assert_eq!(row["source_url_3"], "");

    let parsed = ProductSpecification::from_output_fields(&row).unwrap();
    assert_eq!(parsed.weight_kg(), Some(0.25));
    assert_eq!(parsed.length_cm(), Some(26.4));
    assert_eq!(parsed.height_cm(), None);
    assert_eq!(parsed.sources(), spec.sources());
}

#[test]
fn test_out_of_bound_weight_names_the_field() {
    let raw = RawProductSpecification {
        weight_kg: Some(10_000.0),
        ..Default::default()
    };
    let err = ProductSpecification::try_from(raw).unwrap_err();
    assert!(err.has_field("weight_kg"));
    assert!(err.to_string().contains("weight_kg"));
}

#[test]
fn test_weight_below_output_resolution_is_rejected() {
    let raw: RawProductSpecification =
        serde_json::from_str(r#"{"weight_kg": 0.0004, "length_cm": 0.1}"#).unwrap();
    let err = ProductSpecification::try_from(raw).unwrap_err();
    assert_eq!(err.fields(), vec!["weight_kg"]);
    assert!(err.to_string().contains("output resolution"));
}

#[test]
fn test_specification_bounds_roundtrip_through_output_row() {
    let raw = RawProductSpecification {
        weight_kg: Some(MIN_MEASUREMENT),
        length_cm: Some(MAX_DIMENSION_CM),
        width_cm: Some(999.9996),
        height_cm: Some(MAX_DIMENSION_CM - MIN_MEASUREMENT),
        ..Default::default()
    };
    let spec = ProductSpecification::try_from(raw).unwrap();

    let row = output_row(&spec, "BOUNDS-1");
    assert_eq!(row["weight_kg"], "0.001");
    assert_eq!(row["length_cm"], "1000.000");
    assert_eq!(row["width_cm"], "1000.000");
    assert_eq!(row["height_cm"], "999.999");

    let parsed = ProductSpecification::from_output_fields(&row).unwrap();
    assert_eq!(parsed.weight_kg(), Some(0.001));
    assert_eq!(parsed.length_cm(), Some(1000.0));
    assert_eq!(parsed.width_cm(), Some(1000.0));
    assert_eq!(parsed.height_cm(), Some(999.999));
}

#[test]
fn test_battery_roundtrips_through_output_row() {
    let raw: RawBatteryInformation = serde_json::from_str(
        r#"{
            "matched_part_number": "MX-3",
            "contains_battery": true,
            "battery_count": 1,
            "battery_weight_kg": "0.045",
            "battery_type_model": "Li-Po 500mAh",
            "battery_chemistry": "Lithium Polymer",
            "is_rechargeable": true,
            "battery_brand": "",
            "battery_integration": "Integrated",
            "reference_sources": ["https://www.logitech.com/mx-3"]
        }"#,
    )
    .unwrap();
    let info = BatteryInformation::try_from(raw).unwrap();

    let row = output_row(&info, "MX-3");
    assert_eq!(row["contains_battery"], "Yes");
    assert_eq!(row["battery_weight_kg"], "0.045");
    assert_eq!(row["battery_chemistry"], "Li-Po");
    assert_eq!(row["battery_brand"], "");

    let parsed = BatteryInformation::from_output_fields(&row).unwrap();
    assert_eq!(parsed, info);
}

#[test]
fn test_absent_battery_with_count_fails() {
    let raw: RawBatteryInformation = serde_json::from_str(
        r#"{"matched_part_number": "CAB-1", "contains_battery": false, "battery_count": 2}"#,
    )
    .unwrap();
    let err = BatteryInformation::try_from(raw).unwrap_err();
    assert_eq!(err.fields(), vec!["battery_count"]);
}
