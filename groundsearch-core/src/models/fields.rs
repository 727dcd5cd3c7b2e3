//! Shared field helpers: lenient deserialization, bound checks and CSV
//! cell formatting.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{CoreError, Violations};

// ============================================================================
// Lenient Deserialization
// ============================================================================

// The service sometimes quotes numbers or sends "" for unknown values.

/// Deserializes a number, numeric string, empty string or null.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got {s:?}"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a number, got {other}"
        ))),
    }
}

/// Deserializes an integer (or integral float / numeric string), or null.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = lenient_f64(deserializer)? else {
        return Ok(None);
    };
    if number.fract() != 0.0 || !number.is_finite() {
        return Err(serde::de::Error::custom(format!(
            "expected an integer, got {number}"
        )));
    }
    Ok(Some(number as i64))
}

/// Deserializes a string, mapping blank strings to `None`.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Deserializes a bool, also accepting "true"/"false"/"yes"/"no" strings.
pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::String(s)) => {
            parse_yes_no(&s).map_err(|_| serde::de::Error::custom(format!("expected a boolean, got {s:?}")))
        }
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a boolean, got {other}"
        ))),
    }
}

// ============================================================================
// Bound Checks
// ============================================================================

/// Smallest measurement a 3-decimal CSV cell can carry.
pub const MIN_MEASUREMENT: f64 = 0.001;

/// Checks an optional measurement is finite, at least [`MIN_MEASUREMENT`]
/// and at most `max`.
pub(crate) fn check_positive(
    violations: &mut Violations,
    field: &str,
    value: Option<f64>,
    max: f64,
    unit: &str,
) {
    let Some(value) = value else { return };

    if !value.is_finite() {
        violations.push(field, "must be a finite number");
    } else if value <= 0.0 {
        violations.push(field, format!("must be greater than 0, got {value}"));
    } else if value < MIN_MEASUREMENT {
        violations.push(
            field,
            format!("{value} {unit} is below the output resolution of {MIN_MEASUREMENT} {unit}"),
        );
    } else if value > max {
        violations.push(
            field,
            format!("{value} {unit} exceeds the plausible maximum of {max} {unit}"),
        );
    }
}

// ============================================================================
// CSV Cells
// ============================================================================

/// Formats an optional measurement with 3 decimals, or an empty cell.
pub fn format_decimal(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_default()
}

/// Formats an optional flag as `Yes`/`No`, or an empty cell.
pub fn format_yes_no(value: Option<bool>) -> String {
    match value {
        Some(true) => "Yes".to_string(),
        Some(false) => "No".to_string(),
        None => String::new(),
    }
}

/// Parses `Yes`/`No` style flags. Blank input yields `None`.
pub(crate) fn parse_yes_no(raw: &str) -> Result<Option<bool>, ()> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "yes" | "y" | "true" | "1" => Ok(Some(true)),
        "no" | "n" | "false" | "0" => Ok(Some(false)),
        _ => Err(()),
    }
}

/// Reads an output cell by column name; missing columns read as blank.
pub(crate) fn cell<'a>(fields: &'a HashMap<String, String>, name: &str) -> &'a str {
    fields.get(name).map_or("", |s| s.trim())
}

pub(crate) fn parse_decimal_cell(
    fields: &HashMap<String, String>,
    name: &str,
) -> Result<Option<f64>, CoreError> {
    let raw = cell(fields, name);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| invalid_field(name, raw))
}

pub(crate) fn parse_flag_cell(
    fields: &HashMap<String, String>,
    name: &str,
) -> Result<Option<bool>, CoreError> {
    let raw = cell(fields, name);
    parse_yes_no(raw).map_err(|()| invalid_field(name, raw))
}

pub(crate) fn text_cell(fields: &HashMap<String, String>, name: &str) -> Option<String> {
    let raw = cell(fields, name);
    (!raw.is_empty()).then(|| raw.to_string())
}

pub(crate) fn invalid_field(name: &str, raw: &str) -> CoreError {
    CoreError::InvalidField {
        field: name.to_string(),
        value: raw.to_string(),
    }
}

/// Column name of the `index`-th (1-based) source URL.
pub fn source_column(index: usize) -> String {
    format!("source_url_{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct LenientFields {
        #[serde(default, deserialize_with = "lenient_f64")]
        number: Option<f64>,
        #[serde(default, deserialize_with = "lenient_i64")]
        count: Option<i64>,
        #[serde(default, deserialize_with = "blank_as_none")]
        text: Option<String>,
        #[serde(default, deserialize_with = "lenient_bool")]
        flag: Option<bool>,
    }

    #[test]
    fn test_lenient_values() {
        let parsed: LenientFields =
            serde_json::from_str(r#"{"number": "1.25", "count": 2.0, "text": "  ", "flag": "yes"}"#)
                .unwrap();
        assert_eq!(parsed.number, Some(1.25));
        assert_eq!(parsed.count, Some(2));
        assert_eq!(parsed.text, None);
        assert_eq!(parsed.flag, Some(true));

        let empty: LenientFields = serde_json::from_str(r#"{"number": null, "count": ""}"#).unwrap();
        assert_eq!(empty.number, None);
        assert_eq!(empty.count, None);
        assert_eq!(empty.flag, None);
    }

    #[test]
    fn test_lenient_rejects_garbage() {
        assert!(serde_json::from_str::<LenientFields>(r#"{"number": "heavy"}"#).is_err());
        assert!(serde_json::from_str::<LenientFields>(r#"{"count": 1.5}"#).is_err());
        assert!(serde_json::from_str::<LenientFields>(r#"{"flag": "maybe"}"#).is_err());
    }

    #[test]
    fn test_format_cells() {
        assert_eq!(format_decimal(Some(1.0)), "1.000");
        assert_eq!(format_decimal(Some(0.12345)), "0.123");
        assert_eq!(format_decimal(None), "");
        assert_eq!(format_yes_no(Some(true)), "Yes");
        assert_eq!(format_yes_no(None), "");
        assert_eq!(source_column(2), "source_url_2");
    }

    #[test]
    fn test_check_positive_bounds() {
        let mut violations = Violations::new();
        check_positive(&mut violations, "weight_kg", Some(0.001), 1000.0, "kg");
        check_positive(&mut violations, "weight_kg", Some(1000.0), 1000.0, "kg");
        check_positive(&mut violations, "weight_kg", None, 1000.0, "kg");
        assert!(violations.finish("ProductSpecification", ()).is_ok());

        let mut violations = Violations::new();
        check_positive(&mut violations, "weight_kg", Some(0.0004), 1000.0, "kg");
        check_positive(&mut violations, "length_cm", Some(0.0), 1000.0, "cm");
        check_positive(&mut violations, "height_cm", Some(1000.5), 1000.0, "cm");
        let err = violations.finish("ProductSpecification", ()).unwrap_err();
        assert_eq!(err.fields(), vec!["weight_kg", "length_cm", "height_cm"]);
    }
}
