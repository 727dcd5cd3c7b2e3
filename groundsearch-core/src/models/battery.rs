//! Battery information.
//!
//! Presence-dependent fields must be empty when the product has no battery.
//! That rule is enforced here, at construction, so callers cannot produce a
//! "no battery, two cells" record by accident.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::fields::{
    blank_as_none, check_positive, format_decimal, format_yes_no, invalid_field, lenient_bool,
    lenient_f64, lenient_i64, parse_decimal_cell, parse_flag_cell, source_column, text_cell,
};
use super::source::{MAX_REFERENCE_SOURCES, SourceUrl, collect_sources};
use crate::error::{CoreError, ValidationError, Violations};
use crate::traits::ExtractedRecord;

/// Heaviest single battery accepted, in kilograms.
pub const MAX_BATTERY_WEIGHT_KG: f64 = 50.0;

/// Largest battery count accepted per unit.
pub const MAX_BATTERY_COUNT: i64 = 100;

// ============================================================================
// Battery Chemistry
// ============================================================================

/// Battery chemistry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryChemistry {
    /// Lithium-ion.
    LithiumIon,
    /// Lithium-polymer.
    LithiumPolymer,
    /// Primary (non-rechargeable) lithium.
    Lithium,
    /// Nickel-metal hydride.
    NiMH,
    /// Nickel-cadmium.
    NiCd,
    /// Alkaline.
    Alkaline,
    /// Lead-acid.
    LeadAcid,
    /// Present but not identified.
    Unknown,
}

impl BatteryChemistry {
    /// Parses free-text chemistry names ("Li-ion", "lithium polymer", "NiMH").
    ///
    /// Anything unrecognized is [`BatteryChemistry::Unknown`].
    pub fn parse_lenient(raw: &str) -> Self {
        let normalized: String = raw
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "liion" | "lithiumion" | "lion" => Self::LithiumIon,
            "lipo" | "lipolymer" | "lithiumpolymer" | "lithiumionpolymer" | "liionpolymer" => {
                Self::LithiumPolymer
            }
            "lithium" | "li" | "limno2" | "lithiummetal" | "lisocl2" | "lifes2" => Self::Lithium,
            "nimh" | "nickelmetalhydride" => Self::NiMH,
            "nicd" | "nickelcadmium" => Self::NiCd,
            "alkaline" | "alk" => Self::Alkaline,
            "leadacid" | "sla" | "sealedleadacid" | "vrla" => Self::LeadAcid,
            _ => Self::Unknown,
        }
    }

    /// Returns the label written to CSV output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LithiumIon => "Li-ion",
            Self::LithiumPolymer => "Li-Po",
            Self::Lithium => "Lithium",
            Self::NiMH => "NiMH",
            Self::NiCd => "NiCd",
            Self::Alkaline => "Alkaline",
            Self::LeadAcid => "Lead-acid",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns all chemistries.
    pub fn all() -> &'static [BatteryChemistry] {
        &[
            Self::LithiumIon,
            Self::LithiumPolymer,
            Self::Lithium,
            Self::NiMH,
            Self::NiCd,
            Self::Alkaline,
            Self::LeadAcid,
            Self::Unknown,
        ]
    }
}

impl fmt::Display for BatteryChemistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Battery Integration
// ============================================================================

/// How the battery is fitted to the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryIntegration {
    /// User-removable or sold stand-alone.
    Removable,
    /// Built into the product.
    Integrated,
    /// No battery fitted.
    None,
}

impl BatteryIntegration {
    /// Parses an integration status, returning `None` if unrecognized.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "removable" | "standalone" | "replaceable" | "external" | "userreplaceable" => {
                Some(Self::Removable)
            }
            "integrated" | "builtin" | "internal" | "embedded" | "nonremovable" => {
                Some(Self::Integrated)
            }
            "none" | "na" | "nobattery" => Some(Self::None),
            _ => None,
        }
    }

    /// Returns the label written to CSV output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Removable => "Removable",
            Self::Integrated => "Integrated",
            Self::None => "None",
        }
    }
}

impl fmt::Display for BatteryIntegration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Raw Battery Information
// ============================================================================

/// Battery fields as returned by the search service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBatteryInformation {
    /// Part number the service says the data belongs to.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub matched_part_number: Option<String>,
    /// Whether the product contains any battery.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub contains_battery: Option<bool>,
    /// Batteries per unit.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub battery_count: Option<i64>,
    /// Weight of a single battery in kilograms.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub battery_weight_kg: Option<f64>,
    /// Battery type or model ("AA", "18650").
    #[serde(default, deserialize_with = "blank_as_none")]
    pub battery_type_model: Option<String>,
    /// Free-text chemistry.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub battery_chemistry: Option<String>,
    /// Whether the battery is rechargeable.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_rechargeable: Option<bool>,
    /// Battery brand, when stated.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub battery_brand: Option<String>,
    /// Free-text integration status.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub battery_integration: Option<String>,
    /// Candidate reference URLs.
    #[serde(default)]
    pub reference_sources: Vec<String>,
}

// ============================================================================
// Battery Information
// ============================================================================

/// Validated battery information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryInformation {
    contains_battery: bool,
    battery_count: Option<u32>,
    battery_weight_kg: Option<f64>,
    battery_type_model: Option<String>,
    chemistry: Option<BatteryChemistry>,
    is_rechargeable: Option<bool>,
    battery_brand: Option<String>,
    integration: Option<BatteryIntegration>,
    sources: Vec<SourceUrl>,
}

impl BatteryInformation {
    /// Output column names, in order.
    pub const FIELDS: &'static [&'static str] = &[
        "contains_battery",
        "battery_count",
        "battery_weight_kg",
        "battery_type_model",
        "battery_chemistry",
        "is_rechargeable",
        "battery_brand",
        "battery_integration",
    ];

    /// Whether the product contains a battery.
    pub fn contains_battery(&self) -> bool {
        self.contains_battery
    }

    /// Batteries per unit.
    pub fn battery_count(&self) -> Option<u32> {
        self.battery_count
    }

    /// Weight of a single battery in kilograms.
    pub fn battery_weight_kg(&self) -> Option<f64> {
        self.battery_weight_kg
    }

    /// Battery type or model.
    pub fn battery_type_model(&self) -> Option<&str> {
        self.battery_type_model.as_deref()
    }

    /// Battery chemistry.
    pub fn chemistry(&self) -> Option<BatteryChemistry> {
        self.chemistry
    }

    /// Whether the battery is rechargeable.
    pub fn is_rechargeable(&self) -> Option<bool> {
        self.is_rechargeable
    }

    /// Battery brand.
    pub fn battery_brand(&self) -> Option<&str> {
        self.battery_brand.as_deref()
    }

    /// Integration status.
    pub fn integration(&self) -> Option<BatteryIntegration> {
        self.integration
    }

    /// Rebuilds battery information from an output CSV row.
    pub fn from_output_fields(fields: &HashMap<String, String>) -> Result<Self, CoreError> {
        let raw = RawBatteryInformation {
            matched_part_number: text_cell(fields, "Part Number"),
            contains_battery: parse_flag_cell(fields, "contains_battery")?,
            battery_count: match text_cell(fields, "battery_count") {
                Some(raw) => Some(
                    raw.parse::<i64>()
                        .map_err(|_| invalid_field("battery_count", &raw))?,
                ),
                None => None,
            },
            battery_weight_kg: parse_decimal_cell(fields, "battery_weight_kg")?,
            battery_type_model: text_cell(fields, "battery_type_model"),
            battery_chemistry: text_cell(fields, "battery_chemistry"),
            is_rechargeable: parse_flag_cell(fields, "is_rechargeable")?,
            battery_brand: text_cell(fields, "battery_brand"),
            battery_integration: text_cell(fields, "battery_integration"),
            reference_sources: (1..=MAX_REFERENCE_SOURCES)
                .filter_map(|i| text_cell(fields, &source_column(i)))
                .collect(),
        };
        Ok(Self::try_from(raw)?)
    }
}

impl TryFrom<RawBatteryInformation> for BatteryInformation {
    type Error = ValidationError;

    fn try_from(raw: RawBatteryInformation) -> Result<Self, Self::Error> {
        let mut violations = Violations::new();

        let contains_battery = raw.contains_battery.unwrap_or_else(|| {
            violations.push("contains_battery", "is required");
            false
        });

        let integration = match raw.battery_integration.as_deref() {
            Some(text) => {
                let parsed = BatteryIntegration::parse(text);
                if parsed.is_none() {
                    violations.push(
                        "battery_integration",
                        format!("unrecognized integration status {text:?}"),
                    );
                }
                parsed
            }
            None => None,
        };

        let chemistry = raw
            .battery_chemistry
            .as_deref()
            .map(BatteryChemistry::parse_lenient);

        if contains_battery {
            if let Some(count) = raw.battery_count {
                if count < 1 {
                    violations.push(
                        "battery_count",
                        format!("must be at least 1 when the product contains a battery, got {count}"),
                    );
                } else if count > MAX_BATTERY_COUNT {
                    violations.push(
                        "battery_count",
                        format!("{count} exceeds the plausible maximum of {MAX_BATTERY_COUNT}"),
                    );
                }
            }
            check_positive(
                &mut violations,
                "battery_weight_kg",
                raw.battery_weight_kg,
                MAX_BATTERY_WEIGHT_KG,
                "kg",
            );
            if integration == Some(BatteryIntegration::None) {
                violations.push(
                    "battery_integration",
                    "cannot be None when the product contains a battery",
                );
            }
        } else if raw.contains_battery.is_some() {
            let populated = [
                ("battery_count", raw.battery_count.is_some()),
                ("battery_weight_kg", raw.battery_weight_kg.is_some()),
                ("battery_type_model", raw.battery_type_model.is_some()),
                ("battery_chemistry", raw.battery_chemistry.is_some()),
                ("is_rechargeable", raw.is_rechargeable.is_some()),
                ("battery_brand", raw.battery_brand.is_some()),
                (
                    "battery_integration",
                    matches!(
                        integration,
                        Some(BatteryIntegration::Removable | BatteryIntegration::Integrated)
                    ),
                ),
            ];
            for (field, is_set) in populated {
                if is_set {
                    violations.push(field, "must be empty when the product contains no battery");
                }
            }
        }

        let info = Self {
            contains_battery,
            battery_count: raw.battery_count.and_then(|c| u32::try_from(c).ok()),
            battery_weight_kg: raw.battery_weight_kg,
            battery_type_model: raw.battery_type_model,
            chemistry,
            is_rechargeable: raw.is_rechargeable,
            battery_brand: raw.battery_brand,
            integration,
            sources: collect_sources(&raw.reference_sources, MAX_REFERENCE_SOURCES),
        };

        violations.finish("BatteryInformation", info)
    }
}

impl ExtractedRecord for BatteryInformation {
    fn field_names() -> &'static [&'static str] {
        Self::FIELDS
    }

    fn field_values(&self) -> Vec<String> {
        vec![
            format_yes_no(Some(self.contains_battery)),
            self.battery_count.map(|c| c.to_string()).unwrap_or_default(),
            format_decimal(self.battery_weight_kg),
            self.battery_type_model.clone().unwrap_or_default(),
            self.chemistry.map(|c| c.label().to_string()).unwrap_or_default(),
            format_yes_no(self.is_rechargeable),
            self.battery_brand.clone().unwrap_or_default(),
            self.integration.map(|i| i.label().to_string()).unwrap_or_default(),
        ]
    }

    fn sources(&self) -> &[SourceUrl] {
        &self.sources
    }
}
