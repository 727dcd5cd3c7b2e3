//! Product lookup key.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The identifiers a row is searched by.
///
/// Manufacturer and exact part number form the join key; the description
/// only disambiguates the search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Manufacturer name.
    pub manufacturer: String,
    /// Exact manufacturer part number.
    pub part_number: String,
    /// Free-text product description.
    pub description: String,
}

impl ProductQuery {
    /// Creates a query, trimming every identifier.
    pub fn new(
        manufacturer: impl Into<String>,
        part_number: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            manufacturer: manufacturer.into().trim().to_string(),
            part_number: part_number.into().trim().to_string(),
            description: description.into().trim().to_string(),
        }
    }

    /// Rejects the query if any identifier is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        let missing: Vec<&str> = [
            ("manufacturer", &self.manufacturer),
            ("part_number", &self.part_number),
            ("description", &self.description),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::MissingIdentifier(missing.join(", ")))
        }
    }

    /// Returns true if `candidate` names exactly this query's part number.
    ///
    /// Comparison ignores surrounding whitespace and ASCII case only.
    /// `AB-100` and `AB100` are different parts.
    pub fn matches_part_number(&self, candidate: &str) -> bool {
        candidate.trim().eq_ignore_ascii_case(&self.part_number)
    }

    /// Short label used in log lines.
    pub fn label(&self) -> String {
        format!("{} - {}", self.manufacturer, self.part_number)
    }
}
