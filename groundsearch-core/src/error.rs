//! Core error types for GroundSearch.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Field Violation
// ============================================================================

/// A single violated constraint on a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Name of the offending field (e.g. `weight_kg`).
    pub field: String,
    /// Human-readable description of the violated constraint.
    pub message: String,
}

impl FieldViolation {
    /// Creates a new violation.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ============================================================================
// Validation Error
// ============================================================================

/// Error returned when a record fails validation.
///
/// Carries every violated constraint, not just the first one found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{record} failed validation: {}", format_violations(.violations))]
pub struct ValidationError {
    /// Record type that failed validation.
    pub record: &'static str,
    /// All violated constraints.
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Creates a validation error for the given record type.
    pub fn new(record: &'static str, violations: Vec<FieldViolation>) -> Self {
        Self { record, violations }
    }

    /// Returns true if a violation was recorded for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// Returns the names of all offending fields, in order.
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Violation Collector
// ============================================================================

/// Accumulates violations while a record is being validated.
#[derive(Debug, Default)]
pub(crate) struct Violations {
    items: Vec<FieldViolation>,
}

impl Violations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, field: &str, message: impl Into<String>) {
        self.items.push(FieldViolation::new(field, message));
    }

    /// Finishes validation, yielding `Ok(value)` if nothing was recorded.
    pub(crate) fn finish<T>(self, record: &'static str, value: T) -> Result<T, ValidationError> {
        if self.items.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError::new(record, self.items))
        }
    }
}

// ============================================================================
// Core Error
// ============================================================================

/// Core error type for GroundSearch operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Record validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A query identifier was blank.
    #[error("All product identifiers (manufacturer, part number, description) must be provided; missing: {0}")]
    MissingIdentifier(String),

    /// A CSV cell could not be parsed back into a record field.
    #[error("Invalid value for {field}: {value:?}")]
    InvalidField {
        /// Field name.
        field: String,
        /// Offending cell value.
        value: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
