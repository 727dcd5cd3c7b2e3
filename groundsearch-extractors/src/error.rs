//! Extraction, processing and evaluation errors.

use std::path::PathBuf;

use groundsearch_core::{CoreError, ValidationError};
use groundsearch_fetch::SearchError;
use groundsearch_store::StoreError;
use thiserror::Error;

// ============================================================================
// Extract Error
// ============================================================================

/// Why a single row could not be extracted.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The search request failed.
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    /// The payload violated record constraints.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The payload describes a different part, or names none.
    #[error(
        "Part number mismatch: expected {expected:?}, got {}",
        .found.as_deref().map_or_else(|| "none".to_string(), |f| format!("{f:?}"))
    )]
    PartNumberMismatch {
        /// Part number from the input row.
        expected: String,
        /// Part number the service reported.
        found: Option<String>,
    },

    /// The payload did not match the response schema.
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// The input row is missing an identifier.
    #[error("Invalid input row: {0}")]
    InvalidQuery(#[from] CoreError),
}

impl ExtractError {
    /// Returns true if repeating the search may succeed.
    ///
    /// Validation failures and part number mismatches are final: the
    /// service answered, and the answer is wrong.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Search(e) => e.is_transient(),
            Self::InvalidPayload(_) => true,
            Self::Validation(_) | Self::PartNumberMismatch { .. } | Self::InvalidQuery(_) => false,
        }
    }

    /// Seconds the service asked us to wait before retrying, if any.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Search(e) => e.retry_after(),
            _ => None,
        }
    }
}

// ============================================================================
// Process Error
// ============================================================================

/// Batch-level failures. These abort the run; row failures never do.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Reading the input or writing the output failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// Evaluation Error
// ============================================================================

/// Failures that stop a URL evaluation run.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Reading the input or writing the report failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The input has no `source_url_N` columns to evaluate.
    #[error("No source URL columns in {}", .0.display())]
    NoSourceColumns(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundsearch_core::FieldViolation;

    #[test]
    fn test_retry_classification() {
        assert!(ExtractError::Search(SearchError::Timeout).is_retryable());
        assert!(ExtractError::Search(SearchError::NoCitations).is_retryable());
        assert!(!ExtractError::Search(SearchError::Authentication("bad key".into())).is_retryable());

        let validation = ValidationError::new(
            "ProductSpecification",
            vec![FieldViolation::new("weight_kg", "too heavy")],
        );
        assert!(!ExtractError::Validation(validation).is_retryable());

        let mismatch = ExtractError::PartNumberMismatch {
            expected: "A-1".into(),
            found: Some("A-2".into()),
        };
        assert!(!mismatch.is_retryable());
    }

    #[test]
    fn test_mismatch_message() {
        let err = ExtractError::PartNumberMismatch {
            expected: "A-1".into(),
            found: None,
        };
        assert_eq!(err.to_string(), r#"Part number mismatch: expected "A-1", got none"#);

        let err = ExtractError::PartNumberMismatch {
            expected: "A-1".into(),
            found: Some("A-2".into()),
        };
        assert_eq!(err.to_string(), r#"Part number mismatch: expected "A-1", got "A-2""#);
    }

    #[test]
    fn test_retry_after_passthrough() {
        let err = ExtractError::Search(SearchError::RateLimited {
            retry_after: Some(7),
        });
        assert_eq!(err.retry_after(), Some(7));
        assert!(err.is_retryable());
    }
}
