//! Trait definitions for GroundSearch.
//!
//! Extracted records share one output surface so the row processor can
//! write any of them without knowing the concrete type.

use crate::models::SourceUrl;

/// A validated record that can be written as CSV output columns.
pub trait ExtractedRecord: Send + Sync {
    /// Output column names, in the order [`field_values`](Self::field_values)
    /// yields them.
    fn field_names() -> &'static [&'static str]
    where
        Self: Sized;

    /// Formatted cell values aligned with [`field_names`](Self::field_names).
    ///
    /// Unknown values are empty strings.
    fn field_values(&self) -> Vec<String>;

    /// Validated reference sources, in order of first appearance.
    fn sources(&self) -> &[SourceUrl];

    /// Source URLs padded or truncated to exactly `count` cells.
    fn source_cells(&self, count: usize) -> Vec<String> {
        let mut cells: Vec<String> = self
            .sources()
            .iter()
            .take(count)
            .map(|url| url.as_str().to_string())
            .collect();
        cells.resize(count, String::new());
        cells
    }
}
