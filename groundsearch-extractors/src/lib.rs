// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `GroundSearch` Extractors
//!
//! Extraction strategies, row processing and source URL evaluation.
//!
//! Each strategy module includes:
//!
//! - **Prompt**: The grounded search prompt and response schema
//! - **Strategy**: An [`ExtractionStrategy`] that maps responses to validated records
//!
//! ## Strategies
//!
//! | Strategy | Mode | Output suffix | Record |
//! |----------|------|---------------|--------|
//! | [`ProductSpecsStrategy`] | `specs` | `specs_output` | `ProductSpecification` |
//! | [`BatteryInfoStrategy`] | `battery` | `battery_output` | `BatteryInformation` |
//!
//! ## Usage
//!
//! ```ignore
//! use groundsearch_extractors::{ExtractionMode, ProcessorConfig};
//! use groundsearch_store::InputTable;
//!
//! let input = InputTable::read(&path)?;
//! for kind in ExtractionMode::Both.strategies() {
//!     let report = kind.run(&client, &input, &output, ProcessorConfig::default()).await?;
//!     println!("{} rows written", report.rows_total);
//! }
//! ```

pub mod error;
pub mod evaluation;
pub mod processor;
pub mod registry;
pub mod strategy;

// Strategy modules
pub mod battery;
pub mod specs;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types
pub use error::{EvaluationError, ExtractError, ProcessError};
pub use evaluation::{EvaluationReport, ExpectedSpecs, UrlEvaluation, UrlEvaluator, Verdict, parse_verdict};
pub use processor::{ProcessingReport, ProcessorConfig, RowOutcome, RowProcessor, RowState};
pub use registry::{ExtractionMode, StrategyDescriptor, StrategyKind, StrategyRegistry};
pub use strategy::ExtractionStrategy;

// Re-export strategies
pub use battery::BatteryInfoStrategy;
pub use specs::ProductSpecsStrategy;
