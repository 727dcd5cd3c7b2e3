//! Row processor.
//!
//! Drives one extraction strategy over an input table, one row at a time.
//! Every input row produces exactly one output row: rows that cannot be
//! extracted are written with their original cells and empty extracted
//! columns.
//!
//! ## Row lifecycle
//!
//! ```text
//! Pending -> Searching -> Validating -> Done
//!               |             |
//!               v             v
//!        FailedRetryable  FailedTerminal
//!               |
//!               +--> Searching (until attempts run out)
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use groundsearch_core::{ExtractedRecord, ProductQuery, source_column};
use groundsearch_fetch::{GenerationOptions, RetryStrategy, SearchClient};
use groundsearch_store::{
    CsvOutput, DESCRIPTION_COLUMN, InputTable, MANUFACTURER_COLUMN, PART_NUMBER_COLUMN, Settings,
};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{ExtractError, ProcessError};
use crate::strategy::ExtractionStrategy;

/// Default number of `source_url_N` output columns.
pub const DEFAULT_MAX_SOURCES: usize = 3;

// ============================================================================
// Configuration
// ============================================================================

/// Processing knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    /// Retry schedule for transient failures.
    pub retry: RetryStrategy,
    /// Number of `source_url_N` output columns.
    pub max_sources: usize,
    /// Stop after the first row.
    pub test_mode: bool,
    /// Sampling options for structured requests.
    pub options: GenerationOptions,
}

impl ProcessorConfig {
    /// Builds the processor configuration from resolved settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            retry: settings.retry_strategy(),
            max_sources: settings.processing.max_sources,
            test_mode: settings.processing.test_mode,
            options: settings.structured_options(),
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            retry: RetryStrategy::default(),
            max_sources: DEFAULT_MAX_SOURCES,
            test_mode: false,
            options: GenerationOptions::structured(),
        }
    }
}

// ============================================================================
// Row State
// ============================================================================

/// Where a row is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    /// Not started.
    Pending,
    /// A search request is in flight.
    Searching {
        /// 1-based attempt number.
        attempt: u32,
    },
    /// The response is being validated.
    Validating,
    /// A record was extracted.
    Done,
    /// The attempt failed and will be retried.
    FailedRetryable {
        /// The attempt that failed.
        attempt: u32,
    },
    /// The row failed for good and will be written without extracted data.
    FailedTerminal,
}

impl RowState {
    /// Returns true if no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::FailedTerminal)
    }

    /// Returns true if the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Pending, Self::Searching { attempt: 1 })
            | (Self::Pending | Self::Searching { .. } | Self::Validating, Self::FailedTerminal)
            | (Self::Searching { .. }, Self::Validating)
            | (Self::Validating, Self::Done | Self::FailedRetryable { .. }) => true,
            (Self::Searching { attempt }, Self::FailedRetryable { attempt: failed }) => {
                attempt == failed
            }
            (Self::FailedRetryable { attempt }, Self::Searching { attempt: next }) => {
                next == attempt + 1
            }
            _ => false,
        }
    }
}

impl fmt::Display for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Searching { attempt } => write!(f, "searching (attempt {attempt})"),
            Self::Validating => write!(f, "validating"),
            Self::Done => write!(f, "done"),
            Self::FailedRetryable { attempt } => write!(f, "failed, retryable (attempt {attempt})"),
            Self::FailedTerminal => write!(f, "failed"),
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// The result of processing one row.
#[derive(Debug)]
pub enum RowOutcome<R> {
    /// A validated record.
    Extracted {
        /// The record.
        record: R,
        /// Search attempts made.
        attempts: u32,
    },
    /// The row is written without extracted data.
    Degraded {
        /// The final error.
        error: ExtractError,
        /// Search attempts made (0 for invalid input).
        attempts: u32,
    },
}

impl<R> RowOutcome<R> {
    /// Search attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Extracted { attempts, .. } | Self::Degraded { attempts, .. } => *attempts,
        }
    }

    /// The extracted record, if any.
    pub fn record(&self) -> Option<&R> {
        match self {
            Self::Extracted { record, .. } => Some(record),
            Self::Degraded { .. } => None,
        }
    }

    /// The final error, if the row degraded.
    pub fn error(&self) -> Option<&ExtractError> {
        match self {
            Self::Extracted { .. } => None,
            Self::Degraded { error, .. } => Some(error),
        }
    }
}

/// Summary of one processing run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingReport {
    /// Strategy identifier.
    pub strategy: &'static str,
    /// Rows written.
    pub rows_total: usize,
    /// Rows with extracted data.
    pub rows_succeeded: usize,
    /// Rows written without extracted data.
    pub rows_degraded: usize,
    /// Output file.
    pub output_path: PathBuf,
    /// Wall-clock time of the run.
    pub duration: Duration,
}

// ============================================================================
// Row Processor
// ============================================================================

/// Runs one strategy against a search client.
pub struct RowProcessor<'a, C: ?Sized, S> {
    client: &'a C,
    strategy: &'a S,
    config: ProcessorConfig,
}

impl<'a, C, S> RowProcessor<'a, C, S>
where
    C: SearchClient + ?Sized,
    S: ExtractionStrategy,
{
    /// Creates a processor.
    pub fn new(client: &'a C, strategy: &'a S, config: ProcessorConfig) -> Self {
        Self {
            client,
            strategy,
            config,
        }
    }

    /// Output header: input columns, extracted fields, then source columns.
    pub fn output_headers(&self, input_headers: &[String]) -> Vec<String> {
        input_headers
            .iter()
            .cloned()
            .chain(self.strategy.output_fields().iter().map(|f| (*f).to_string()))
            .chain((1..=self.config.max_sources).map(source_column))
            .collect()
    }

    /// Processes every row of `input` into a new CSV at `output_path`.
    ///
    /// # Errors
    ///
    /// Fails if a required column is missing or the output cannot be
    /// written. Row-level failures never fail the run.
    pub async fn run(
        &self,
        input: &InputTable,
        output_path: &Path,
    ) -> Result<ProcessingReport, ProcessError> {
        let started = Instant::now();

        let manufacturer_col = input.require_column(MANUFACTURER_COLUMN)?;
        let part_number_col = input.require_column(PART_NUMBER_COLUMN)?;
        let description_col = input.require_column(DESCRIPTION_COLUMN)?;

        let mut output = CsvOutput::create(output_path, &self.output_headers(input.headers()))?;

        info!(
            strategy = self.strategy.id(),
            client = self.client.id(),
            rows = input.len(),
            output = %output_path.display(),
            test_mode = self.config.test_mode,
            "Starting extraction"
        );

        let mut succeeded = 0;
        let mut degraded = 0;

        for (index, row) in input.rows().iter().enumerate() {
            let query = ProductQuery::new(
                cell(row, manufacturer_col),
                cell(row, part_number_col),
                cell(row, description_col),
            );
            info!(
                row = index + 1,
                manufacturer = %query.manufacturer,
                part_number = %query.part_number,
                "Processing row"
            );

            let outcome = self.process_row(&query).await;
            output.write_row(&self.output_row(row, &outcome))?;

            match &outcome {
                RowOutcome::Extracted { attempts, .. } => {
                    succeeded += 1;
                    info!(
                        row = index + 1,
                        manufacturer = %query.manufacturer,
                        part_number = %query.part_number,
                        attempts,
                        "Row extracted"
                    );
                }
                RowOutcome::Degraded { error, attempts } => {
                    degraded += 1;
                    error!(
                        row = index + 1,
                        manufacturer = %query.manufacturer,
                        part_number = %query.part_number,
                        attempts,
                        error = %error,
                        "Row written without extracted data"
                    );
                }
            }

            if self.config.test_mode {
                info!("Test mode: stopping after the first row");
                break;
            }
        }

        let report = ProcessingReport {
            strategy: self.strategy.id(),
            rows_total: output.rows_written(),
            rows_succeeded: succeeded,
            rows_degraded: degraded,
            output_path: output.path().to_path_buf(),
            duration: started.elapsed(),
        };

        info!(
            strategy = report.strategy,
            rows = report.rows_total,
            succeeded = report.rows_succeeded,
            degraded = report.rows_degraded,
            elapsed_ms = u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
            "Extraction finished"
        );
        Ok(report)
    }

    /// Runs one row through the lifecycle. Never fails; failures degrade.
    #[instrument(
        skip(self, query),
        fields(manufacturer = %query.manufacturer, part_number = %query.part_number)
    )]
    pub async fn process_row(&self, query: &ProductQuery) -> RowOutcome<S::Record> {
        let mut state = RowState::Pending;

        if let Err(e) = query.validate() {
            advance(state, RowState::FailedTerminal);
            warn!(error = %e, "Skipping search for incomplete row");
            return RowOutcome::Degraded {
                error: ExtractError::InvalidQuery(e),
                attempts: 0,
            };
        }

        let prompt = self.strategy.build_prompt(query);
        let schema = self.strategy.response_schema();
        let mut attempt = 1;

        loop {
            state = advance(state, RowState::Searching { attempt });

            let failure = match self
                .client
                .search_structured(&prompt, &schema, &self.config.options)
                .await
            {
                Ok(response) => {
                    state = advance(state, RowState::Validating);
                    match self.strategy.map_response(query, response) {
                        Ok(record) => {
                            advance(state, RowState::Done);
                            return RowOutcome::Extracted {
                                record,
                                attempts: attempt,
                            };
                        }
                        Err(e) => e,
                    }
                }
                Err(e) => ExtractError::Search(e),
            };

            if failure.is_retryable() && self.config.retry.should_retry(attempt) {
                state = advance(state, RowState::FailedRetryable { attempt });
                let delay = self.retry_delay(&failure, attempt);
                warn!(
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %failure,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            advance(state, RowState::FailedTerminal);
            if failure.is_retryable() {
                warn!(attempts = attempt, "Retry attempts exhausted");
            }
            return RowOutcome::Degraded {
                error: failure,
                attempts: attempt,
            };
        }
    }

    /// Backoff delay, stretched to the service's `Retry-After` when that
    /// is longer, never beyond the configured ceiling.
    fn retry_delay(&self, error: &ExtractError, attempt: u32) -> Duration {
        let delay = self.config.retry.delay_for_attempt(attempt);
        match error.retry_after() {
            Some(secs) => delay
                .max(Duration::from_secs(secs))
                .min(self.config.retry.max_delay),
            None => delay,
        }
    }

    fn output_row(&self, original: &[String], outcome: &RowOutcome<S::Record>) -> Vec<String> {
        let mut cells = original.to_vec();
        match outcome.record() {
            Some(record) => {
                cells.extend(record.field_values());
                cells.extend(record.source_cells(self.config.max_sources));
            }
            None => {
                let width = self.strategy.output_fields().len() + self.config.max_sources;
                cells.resize(original.len() + width, String::new());
            }
        }
        cells
    }
}

fn advance(from: RowState, to: RowState) -> RowState {
    debug_assert!(from.can_transition_to(to), "invalid row transition {from} -> {to}");
    debug!(from = %from, to = %to, "Row state");
    to
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", String::as_str)
}
