//! Source URL evaluation.
//!
//! Re-checks the `source_url_N` cells of a product specification output:
//! is each page reachable, and does it describe the product with the
//! weight and dimensions that were extracted? The second question goes to
//! the search service as a free-form prompt answered in the form
//! `STATUS|CONFIDENCE|EXPLANATION`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use groundsearch_core::{
    MAX_REFERENCE_SOURCES, ProductQuery, ProductSpecification, format_decimal, source_column,
};
use groundsearch_fetch::host::http::truncate_chars;
use groundsearch_fetch::{GenerationOptions, HttpClient, SearchClient};
use groundsearch_store::{
    CsvOutput, DESCRIPTION_COLUMN, InputTable, MANUFACTURER_COLUMN, PART_NUMBER_COLUMN,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::EvaluationError;

/// Timeout for the reachability check.
pub const HEAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for fetching page content.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Most page characters kept after a fetch.
pub const MAX_PAGE_CHARS: usize = 50_000;

/// Page characters included in the judging prompt.
pub const PROMPT_PAGE_CHARS: usize = 2_000;

/// Pause between URLs.
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(1);

/// Report columns.
pub const EVALUATION_COLUMNS: &[&str] = &[
    "row",
    "manufacturer",
    "part_number",
    "source_number",
    "url",
    "accessible",
    "status_code",
    "has_correct_info",
    "confidence_score",
    "validation_notes",
];

const NOT_ACCESSIBLE: &str = "URL not accessible";
const NO_CONTENT: &str = "Could not fetch page content";
const UNPARSABLE: &str = "Unable to parse LLM response";
const NOT_AVAILABLE: &str = "N/A";

// ============================================================================
// Expected Values
// ============================================================================

/// Extracted values the page is checked against. Blank cells read `N/A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedSpecs {
    /// Weight in kilograms.
    pub weight_kg: String,
    /// Length in centimeters.
    pub length_cm: String,
    /// Width in centimeters.
    pub width_cm: String,
    /// Height in centimeters.
    pub height_cm: String,
}

impl ExpectedSpecs {
    /// Reads the extracted values of an output row.
    ///
    /// Rows that parse as a [`ProductSpecification`] are shown the way they
    /// were written; anything else falls back to the raw cells.
    fn from_row(input: &InputTable, row: &[String]) -> Self {
        match ProductSpecification::from_output_fields(&input.row_map(row)) {
            Ok(spec) => Self {
                weight_kg: display(spec.weight_kg()),
                length_cm: display(spec.length_cm()),
                width_cm: display(spec.width_cm()),
                height_cm: display(spec.height_cm()),
            },
            Err(e) => {
                debug!(error = %e, "Output row does not parse, using raw cells");
                let value = |column: &str| {
                    input
                        .column_index(column)
                        .and_then(|i| row.get(i))
                        .map(|v| v.trim())
                        .filter(|v| !v.is_empty())
                        .map_or_else(|| NOT_AVAILABLE.to_string(), str::to_string)
                };
                Self {
                    weight_kg: value("weight_kg"),
                    length_cm: value("length_cm"),
                    width_cm: value("width_cm"),
                    height_cm: value("height_cm"),
                }
            }
        }
    }
}

fn display(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format_decimal(Some(v)))
}

// ============================================================================
// Verdict
// ============================================================================

/// The service's judgement of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    /// True only for status `CORRECT`.
    pub is_correct: bool,
    /// Confidence between 0 and 1.
    pub confidence: f64,
    /// Short explanation.
    pub explanation: String,
}

impl Verdict {
    fn failed(explanation: impl Into<String>) -> Self {
        Self {
            is_correct: false,
            confidence: 0.0,
            explanation: explanation.into(),
        }
    }
}

/// Parses a `STATUS|CONFIDENCE|EXPLANATION` reply.
///
/// Replies with fewer than three parts are unparsable. Only the status
/// `CORRECT` counts as correct; `PARTIAL` and `INCORRECT` do not.
pub fn parse_verdict(reply: &str) -> Verdict {
    let parts: Vec<&str> = reply.trim().split('|').collect();
    let [status, confidence, explanation, ..] = parts.as_slice() else {
        return Verdict::failed(UNPARSABLE);
    };

    match confidence.trim().parse::<f64>() {
        Ok(confidence) => Verdict {
            is_correct: status.trim() == "CORRECT",
            confidence,
            explanation: explanation.trim().to_string(),
        },
        Err(_) => Verdict::failed(format!(
            "Validation error: invalid confidence score {:?}",
            confidence.trim()
        )),
    }
}

/// Builds the judging prompt for one page.
pub fn validation_prompt(query: &ProductQuery, expected: &ExpectedSpecs, content: &str) -> String {
    format!(
        "Analyze the following webpage content to determine if it contains accurate information about this product:\n\n\
         Expected Product:\n\
         - Manufacturer: {manufacturer}\n\
         - Part Number: {part_number}\n\
         - Description: {description}\n\
         - Expected Weight: {weight} kg\n\
         - Expected Dimensions: {length} x {width} x {height} cm\n\n\
         Webpage Content (first {PROMPT_PAGE_CHARS} chars):\n\
         {page}\n\n\
         Please evaluate:\n\
         1. Does this page describe the correct product (matching manufacturer and exact part number)?\n\
         2. Are the weight and dimensions consistent with the expected values?\n\
         3. Is this a reliable source (manufacturer site, official retailer, technical documentation)?\n\n\
         Respond with:\n\
         - CORRECT: if the product matches and the specs are consistent\n\
         - INCORRECT: if it is the wrong product or the specs differ significantly\n\
         - PARTIAL: if it is the correct product but specs are missing or unclear\n\n\
         Also provide a confidence score (0.0-1.0) and a brief explanation.\n\n\
         Format: STATUS|CONFIDENCE|EXPLANATION",
        manufacturer = query.manufacturer,
        part_number = query.part_number,
        description = query.description,
        weight = expected.weight_kg,
        length = expected.length_cm,
        width = expected.width_cm,
        height = expected.height_cm,
        page = truncate_chars(content, PROMPT_PAGE_CHARS),
    )
}

// ============================================================================
// Results
// ============================================================================

/// Evaluation of one source URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlEvaluation {
    /// The URL.
    pub url: String,
    /// Whether a HEAD request answered below 400.
    pub accessible: bool,
    /// HEAD status code, if a response arrived.
    pub status_code: Option<u16>,
    /// Whether the page matches, if it could be judged.
    pub has_correct_info: Option<bool>,
    /// Judge confidence, if the page could be judged.
    pub confidence: Option<f64>,
    /// Why the result is what it is.
    pub notes: String,
}

impl UrlEvaluation {
    fn cells(&self) -> [String; 5] {
        [
            self.accessible.to_string(),
            self.status_code.map(|c| c.to_string()).unwrap_or_default(),
            self.has_correct_info.map(|c| c.to_string()).unwrap_or_default(),
            self.confidence.map(|c| c.to_string()).unwrap_or_default(),
            self.notes.clone(),
        ]
    }
}

/// Summary of an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// URLs evaluated.
    pub total_urls: usize,
    /// URLs that answered below 400.
    pub accessible_urls: usize,
    /// URLs judged `CORRECT`.
    pub correct_urls: usize,
    /// Rows whose sources were evaluated.
    pub rows_evaluated: usize,
    /// Rows skipped for missing identifiers.
    pub rows_skipped: usize,
    /// Report file.
    pub output_path: PathBuf,
}

impl EvaluationReport {
    /// Share of accessible URLs, in percent.
    pub fn accessible_percent(&self) -> f64 {
        percent(self.accessible_urls, self.total_urls)
    }

    /// Share of correct URLs, in percent.
    pub fn correct_percent(&self) -> f64 {
        percent(self.correct_urls, self.total_urls)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

// ============================================================================
// URL Evaluator
// ============================================================================

/// Checks source URLs for reachability and content.
pub struct UrlEvaluator<'a, C: ?Sized> {
    client: &'a C,
    http: HttpClient,
    options: GenerationOptions,
    pause: Duration,
}

impl<'a, C> UrlEvaluator<'a, C>
where
    C: SearchClient + ?Sized,
{
    /// Creates an evaluator.
    pub fn new(client: &'a C, http: HttpClient, options: GenerationOptions) -> Self {
        Self {
            client,
            http,
            options,
            pause: DEFAULT_PAUSE,
        }
    }

    /// Sets the pause between URLs.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// HEAD-checks a URL. Accessible means a status below 400.
    pub async fn check_accessibility(&self, url: &str) -> (bool, Option<u16>) {
        if url.trim().is_empty() {
            return (false, None);
        }
        match self.http.head_status(url, HEAD_TIMEOUT).await {
            Ok(status) => (status < 400, Some(status)),
            Err(e) => {
                debug!(url, error = %e, "URL check failed");
                (false, None)
            }
        }
    }

    /// Fetches at most [`MAX_PAGE_CHARS`] characters of a page.
    pub async fn fetch_page(&self, url: &str) -> Option<String> {
        match self.http.get_text(url, PAGE_TIMEOUT, MAX_PAGE_CHARS).await {
            Ok(content) if !content.trim().is_empty() => Some(content),
            Ok(_) => None,
            Err(e) => {
                debug!(url, error = %e, "Content fetch failed");
                None
            }
        }
    }

    /// Asks the search service whether `content` describes the product.
    pub async fn judge_content(
        &self,
        content: &str,
        query: &ProductQuery,
        expected: &ExpectedSpecs,
    ) -> Verdict {
        let prompt = validation_prompt(query, expected, content);
        match self.client.search_freeform(&prompt, &self.options).await {
            Ok(answer) => parse_verdict(&answer.text),
            Err(e) => {
                warn!(error = %e, "Content validation failed");
                Verdict::failed(format!("Validation error: {e}"))
            }
        }
    }

    /// Evaluates one URL end to end.
    #[instrument(skip(self, query, expected), fields(part_number = %query.part_number))]
    pub async fn evaluate_url(
        &self,
        url: &str,
        query: &ProductQuery,
        expected: &ExpectedSpecs,
    ) -> UrlEvaluation {
        let (accessible, status_code) = self.check_accessibility(url).await;
        let mut evaluation = UrlEvaluation {
            url: url.to_string(),
            accessible,
            status_code,
            has_correct_info: None,
            confidence: None,
            notes: String::new(),
        };

        if !accessible {
            evaluation.notes = NOT_ACCESSIBLE.to_string();
            return evaluation;
        }

        let Some(content) = self.fetch_page(url).await else {
            evaluation.notes = NO_CONTENT.to_string();
            return evaluation;
        };

        let verdict = self.judge_content(&content, query, expected).await;
        evaluation.has_correct_info = Some(verdict.is_correct);
        evaluation.confidence = Some(verdict.confidence);
        evaluation.notes = verdict.explanation;
        evaluation
    }

    /// Evaluates every source URL of `input` and writes the report to
    /// `output_path`.
    ///
    /// In test mode only the first row with complete identifiers is
    /// evaluated.
    ///
    /// # Errors
    ///
    /// Fails if identifier or source columns are missing or the report
    /// cannot be written.
    pub async fn evaluate_table(
        &self,
        input: &InputTable,
        output_path: &Path,
        test_mode: bool,
    ) -> Result<EvaluationReport, EvaluationError> {
        let manufacturer_col = input.require_column(MANUFACTURER_COLUMN)?;
        let part_number_col = input.require_column(PART_NUMBER_COLUMN)?;
        let description_col = input.require_column(DESCRIPTION_COLUMN)?;

        let source_cols: Vec<(usize, usize)> = (1..=MAX_REFERENCE_SOURCES)
            .filter_map(|n| input.column_index(&source_column(n)).map(|col| (n, col)))
            .collect();
        if source_cols.is_empty() {
            return Err(EvaluationError::NoSourceColumns(input.path().to_path_buf()));
        }

        let headers: Vec<String> = EVALUATION_COLUMNS.iter().map(|c| (*c).to_string()).collect();
        let mut output = CsvOutput::create(output_path, &headers)?;

        let mut report = EvaluationReport {
            total_urls: 0,
            accessible_urls: 0,
            correct_urls: 0,
            rows_evaluated: 0,
            rows_skipped: 0,
            output_path: output_path.to_path_buf(),
        };

        for (index, row) in input.rows().iter().enumerate() {
            let row_number = index + 1;
            let query = ProductQuery::new(
                cell(row, manufacturer_col),
                cell(row, part_number_col),
                cell(row, description_col),
            );

            if query.validate().is_err() {
                info!(row = row_number, "Skipping row: missing product information");
                report.rows_skipped += 1;
                continue;
            }

            info!(
                row = row_number,
                manufacturer = %query.manufacturer,
                part_number = %query.part_number,
                "Evaluating row"
            );
            let expected = ExpectedSpecs::from_row(input, row);

            for &(source_number, col) in &source_cols {
                let url = cell(row, col);
                if url.is_empty() {
                    continue;
                }

                let evaluation = self.evaluate_url(url, &query, &expected).await;
                report.total_urls += 1;
                if evaluation.accessible {
                    report.accessible_urls += 1;
                }
                if evaluation.has_correct_info == Some(true) {
                    report.correct_urls += 1;
                }

                let mut cells = vec![
                    row_number.to_string(),
                    query.manufacturer.clone(),
                    query.part_number.clone(),
                    source_number.to_string(),
                    url.to_string(),
                ];
                cells.extend(evaluation.cells());
                output.write_row(&cells)?;

                if !self.pause.is_zero() {
                    tokio::time::sleep(self.pause).await;
                }
            }

            report.rows_evaluated += 1;
            if test_mode {
                info!("Test mode: stopping after the first row");
                break;
            }
        }

        info!(
            urls = report.total_urls,
            accessible = report.accessible_urls,
            correct = report.correct_urls,
            output = %output_path.display(),
            "Evaluation finished"
        );
        Ok(report)
    }
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", |v| v.trim())
}
