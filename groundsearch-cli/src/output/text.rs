//! Text output formatting with colors.

use std::fmt::Write as _;

use groundsearch_extractors::{EvaluationReport, ProcessingReport};
use groundsearch_fetch::FreeformResponse;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

const RULE_WIDTH: usize = 40;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the summary of one extraction run.
    pub fn format_processing(&self, title: &str, report: &ProcessingReport) -> String {
        let mut lines = vec![self.bold(title), "─".repeat(RULE_WIDTH)];

        let degraded = if report.rows_degraded > 0 {
            self.yellow(&format!("{} degraded", report.rows_degraded))
        } else {
            format!("{} degraded", report.rows_degraded)
        };
        lines.push(format!(
            "Rows:     {} ({}, {})",
            report.rows_total,
            self.green(&format!("{} extracted", report.rows_succeeded)),
            degraded
        ));
        lines.push(format!("Output:   {}", self.cyan(&report.output_path.display().to_string())));
        lines.push(format!("Duration: {:.1}s", report.duration.as_secs_f64()));

        lines.join("\n")
    }

    /// Formats a free-form search response.
    pub fn format_search(&self, response: &FreeformResponse) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{}", self.bold("Response:"));
        let _ = writeln!(out, "{}", response.text.trim_end());
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.bold("Response with citations:"));
        let _ = writeln!(out, "{}", response.text_with_citations.trim_end());
        let _ = writeln!(out);
        let _ = writeln!(out, "Sources found: {}", response.citations.len());

        if !response.search_queries.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.bold("Search queries:"));
            for query in &response.search_queries {
                let _ = writeln!(out, "  - {query}");
            }
        }

        if !response.citations.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.bold("Sources:"));
            for (i, citation) in response.citations.iter().enumerate() {
                let title = citation.title.as_deref().unwrap_or("Untitled");
                let _ = writeln!(out, "  {}. {} - {}", i + 1, title, self.cyan(&citation.uri));
            }
        }

        out.trim_end().to_string()
    }

    /// Formats the summary of a URL evaluation run.
    pub fn format_evaluation(&self, report: &EvaluationReport) -> String {
        let mut lines = vec![self.bold("URL Evaluation"), "─".repeat(RULE_WIDTH)];

        lines.push(format!(
            "Rows:          {} evaluated{}",
            report.rows_evaluated,
            if report.rows_skipped > 0 {
                self.dim(&format!(", {} skipped", report.rows_skipped))
            } else {
                String::new()
            }
        ));
        lines.push(format!("Total URLs:    {}", report.total_urls));
        lines.push(format!(
            "Accessible:    {} ({:.1}%)",
            report.accessible_urls,
            report.accessible_percent()
        ));
        lines.push(format!(
            "Correct info:  {} ({:.1}%)",
            self.green(&report.correct_urls.to_string()),
            report.correct_percent()
        ));
        lines.push(format!("Output:        {}", self.cyan(&report.output_path.display().to_string())));

        lines.join("\n")
    }

    // ========================================================================
    // Color helpers
    // ========================================================================

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use groundsearch_fetch::Citation;
    use std::path::PathBuf;
    use std::time::Duration;

    fn report(succeeded: usize, degraded: usize) -> ProcessingReport {
        ProcessingReport {
            strategy: "specs",
            rows_total: succeeded + degraded,
            rows_succeeded: succeeded,
            rows_degraded: degraded,
            output_path: PathBuf::from("parts_specs_output.csv"),
            duration: Duration::from_millis(2500),
        }
    }

    #[test]
    fn test_format_processing() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_processing("Product specifications", &report(9, 1));

        assert!(output.starts_with("Product specifications\n"));
        assert!(output.contains("Rows:     10 (9 extracted, 1 degraded)"));
        assert!(output.contains("Output:   parts_specs_output.csv"));
        assert!(output.contains("Duration: 2.5s"));
    }

    #[test]
    fn test_degraded_rows_are_highlighted() {
        let formatter = TextFormatter::new(true);
        assert!(formatter.format_processing("x", &report(1, 2)).contains(YELLOW));
        assert!(!formatter.format_processing("x", &report(3, 0)).contains(YELLOW));
    }

    #[test]
    fn test_format_search() {
        let response = FreeformResponse {
            text: "It weighs 0.4 kg.".to_string(),
            text_with_citations: "It weighs 0.4 kg. [1](https://a.example)".to_string(),
            citations: vec![
                Citation {
                    uri: "https://a.example".to_string(),
                    title: Some("a.example".to_string()),
                },
                Citation {
                    uri: "https://b.example".to_string(),
                    title: None,
                },
            ],
            search_queries: vec!["MS2-100 weight".to_string()],
        };

        let output = TextFormatter::new(false).format_search(&response);
        assert!(output.starts_with("Response:\nIt weighs 0.4 kg."));
        assert!(output.contains("Response with citations:\nIt weighs 0.4 kg. [1](https://a.example)"));
        assert!(output.contains("Sources found: 2"));
        assert!(output.contains("  - MS2-100 weight"));
        assert!(output.contains("  1. a.example - https://a.example"));
        assert!(output.contains("  2. Untitled - https://b.example"));
    }

    #[test]
    fn test_format_search_without_sources() {
        let response = FreeformResponse {
            text: "No idea.".to_string(),
            text_with_citations: "No idea.".to_string(),
            citations: vec![],
            search_queries: vec![],
        };

        let output = TextFormatter::new(false).format_search(&response);
        assert!(output.ends_with("Sources found: 0"));
        assert!(!output.contains("Search queries:"));
    }

    #[test]
    fn test_format_evaluation() {
        let report = EvaluationReport {
            total_urls: 8,
            accessible_urls: 6,
            correct_urls: 3,
            rows_evaluated: 3,
            rows_skipped: 1,
            output_path: PathBuf::from("parts_evaluation.csv"),
        };

        let output = TextFormatter::new(false).format_evaluation(&report);
        assert!(output.contains("Rows:          3 evaluated, 1 skipped"));
        assert!(output.contains("Total URLs:    8"));
        assert!(output.contains("Accessible:    6 (75.0%)"));
        assert!(output.contains("Correct info:  3 (37.5%)"));
        assert!(output.contains("Output:        parts_evaluation.csv"));
    }
}
