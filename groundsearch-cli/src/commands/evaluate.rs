//! Evaluate command - check the source URLs of a specifications output.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use groundsearch_extractors::UrlEvaluator;
use groundsearch_fetch::{GeminiSearchClient, HttpClient};
use groundsearch_store::{
    InputTable, Settings, api_key_from_env, evaluation_output_path, validate_input_path,
};
use tracing::info;

use crate::output::TextFormatter;

/// Arguments for the evaluate command.
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Specifications output CSV to evaluate.
    pub input: PathBuf,

    /// Report file. Defaults to `<input>_evaluation.csv` next to the input.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Evaluate only the first row.
    #[arg(long)]
    pub test: bool,
}

/// Runs the evaluate command.
pub async fn run(args: &EvaluateArgs, settings: &Settings, use_colors: bool) -> Result<()> {
    validate_input_path(&args.input)?;

    let client = GeminiSearchClient::new(api_key_from_env()?, settings.gemini_config())
        .context("Could not create search client")?;
    let http = HttpClient::new().context("Could not create HTTP client")?;
    let input = InputTable::read(&args.input)?;

    let test_mode = settings.processing.test_mode;
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| evaluation_output_path(&args.input, test_mode));

    info!(
        input = %args.input.display(),
        output = %output_path.display(),
        rows = input.len(),
        test_mode,
        "Starting URL evaluation"
    );

    let evaluator = UrlEvaluator::new(&client, http, settings.search_options());
    let report = evaluator
        .evaluate_table(&input, &output_path, test_mode)
        .await
        .context("Evaluation failed")?;

    println!("{}", TextFormatter::new(use_colors).format_evaluation(&report));

    Ok(())
}
