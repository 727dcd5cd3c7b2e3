//! Extraction commands - `specs`, `battery` and `both`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use groundsearch_extractors::{ExtractionMode, ProcessorConfig};
use groundsearch_fetch::GeminiSearchClient;
use groundsearch_store::{
    InputTable, Settings, api_key_from_env, default_output_path, resolve_input_path,
    validate_input_path,
};
use tracing::info;

use crate::output::TextFormatter;

/// Arguments shared by the extraction commands.
#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Input CSV with Manufacturer, Part Number and Description columns.
    #[arg(long, short)]
    pub input: PathBuf,

    /// Process only the first row.
    #[arg(long)]
    pub test: bool,

    /// Output file. In `both` mode, the output directory.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Runs one extraction mode over the input file.
pub async fn run(
    mode: ExtractionMode,
    args: &ExtractArgs,
    settings: &Settings,
    use_colors: bool,
) -> Result<()> {
    let input_path = resolve_input_path(&args.input, &settings.data.input_dir);
    validate_input_path(&input_path)?;

    let client = GeminiSearchClient::new(api_key_from_env()?, settings.gemini_config())
        .context("Could not create search client")?;
    let input = InputTable::read(&input_path)?;

    info!(
        mode = %mode,
        input = %input_path.display(),
        rows = input.len(),
        test_mode = settings.processing.test_mode,
        "Starting extraction"
    );

    let config = ProcessorConfig::from_settings(settings);
    let formatter = TextFormatter::new(use_colors);

    for kind in mode.strategies() {
        let descriptor = kind.descriptor();
        let output_path = output_path_for(
            mode,
            args.output.as_deref(),
            &settings.data.output_dir,
            &input_path,
            descriptor.output_suffix,
        );

        let report = kind
            .run(&client, &input, &output_path, config.clone())
            .await
            .with_context(|| format!("{} failed", descriptor.display_name))?;

        println!("{}", formatter.format_processing(descriptor.display_name, &report));
    }

    Ok(())
}

/// Where one strategy writes.
///
/// `--output` is the file in single-strategy modes and the directory in
/// `both` mode. Without it, default names go to the configured output
/// directory.
fn output_path_for(
    mode: ExtractionMode,
    output: Option<&Path>,
    output_dir: &Path,
    input: &Path,
    suffix: &str,
) -> PathBuf {
    match (mode, output) {
        (ExtractionMode::Both, Some(dir)) => default_output_path(dir, input, suffix),
        (_, Some(path)) => path.to_path_buf(),
        (_, None) => default_output_path(output_dir, input, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_names() {
        let input = Path::new("data/parts.csv");
        assert_eq!(
            output_path_for(ExtractionMode::Specs, None, Path::new("out"), input, "specs_output"),
            PathBuf::from("out/parts_specs_output.csv")
        );
        assert_eq!(
            output_path_for(ExtractionMode::Battery, None, Path::new("."), input, "battery_output"),
            PathBuf::from("./parts_battery_output.csv")
        );
    }

    #[test]
    fn test_output_is_file_in_single_mode() {
        let path = output_path_for(
            ExtractionMode::Specs,
            Some(Path::new("results/specs.csv")),
            Path::new("."),
            Path::new("parts.csv"),
            "specs_output",
        );
        assert_eq!(path, PathBuf::from("results/specs.csv"));
    }

    #[test]
    fn test_output_is_directory_in_both_mode() {
        let dir = Path::new("results");
        let input = Path::new("parts.csv");
        assert_eq!(
            output_path_for(ExtractionMode::Both, Some(dir), Path::new("."), input, "specs_output"),
            PathBuf::from("results/parts_specs_output.csv")
        );
        assert_eq!(
            output_path_for(ExtractionMode::Both, Some(dir), Path::new("."), input, "battery_output"),
            PathBuf::from("results/parts_battery_output.csv")
        );
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_credentials() {
        let args = ExtractArgs {
            input: PathBuf::from("definitely/not/here.csv"),
            test: false,
            output: None,
        };
        let settings = Settings::default();

        let err = run(ExtractionMode::Specs, &args, &settings, false).await.unwrap_err();
        assert!(err.to_string().contains("not found"), "{err}");
    }

    #[tokio::test]
    async fn test_non_csv_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("parts.xlsx");
        std::fs::write(&input, "Manufacturer,Part Number,Description\n").unwrap();

        let args = ExtractArgs {
            input,
            test: true,
            output: None,
        };
        let err = run(ExtractionMode::Battery, &args, &Settings::default(), false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains(".csv"), "{err}");
    }
}
