//! Search command - one free-form grounded search.

use anyhow::{Context, Result};
use clap::Args;
use groundsearch_fetch::{GeminiSearchClient, SearchClient};
use groundsearch_store::{Settings, api_key_from_env};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};

/// Arguments for the search command.
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Free-form query.
    pub query: String,

    /// Print the response as JSON.
    #[arg(long)]
    pub json: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,
}

/// Runs the search command.
pub async fn run(args: &SearchArgs, settings: &Settings, use_colors: bool) -> Result<()> {
    let query = args.query.trim();
    anyhow::ensure!(!query.is_empty(), "Search query must not be empty");

    let client = GeminiSearchClient::new(api_key_from_env()?, settings.gemini_config())
        .context("Could not create search client")?;

    info!(query, "Running grounded search");
    let response = client
        .search_freeform(query, &settings.search_options())
        .await
        .context("Search failed")?;

    if args.json {
        println!("{}", JsonFormatter::new(args.pretty).format(&response)?);
    } else {
        println!("{}", TextFormatter::new(use_colors).format_search(&response));
    }

    Ok(())
}
