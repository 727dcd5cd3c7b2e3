//! Config command - show and initialise configuration.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};
use groundsearch_store::{Settings, default_config_path};
use tracing::info;

use crate::output::JsonFormatter;

/// Arguments for the config command.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the resolved configuration.
    Show {
        /// Pretty-print JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Show the default configuration file path.
    Path,

    /// Write the default configuration to a file.
    Init {
        /// Destination file.
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, settings: &Settings) -> Result<()> {
    match &args.action {
        ConfigAction::Show { pretty } => show_config(settings, *pretty),
        ConfigAction::Path => {
            println!("{}", default_config_path().display());
            Ok(())
        }
        ConfigAction::Init { path, force } => init_config(path, *force),
    }
}

fn show_config(settings: &Settings, pretty: bool) -> Result<()> {
    // The API key is not part of Settings, so it never shows up here.
    println!("{}", JsonFormatter::new(pretty).format(settings)?);
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Settings::default().save_to(path)?;

    info!(path = %path.display(), "Configuration initialised");
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
