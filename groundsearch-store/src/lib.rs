// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `GroundSearch` Store
//!
//! Configuration and file storage for `GroundSearch`.
//!
//! This crate provides:
//!
//! - **Settings**: Layered configuration (env > CLI > file > defaults)
//! - **Credentials**: API key lookup from the environment
//! - **CSV I/O**: Header-driven input tables and flushed output writers
//! - **Persistence**: Default paths and JSON file helpers
//!
//! ## Usage
//!
//! ```ignore
//! use groundsearch_store::{CliOverrides, Settings, api_key_from_env};
//!
//! let settings = Settings::load(None, &CliOverrides::default())?;
//! let api_key = api_key_from_env()?;
//! ```

pub mod config;
pub mod credentials;
pub mod csv_io;
pub mod error;
pub mod persistence;

pub use config::{
    CliOverrides, DataSettings, GeminiSettings, LogLevel, LoggingSettings, ProcessingSettings,
    Settings, resolve,
};
pub use credentials::{API_KEY_VARS, api_key_from_env, resolve_api_key};
pub use csv_io::{
    CsvOutput, DESCRIPTION_COLUMN, InputTable, MANUFACTURER_COLUMN, PART_NUMBER_COLUMN,
    default_output_path, evaluation_output_path, resolve_input_path, validate_input_path,
};
pub use error::{ConfigError, StoreError};
pub use persistence::{default_config_dir, default_config_path, ensure_parent_dir, load_json, save_json};
