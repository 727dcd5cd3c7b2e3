//! Layered configuration.
//!
//! Settings resolve in one pass, highest precedence first:
//! environment variables, CLI flags, the JSON config file, defaults.
//! The result is a single immutable [`Settings`] value.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use groundsearch_core::MAX_REFERENCE_SOURCES;
use groundsearch_fetch::{GeminiConfig, GenerationOptions, RetryStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, StoreError};
use crate::persistence::{default_config_path, load_json, save_json};

// ============================================================================
// Log Level
// ============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    /// Everything.
    Trace,
    /// Debug output.
    Debug,
    /// Normal output.
    #[default]
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the `tracing` filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" | "critical" => Ok(Self::Error),
            other => Err(format!("unknown log level {other:?}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, <LogLevel as TryFrom<String>>::Error> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(value: LogLevel) -> Self {
        value.as_str().to_string()
    }
}

// ============================================================================
// Settings Sections
// ============================================================================

/// Search service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    /// Model name.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// Free-form search temperature.
    pub temperature: f64,
    /// Free-form search top-p.
    pub top_p: f64,
    /// Free-form search top-k.
    pub top_k: u32,
    /// Structured extraction temperature.
    pub structured_temperature: f64,
    /// Structured extraction top-p.
    pub structured_top_p: f64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: groundsearch_fetch::gemini::DEFAULT_MODEL.to_string(),
            base_url: groundsearch_fetch::gemini::DEFAULT_BASE_URL.to_string(),
            temperature: 0.1,
            top_p: 0.8,
            top_k: 40,
            structured_temperature: 0.2,
            structured_top_p: 0.9,
            timeout_secs: 120,
        }
    }
}

/// Row processing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Number of `source_url_N` output columns.
    pub max_sources: usize,
    /// Attempts per row, including the first.
    pub retry_attempts: u32,
    /// Delay before the first retry, in seconds.
    #[serde(alias = "retry_delay")]
    pub retry_delay_secs: f64,
    /// Backoff ceiling, in seconds.
    pub max_retry_delay_secs: f64,
    /// Stop after the first row.
    pub test_mode: bool,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            max_sources: 3,
            retry_attempts: 3,
            retry_delay_secs: 1.0,
            max_retry_delay_secs: 60.0,
            test_mode: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Verbosity.
    pub level: LogLevel,
    /// Write to the log file.
    pub file_enabled: bool,
    /// Write to stderr.
    pub console_enabled: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file_enabled: true,
            console_enabled: true,
        }
    }
}

/// File location settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Directory relative input names are looked up in.
    pub input_dir: PathBuf,
    /// Directory default-named outputs are written to.
    pub output_dir: PathBuf,
    /// CSV text encoding. Only UTF-8 is supported.
    pub encoding: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("."),
            encoding: "utf-8".to_string(),
        }
    }
}

// ============================================================================
// CLI Overrides
// ============================================================================

/// Settings given as command-line flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    /// `--log-level`.
    pub log_level: Option<LogLevel>,
    /// `--test`.
    pub test_mode: Option<bool>,
}

// ============================================================================
// Settings
// ============================================================================

/// Fully resolved application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Search service.
    pub gemini: GeminiSettings,
    /// Row processing.
    pub processing: ProcessingSettings,
    /// Logging.
    pub logging: LoggingSettings,
    /// File locations.
    pub data: DataSettings,
}

impl Settings {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Resolves settings from the process environment.
    ///
    /// An explicit `config_path` must exist; the default path is optional.
    pub fn load(config_path: Option<&Path>, cli: &CliOverrides) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => Some(Self::load_file(path)?),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Some(Self::load_file(&path)?)
                } else {
                    debug!(path = %path.display(), "Config file not found, using defaults");
                    None
                }
            }
        };

        resolve(file, cli, |key| std::env::var(key).ok())
    }

    /// Loads a config file. Missing keys take their defaults.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = load_json(path).map_err(|e| match e {
            StoreError::Serialization(source) => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            StoreError::Io(source) => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
            other => ConfigError::Write(other),
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(settings)
    }

    /// Saves settings as JSON.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        save_json(path, self)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks every setting is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gemini;
        if g.model.trim().is_empty() {
            return Err(ConfigError::invalid("gemini.model", &g.model, "must not be empty"));
        }
        if !(g.base_url.starts_with("http://") || g.base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "gemini.base_url",
                &g.base_url,
                "must be an http(s) URL",
            ));
        }
        check_range("gemini.temperature", g.temperature, 0.0, 2.0)?;
        check_range("gemini.structured_temperature", g.structured_temperature, 0.0, 2.0)?;
        check_range("gemini.top_p", g.top_p, 0.0, 1.0)?;
        check_range("gemini.structured_top_p", g.structured_top_p, 0.0, 1.0)?;
        if g.top_k == 0 {
            return Err(ConfigError::invalid("gemini.top_k", g.top_k, "must be at least 1"));
        }
        if g.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "gemini.timeout_secs",
                g.timeout_secs,
                "must be at least 1",
            ));
        }

        let p = &self.processing;
        if p.max_sources == 0 || p.max_sources > MAX_REFERENCE_SOURCES {
            return Err(ConfigError::invalid(
                "processing.max_sources",
                p.max_sources,
                format!("must be between 1 and {MAX_REFERENCE_SOURCES}"),
            ));
        }
        if p.retry_attempts == 0 {
            return Err(ConfigError::invalid(
                "processing.retry_attempts",
                p.retry_attempts,
                "must be at least 1",
            ));
        }
        check_range("processing.retry_delay_secs", p.retry_delay_secs, 0.0, 3600.0)?;
        check_range("processing.max_retry_delay_secs", p.max_retry_delay_secs, 0.0, 3600.0)?;

        let encoding = self.data.encoding.to_ascii_lowercase().replace('-', "");
        if encoding != "utf8" {
            return Err(ConfigError::invalid(
                "data.encoding",
                &self.data.encoding,
                "only utf-8 is supported",
            ));
        }

        Ok(())
    }

    /// Connection settings for the search client.
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            model: self.gemini.model.clone(),
            base_url: self.gemini.base_url.clone(),
            timeout: Duration::from_secs(self.gemini.timeout_secs),
        }
    }

    /// Sampling options for free-form search.
    pub fn search_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.gemini.temperature,
            top_p: self.gemini.top_p,
            top_k: Some(self.gemini.top_k),
        }
    }

    /// Sampling options for structured extraction.
    pub fn structured_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.gemini.structured_temperature,
            top_p: self.gemini.structured_top_p,
            top_k: None,
        }
    }

    /// Retry schedule for transient search failures.
    pub fn retry_strategy(&self) -> RetryStrategy {
        RetryStrategy::new(self.processing.retry_attempts)
            .with_base_delay(Duration::from_secs_f64(self.processing.retry_delay_secs))
            .with_max_delay(Duration::from_secs_f64(self.processing.max_retry_delay_secs))
    }
}

fn check_range(key: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            key,
            value,
            format!("must be between {min} and {max}"),
        ))
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Merges the layers into validated settings.
///
/// `env` looks up environment variables; blank values count as unset.
pub fn resolve<F>(file: Option<Settings>, cli: &CliOverrides, env: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = file.unwrap_or_default();

    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    if let Some(test_mode) = cli.test_mode {
        settings.processing.test_mode = test_mode;
    }

    apply_env(&mut settings, env)?;
    settings.validate()?;
    Ok(settings)
}

fn apply_env<F>(settings: &mut Settings, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(v) = lookup("GEMINI_MODEL") {
        settings.gemini.model = v;
    }
    if let Some(v) = lookup("GEMINI_BASE_URL") {
        settings.gemini.base_url = v;
    }
    if let Some(v) = lookup("GEMINI_TEMPERATURE") {
        settings.gemini.temperature = parse_env("GEMINI_TEMPERATURE", &v)?;
    }
    if let Some(v) = lookup("GEMINI_TOP_P") {
        settings.gemini.top_p = parse_env("GEMINI_TOP_P", &v)?;
    }
    if let Some(v) = lookup("GEMINI_TOP_K") {
        settings.gemini.top_k = parse_env("GEMINI_TOP_K", &v)?;
    }
    if let Some(v) = lookup("GEMINI_TIMEOUT_SECS") {
        settings.gemini.timeout_secs = parse_env("GEMINI_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("MAX_SOURCES") {
        settings.processing.max_sources = parse_env("MAX_SOURCES", &v)?;
    }
    if let Some(v) = lookup("RETRY_ATTEMPTS") {
        settings.processing.retry_attempts = parse_env("RETRY_ATTEMPTS", &v)?;
    }
    if let Some(v) = lookup("RETRY_DELAY") {
        settings.processing.retry_delay_secs = parse_env("RETRY_DELAY", &v)?;
    }
    if let Some(v) = lookup("TEST_MODE") {
        settings.processing.test_mode = parse_flag("TEST_MODE", &v)?;
    }
    if let Some(v) = lookup("LOG_LEVEL") {
        settings.logging.level = v
            .parse()
            .map_err(|reason: String| ConfigError::invalid("LOG_LEVEL", &v, reason))?;
    }
    if let Some(v) = lookup("INPUT_DIR") {
        settings.data.input_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup("OUTPUT_DIR") {
        settings.data.output_dir = PathBuf::from(v);
    }

    Ok(())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, value, e.to_string()))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected true/false")),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let settings = resolve(None, &CliOverrides::default(), no_env).unwrap();
        assert_eq!(settings.gemini.model, "gemini-2.5-pro");
        assert_eq!(settings.gemini.top_k, 40);
        assert_eq!(settings.processing.max_sources, 3);
        assert_eq!(settings.processing.retry_attempts, 3);
        assert!(!settings.processing.test_mode);
        assert_eq!(settings.logging.level, LogLevel::Info);
        assert_eq!(settings.data.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"gemini": {"model": "gemini-2.5-flash"}, "processing": {"retry_delay": 2.5},
                "logging": {"level": "DEBUG", "format": "ignored"}}"#,
        )
        .unwrap();

        let file = Settings::load_file(&path).unwrap();
        assert_eq!(file.gemini.model, "gemini-2.5-flash");
        assert_eq!(file.gemini.temperature, 0.1);
        assert_eq!(file.processing.retry_delay_secs, 2.5);
        assert_eq!(file.processing.retry_attempts, 3);
        assert_eq!(file.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_precedence_env_over_cli_over_file() {
        let mut file = Settings::default();
        file.logging.level = LogLevel::Error;
        file.processing.test_mode = false;
        file.gemini.model = "from-file".to_string();

        let cli = CliOverrides {
            log_level: Some(LogLevel::Warn),
            test_mode: Some(true),
        };

        let settings = resolve(Some(file.clone()), &cli, no_env).unwrap();
        assert_eq!(settings.logging.level, LogLevel::Warn);
        assert!(settings.processing.test_mode);
        assert_eq!(settings.gemini.model, "from-file");

        let env = env_of(&[("LOG_LEVEL", "debug"), ("TEST_MODE", "false"), ("GEMINI_MODEL", "from-env")]);
        let settings = resolve(Some(file), &cli, env).unwrap();
        assert_eq!(settings.logging.level, LogLevel::Debug);
        assert!(!settings.processing.test_mode);
        assert_eq!(settings.gemini.model, "from-env");
    }

    #[test]
    fn test_env_numbers_and_blank_values() {
        let env = env_of(&[
            ("MAX_SOURCES", "5"),
            ("RETRY_DELAY", "0.5"),
            ("GEMINI_TOP_K", " 20 "),
            ("OUTPUT_DIR", "   "),
        ]);
        let settings = resolve(None, &CliOverrides::default(), env).unwrap();
        assert_eq!(settings.processing.max_sources, 5);
        assert_eq!(settings.processing.retry_delay_secs, 0.5);
        assert_eq!(settings.gemini.top_k, 20);
        assert_eq!(settings.data.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_unparseable_env_value() {
        let err = resolve(None, &CliOverrides::default(), env_of(&[("MAX_SOURCES", "three")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MAX_SOURCES"));

        let err = resolve(None, &CliOverrides::default(), env_of(&[("TEST_MODE", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        for (key, value) in [
            ("MAX_SOURCES", "9"),
            ("MAX_SOURCES", "0"),
            ("RETRY_ATTEMPTS", "0"),
            ("GEMINI_TEMPERATURE", "3.5"),
            ("GEMINI_TOP_P", "-0.1"),
            ("RETRY_DELAY", "NaN"),
        ] {
            let result = resolve(None, &CliOverrides::default(), env_of(&[(key, value)]));
            assert!(result.is_err(), "{key}={value} should be rejected");
        }
    }

    #[test]
    fn test_unsupported_encoding_rejected() {
        let mut file = Settings::default();
        file.data.encoding = "latin-1".to_string();
        assert!(resolve(Some(file), &CliOverrides::default(), no_env).is_err());

        let mut file = Settings::default();
        file.data.encoding = "UTF8".to_string();
        assert!(resolve(Some(file), &CliOverrides::default(), no_env).is_ok());
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::load_file(&path), Err(ConfigError::Parse { .. })));

        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(Settings::load_file(&missing), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("init").join("config.json");

        Settings::default().save_to(&path).unwrap();
        let loaded = Settings::load_file(&path).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_derived_client_settings() {
        let mut settings = Settings::default();
        settings.processing.retry_delay_secs = 0.25;
        settings.processing.retry_attempts = 4;

        let retry = settings.retry_strategy();
        assert_eq!(retry.max_attempts, 4);
        assert_eq!(retry.delay_for_attempt(1), Duration::from_millis(250));
        assert_eq!(settings.structured_options().top_k, None);
        assert_eq!(settings.search_options().top_k, Some(40));
        assert_eq!(settings.gemini_config().timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("Critical".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(serde_json::to_string(&LogLevel::Debug).unwrap(), "\"debug\"");
    }
}
