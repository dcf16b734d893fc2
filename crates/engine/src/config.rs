use std::path::PathBuf;

use serde::Deserialize;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Pipeline configuration. Every field defaults, so an empty TOML document
/// (or no config file at all) yields a runnable pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
            enrichment: EnrichmentConfig::default(),
            validation: ValidationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_name() -> String {
    "enrichment".into()
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Directory holding both source tables.
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_base_file")]
    pub base_file: String,
    #[serde(default = "default_options_file")]
    pub options_file: String,
    /// Field delimiter; sniffed from the file when absent.
    #[serde(default)]
    pub delimiter: Option<char>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            base_file: default_base_file(),
            options_file: default_options_file(),
            delimiter: None,
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_base_file() -> String {
    "base_data.csv".into()
}

fn default_options_file() -> String {
    "options_data.csv".into()
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: OutputFormat::Parquet,
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output/enriched_data.parquet")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Parquet,
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Parquet
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parquet => write!(f, "parquet"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

// ---------------------------------------------------------------------------
// Enrichment + Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
}

/// What to do when the options table holds duplicate (option code, model)
/// keys. `Error` rejects the catalog up front; `Fanout` keeps one enriched
/// row per matching catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    Error,
    Fanout,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        Self::Error
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationConfig {
    /// Exit non-zero when any validation rule count is non-zero.
    #[serde(default)]
    pub fail_on_findings: bool,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs/pipeline.log")
}

fn default_log_level() -> String {
    "info".into()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl PipelineConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: PipelineConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.input.base_file.is_empty() || self.input.options_file.is_empty() {
            return Err(EngineError::ConfigValidation(
                "input file names must not be empty".into(),
            ));
        }

        if let Some(delimiter) = self.input.delimiter {
            if !delimiter.is_ascii() {
                return Err(EngineError::ConfigValidation(format!(
                    "delimiter must be a single ASCII character, got '{delimiter}'"
                )));
            }
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(EngineError::ConfigValidation(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
