//! `costline run` / `costline check` — pipeline driver.

use std::fs;
use std::path::{Path, PathBuf};

use costline_engine::config::{OutputFormat, PipelineConfig};
use costline_engine::report::{RunCounts, RunReport};
use costline_engine::{enrich, validate, EngineError};
use costline_io::IoError;
use tracing::{error, info};

use crate::exit_codes::{
    EXIT_DUPLICATE_KEY, EXIT_ERROR, EXIT_FINDINGS, EXIT_INVALID_CONFIG, EXIT_MALFORMED_INPUT,
    EXIT_SOURCE_NOT_FOUND, EXIT_WRITE_FAILED,
};
use crate::logging;
use crate::CliError;

pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub report: Option<PathBuf>,
    pub strict: bool,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    let _guard = logging::init(&config.logging)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot initialize logging: {e}")))?;

    match run_pipeline(&config, args.json, args.report.as_deref()) {
        Ok(()) => Ok(()),
        Err(err) => {
            // Failures land in the log and in the exit code.
            error!("pipeline failed: {}", err.message);
            Err(err)
        }
    }
}

pub fn cmd_check(path: &Path) -> Result<(), CliError> {
    let config = load_config(Some(path))?;
    eprintln!(
        "valid: pipeline '{}' — input {}, output {} ({})",
        config.name,
        config.input.dir.display(),
        config.output.path.display(),
        config.output.format,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Pipeline sequence
// ---------------------------------------------------------------------------

fn run_pipeline(
    config: &PipelineConfig,
    json: bool,
    report_path: Option<&Path>,
) -> Result<(), CliError> {
    info!("starting data ingestion");
    let (base, options) = costline_io::load_tables(&config.input).map_err(io_error)?;

    info!("starting data enrichment");
    let enriched = enrich(&base, &options, config.enrichment.on_duplicate).map_err(engine_error)?;

    info!("validating enriched data");
    let summary = validate(&enriched, &options);

    info!("saving enriched data to {}", config.output.path.display());
    if let Some(parent) = config.output.path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                CliError::new(
                    EXIT_WRITE_FAILED,
                    format!("cannot create {}: {e}", parent.display()),
                )
            })?;
        }
    }
    match config.output.format {
        OutputFormat::Parquet => {
            costline_io::parquet::write_enriched_parquet(&enriched, &config.output.path)
                .map_err(io_error)?;
        }
        OutputFormat::Csv => {
            costline_io::csv::write_enriched_csv(&enriched, &config.output.path)
                .map_err(io_error)?;
        }
    }

    let report = RunReport::new(
        config.name.clone(),
        RunCounts {
            base_rows: base.len(),
            option_rows: options.len(),
            enriched_rows: enriched.len(),
        },
        summary,
    );

    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    if let Some(path) = report_path {
        fs::write(path, &json_str).map_err(|e| {
            CliError::new(EXIT_WRITE_FAILED, format!("cannot write report: {e}"))
        })?;
        eprintln!("wrote {}", path.display());
    }
    if json {
        println!("{json_str}");
    }

    info!("pipeline completed successfully");

    let s = &report.summary;
    eprintln!(
        "{} rows enriched from {} base rows — findings: {} zero-cost, {} exact-match, {} average, {} fallback, {} profit, {} invalid",
        report.counts.enriched_rows,
        report.counts.base_rows,
        s.invalid_zero_costs,
        s.invalid_exact_matches,
        s.invalid_average_costs,
        s.invalid_fallback_costs,
        s.invalid_profits,
        s.invalid_production_costs,
    );

    if config.validation.fail_on_findings && s.has_findings() {
        return Err(CliError::new(
            EXIT_FINDINGS,
            "validation findings present (fail_on_findings)",
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Config loading + error mapping
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, CliError> {
    match path {
        None => Ok(PipelineConfig::default()),
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| {
                CliError::new(EXIT_INVALID_CONFIG, format!("cannot read config: {e}"))
            })?;
            PipelineConfig::from_toml(&text)
                .map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e.to_string()))
        }
    }
}

fn apply_overrides(config: &mut PipelineConfig, args: &RunArgs) {
    if let Some(ref dir) = args.data_dir {
        config.input.dir = dir.clone();
    }
    if let Some(ref path) = args.output {
        // An overriding .csv path switches the format with it.
        if path.extension().is_some_and(|ext| ext == "csv") {
            config.output.format = OutputFormat::Csv;
        }
        config.output.path = path.clone();
    }
    if args.strict {
        config.validation.fail_on_findings = true;
    }
}

fn io_error(err: IoError) -> CliError {
    let code = match &err {
        IoError::SourceNotFound(_) => EXIT_SOURCE_NOT_FOUND,
        IoError::Csv { .. } | IoError::MissingColumn { .. } | IoError::NumberParse { .. } => {
            EXIT_MALFORMED_INPUT
        }
        IoError::Read { .. } => EXIT_ERROR,
        IoError::Write { .. } => EXIT_WRITE_FAILED,
    };
    CliError::new(code, err.to_string())
}

fn engine_error(err: EngineError) -> CliError {
    let code = match &err {
        EngineError::DuplicateOptionKey { .. } => EXIT_DUPLICATE_KEY,
        EngineError::ConfigParse(_) | EngineError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
    };
    let cli_err = CliError::new(code, err.to_string());
    if code == EXIT_DUPLICATE_KEY {
        cli_err.with_hint("set [enrichment] on_duplicate = \"fanout\" to keep one row per match")
    } else {
        cli_err
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
