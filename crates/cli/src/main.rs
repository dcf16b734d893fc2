// costline CLI - batch vehicle-sales enrichment pipeline

mod exit_codes;
mod logging;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "costline")]
#[command(about = "Batch vehicle-sales enrichment pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline: ingest, enrich, validate, persist
    #[command(after_help = "\
Examples:
  costline run
  costline run pipeline.toml
  costline run pipeline.toml --json
  costline run --data-dir data/ --output out/enriched.csv
  costline run pipeline.toml --strict --report report.json")]
    Run {
        /// Path to the pipeline TOML config; defaults apply when omitted
        config: Option<PathBuf>,

        /// Override the input directory
        #[arg(long, env = "COSTLINE_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Override the output path (a .csv extension switches the format)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the run report as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the run report as JSON to a file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Exit non-zero when validation reports any rule violation
        #[arg(long)]
        strict: bool,
    },

    /// Parse and validate a pipeline config without running
    #[command(after_help = "\
Examples:
  costline check pipeline.toml")]
    Check {
        /// Path to the pipeline TOML config
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            data_dir,
            output,
            json,
            report,
            strict,
        } => run::cmd_run(run::RunArgs {
            config,
            data_dir,
            output,
            json,
            report,
            strict,
        }),
        Commands::Check { config } => run::cmd_check(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}

/// CLI-level error: exit code plus message, with an optional hint.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
