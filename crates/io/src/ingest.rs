// Input discovery and loading.

use costline_engine::config::InputConfig;
use costline_engine::model::{BaseRecord, OptionRecord};
use tracing::info;

use crate::csv::{read_base_records, read_option_records};
use crate::error::IoError;

/// Locate and load both source tables from the input directory. Either
/// file missing aborts the run, naming the offending path; the base table
/// is checked first.
pub fn load_tables(input: &InputConfig) -> Result<(Vec<BaseRecord>, Vec<OptionRecord>), IoError> {
    let base_path = input.dir.join(&input.base_file);
    let options_path = input.dir.join(&input.options_file);

    if !base_path.exists() {
        return Err(IoError::SourceNotFound(base_path));
    }
    if !options_path.exists() {
        return Err(IoError::SourceNotFound(options_path));
    }

    info!("loading base dataset from {}", base_path.display());
    let base = read_base_records(&base_path, input.delimiter)?;

    info!("loading options dataset from {}", options_path.display());
    let options = read_option_records(&options_path, input.delimiter)?;

    info!(
        base_rows = base.len(),
        option_rows = options.len(),
        "data ingestion complete"
    );
    Ok((base, options))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
