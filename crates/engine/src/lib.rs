//! `costline-engine` — batch enrichment and validation core.
//!
//! Pure engine crate: receives pre-loaded records, returns enriched rows
//! and a validation summary. No CLI or IO dependencies.

pub mod config;
pub mod enrich;
pub mod error;
pub mod model;
pub mod report;
pub mod validate;

pub use config::PipelineConfig;
pub use enrich::enrich;
pub use error::EngineError;
pub use model::{BaseRecord, EnrichedRecord, OptionRecord};
pub use report::RunReport;
pub use validate::{validate, ValidationSummary};
