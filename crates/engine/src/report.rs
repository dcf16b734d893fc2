use serde::Serialize;

use crate::validate::ValidationSummary;

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Machine-readable record of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub meta: RunMeta,
    pub counts: RunCounts,
    pub summary: ValidationSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub pipeline: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunCounts {
    pub base_rows: usize,
    pub option_rows: usize,
    pub enriched_rows: usize,
}

impl RunReport {
    pub fn new(
        pipeline: impl Into<String>,
        counts: RunCounts,
        summary: ValidationSummary,
    ) -> Self {
        Self {
            meta: RunMeta {
                pipeline: pipeline.into(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            counts,
            summary,
        }
    }
}
