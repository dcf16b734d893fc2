//! `costline-io` — file I/O for the enrichment pipeline.
//!
//! CSV ingestion with delimiter sniffing and a Windows-1252 fallback,
//! parquet and CSV export of the enriched table.

pub mod csv;
pub mod error;
pub mod ingest;
pub mod parquet;

pub use error::IoError;
pub use ingest::load_tables;
