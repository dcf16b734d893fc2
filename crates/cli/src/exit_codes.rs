//! CLI exit code registry.
//!
//! Single source of truth for the shell contract — schedulers and wrapper
//! scripts rely on these values. Clap emits 2 for usage errors on its own.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success (data-quality findings included)             |
//! | 1    | General error                                        |
//! | 2    | CLI usage error (bad args)                           |
//! | 3    | Required source file not found                       |
//! | 4    | Malformed input (missing column, unparseable number) |
//! | 5    | Duplicate option key (join hazard, fail-fast policy) |
//! | 6    | Output write failure                                 |
//! | 7    | Validation findings under strict mode                |
//! | 8    | Invalid pipeline config                              |

/// General error - unspecified failure.
/// Avoid using this; prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Required input file missing.
pub const EXIT_SOURCE_NOT_FOUND: u8 = 3;

/// Malformed input data (missing column, unparseable number, bad CSV).
pub const EXIT_MALFORMED_INPUT: u8 = 4;

/// Duplicate (option code, model) key with `on_duplicate = "error"`.
pub const EXIT_DUPLICATE_KEY: u8 = 5;

/// Cannot write the enriched output or the report.
pub const EXIT_WRITE_FAILED: u8 = 6;

/// Validation rule counts non-zero under `--strict`/`fail_on_findings`.
pub const EXIT_FINDINGS: u8 = 7;

/// Pipeline config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 8;
