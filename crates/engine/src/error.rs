use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad log level, bad delimiter, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Duplicate (option code, model) key under the fail-fast policy.
    #[error("duplicate option key ({option_code}, {model}): {count} catalog rows")]
    DuplicateOptionKey {
        option_code: String,
        model: String,
        count: usize,
    },
}
