//! Error types for thunk generation
//!
//! Problems with the declarations themselves are never errors here: they are
//! collected as [`Diagnostics`](crate::diagnostics::Diagnostics) and the
//! offending member or type is skipped. `CodegenError` covers failures of
//! the generator itself.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Generation reported {count} diagnostic(s):\n{summary}")]
    Diagnostics { count: usize, summary: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}
