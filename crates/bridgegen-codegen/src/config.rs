//! Generator configuration
//!
//! Loaded from a TOML file. Every field has a default, so an empty file (or
//! no file at all) is valid:
//!
//! ```toml
//! runtime_crate = "::bridgegen_runtime"
//! abi = "c"
//! receiver_name = "__this"
//! wrap_scalars = true
//! emit_header = true
//! ```

use std::path::Path;

use bridgegen_core::symbols::DEFAULT_THIS_NAME;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Calling convention of the native entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Abi {
    #[default]
    C,
    System,
}

impl Abi {
    /// The string inside `extern "..."`.
    pub fn as_str(self) -> &'static str {
        match self {
            Abi::C => "C",
            Abi::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Path the generated code uses to reach the run-time support crate.
    pub runtime_crate: String,
    pub abi: Abi,
    /// Receiver argument name for members without an override.
    pub receiver_name: String,
    /// Pass scalar arguments through `#[repr(C)]` wrapper structs.
    pub wrap_scalars: bool,
    /// Start each unit with a "generated, do not edit" comment block.
    pub emit_header: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime_crate: "::bridgegen_runtime".to_string(),
            abi: Abi::C,
            receiver_name: DEFAULT_THIS_NAME.to_string(),
            wrap_scalars: true,
            emit_header: true,
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!("Loading generator config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if syn::parse_str::<syn::Path>(&self.runtime_crate).is_err() {
            return Err(ConfigError::Invalid {
                field: "runtime_crate",
                reason: format!("'{}' is not a Rust path", self.runtime_crate),
            });
        }
        if syn::parse_str::<syn::Ident>(&self.receiver_name).is_err() {
            return Err(ConfigError::Invalid {
                field: "receiver_name",
                reason: format!("'{}' is not a Rust identifier", self.receiver_name),
            });
        }
        Ok(())
    }
}
