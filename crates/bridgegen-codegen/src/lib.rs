//! Thunk generator for native-interop bindings
//!
//! Takes a [`DeclarationSet`] describing managed members whose bodies live in
//! native code and produces, per containing type, a Rust source unit with:
//!
//! - one lazily resolved function-pointer slot per member,
//! - one thunk per member that marshals arguments, calls the native entry
//!   point and unmarshals the result,
//! - the `#[repr(C)]` wrappers the slots' signatures refer to.
//!
//! Declarations that cannot be bound are reported as diagnostics and skipped;
//! see [`diagnostics`].

pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod emit;
pub mod error;
pub mod marshal;
pub mod validation;
pub mod wrappers;
pub mod writer;

use bridgegen_core::DeclarationSet;

pub use config::{Abi, GeneratorConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLocation, Diagnostics};
pub use driver::{BindingGenerator, EmittedMember, GeneratedUnit, GenerationOutput};
pub use error::{CodegenError, ConfigError};
pub use marshal::MarshalStrategy;

/// Common trait for binding generators
pub trait Codegen {
    fn generate(&mut self, set: &DeclarationSet) -> Result<GenerationOutput, CodegenError>;
}
