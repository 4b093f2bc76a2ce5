//! Declaration model, type shapes and native symbol naming for bridgegen

pub mod decl;
pub mod error;
pub mod naming;
pub mod symbols;
pub mod types;

pub use decl::{
    Container, Declaration, DeclarationSet, MemberKind, Parameter, PassMode, SourceLocation,
    Visibility,
};
pub use error::CoreError;
pub use symbols::MemberSymbols;
pub use types::{NumericKind, PrimitiveType, TypeRef, TypeShape, Width};
