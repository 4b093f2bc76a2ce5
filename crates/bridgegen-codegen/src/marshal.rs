//! Marshal strategies
//!
//! A strategy is selected from a type's [`TypeShape`] alone and decides,
//! for one parameter or return value:
//!
//! - whether the pass mode / position combination is legal,
//! - the native type the function pointer is declared with,
//! - the statements emitted before the native call (and the argument
//!   expression handed to it),
//! - the statements emitted after the call, in reverse parameter order,
//! - how the raw return value is turned back into the managed type.
//!
//! Strategies are stateless; all context arrives through [`Marshaler`].

use std::fmt;

use bridgegen_core::naming::ident_stem;
use bridgegen_core::{PassMode, TypeRef, TypeShape};

use crate::writer::CodeWriter;

/// Native spelling of every pointer-sized opaque value.
pub const OPAQUE_PTR: &str = "*mut ::core::ffi::c_void";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarshalStrategy {
    /// Blittable values passed through unchanged.
    Default,
    /// `bool` as a 4-byte integer.
    Boolean,
    /// Strings as owned, length-prefixed native blocks.
    StringHandle,
    /// Managed objects passed as their native pointer.
    NativeHandleObject { nullable: bool },
}

impl MarshalStrategy {
    pub fn select(shape: TypeShape) -> Self {
        match shape {
            TypeShape::Boolean => MarshalStrategy::Boolean,
            TypeShape::StringHandle => MarshalStrategy::StringHandle,
            TypeShape::NativeHandleObject { nullable } => {
                MarshalStrategy::NativeHandleObject { nullable }
            }
            TypeShape::Primitive { .. } | TypeShape::Other => MarshalStrategy::Default,
        }
    }

    pub fn for_type(ty: &TypeRef) -> Self {
        Self::select(TypeShape::of(ty))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Parameter,
    Return,
}

/// Why an occurrence cannot be marshaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    CannotPassByRef,
    CannotBeReturned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    pub rendered: String,
    /// Scalars are eligible for a parameter wrapper.
    pub scalar: bool,
}

impl NativeType {
    fn scalar(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
            scalar: true,
        }
    }

    fn aggregate(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
            scalar: false,
        }
    }
}

/// One occurrence of a type in a member signature, with its strategy.
#[derive(Debug, Clone, Copy)]
pub struct Marshaler<'a> {
    pub strategy: MarshalStrategy,
    pub ty: &'a TypeRef,
    pub mode: PassMode,
}

impl<'a> Marshaler<'a> {
    pub fn new(ty: &'a TypeRef, mode: PassMode) -> Self {
        Self {
            strategy: MarshalStrategy::for_type(ty),
            ty,
            mode,
        }
    }

    /// Return values are always marshaled by value.
    pub fn for_return(ty: &'a TypeRef) -> Self {
        Self::new(ty, PassMode::Value)
    }

    pub fn is_allowed(&self, position: Position) -> Result<(), Violation> {
        match (self.strategy, position) {
            (MarshalStrategy::Default, _) => Ok(()),
            (MarshalStrategy::Boolean, Position::Parameter) => Ok(()),
            (MarshalStrategy::Boolean, Position::Return) => {
                debug_assert!(!self.mode.is_by_ref(), "returns are marshaled by value");
                Ok(())
            }
            (MarshalStrategy::StringHandle, _) if self.mode.is_by_ref() => {
                Err(Violation::CannotPassByRef)
            }
            (MarshalStrategy::StringHandle, _) => Ok(()),
            (MarshalStrategy::NativeHandleObject { .. }, Position::Return) => {
                Err(Violation::CannotBeReturned)
            }
            (MarshalStrategy::NativeHandleObject { .. }, Position::Parameter)
                if self.mode.is_by_ref() =>
            {
                Err(Violation::CannotPassByRef)
            }
            (MarshalStrategy::NativeHandleObject { .. }, Position::Parameter) => Ok(()),
        }
    }

    /// Type of this occurrence in the function pointer signature.
    pub fn native_type(&self) -> NativeType {
        match self.strategy {
            MarshalStrategy::Default => {
                let bare = self.ty.rust_name();
                match self.mode {
                    PassMode::Value => {
                        if TypeShape::of(self.ty).is_scalar() {
                            NativeType::scalar(bare)
                        } else {
                            NativeType::aggregate(bare)
                        }
                    }
                    PassMode::Ref | PassMode::Out => NativeType::scalar(format!("*mut {}", bare)),
                    PassMode::In => NativeType::scalar(format!("*const {}", bare)),
                }
            }
            MarshalStrategy::Boolean => match self.mode {
                PassMode::Value => NativeType::scalar("i32"),
                PassMode::Ref | PassMode::Out => NativeType::scalar("*mut i32"),
                PassMode::In => NativeType::scalar("*const i32"),
            },
            MarshalStrategy::StringHandle | MarshalStrategy::NativeHandleObject { .. } => {
                NativeType::scalar(OPAQUE_PTR)
            }
        }
    }

    /// Type of this occurrence in the generated Rust signature.
    pub fn managed_type(&self) -> String {
        let bare = match self.ty {
            TypeRef::NativeObject {
                path,
                nullable: false,
            } => format!("&{}", path),
            TypeRef::NativeObject {
                path,
                nullable: true,
            } => format!("::core::option::Option<&{}>", path),
            other => other.rust_name(),
        };
        match self.mode {
            PassMode::Value => bare,
            PassMode::Ref | PassMode::Out => format!("&mut {}", bare),
            PassMode::In => format!("&{}", bare),
        }
    }

    /// Managed return type. Strings always come back owned.
    pub fn managed_return_type(&self) -> String {
        match self.ty {
            TypeRef::Str { .. } => "::std::string::String".to_string(),
            other => other.rust_name(),
        }
    }

    /// Whether [`begin_argument`](Self::begin_argument) opens a block that
    /// [`end_argument`](Self::end_argument) closes.
    pub fn opens_scope(&self) -> bool {
        match self.strategy {
            MarshalStrategy::Default => self.mode.is_by_ref(),
            MarshalStrategy::StringHandle => true,
            MarshalStrategy::Boolean | MarshalStrategy::NativeHandleObject { .. } => false,
        }
    }

    /// Emit the pre-call statements for parameter `name`; returns the
    /// expression passed to the native function.
    pub fn begin_argument(
        &self,
        w: &mut CodeWriter,
        name: &str,
        runtime: &str,
    ) -> Result<String, fmt::Error> {
        let stem = ident_stem(name);
        match self.strategy {
            MarshalStrategy::Default => match self.mode {
                PassMode::Value => Ok(name.to_string()),
                PassMode::Ref | PassMode::Out => {
                    let local = format!("__{}_ptr", stem);
                    w.open(format_args!("{{"))?;
                    w.line(format_args!(
                        "let {}: *mut {} = ::core::ptr::addr_of_mut!(*{});",
                        local,
                        self.ty.rust_name(),
                        name
                    ))?;
                    Ok(local)
                }
                PassMode::In => {
                    let local = format!("__{}_ptr", stem);
                    w.open(format_args!("{{"))?;
                    w.line(format_args!(
                        "let {}: *const {} = ::core::ptr::addr_of!(*{});",
                        local,
                        self.ty.rust_name(),
                        name
                    ))?;
                    Ok(local)
                }
            },
            MarshalStrategy::Boolean => {
                let local = format!("__{}_native", stem);
                match self.mode {
                    PassMode::Value => {
                        w.line(format_args!(
                            "let {}: i32 = {}::bool_to_native({});",
                            local, runtime, name
                        ))?;
                        Ok(local)
                    }
                    PassMode::Ref => {
                        w.line(format_args!(
                            "let mut {}: i32 = {}::bool_to_native(*{});",
                            local, runtime, name
                        ))?;
                        Ok(format!("::core::ptr::addr_of_mut!({})", local))
                    }
                    PassMode::Out => {
                        w.line(format_args!("let mut {}: i32 = 0;", local))?;
                        Ok(format!("::core::ptr::addr_of_mut!({})", local))
                    }
                    PassMode::In => {
                        w.line(format_args!(
                            "let {}: i32 = {}::bool_to_native(*{});",
                            local, runtime, name
                        ))?;
                        Ok(format!("::core::ptr::addr_of!({})", local))
                    }
                }
            }
            MarshalStrategy::StringHandle => {
                let local = format!("__{}_native", stem);
                let text = match self.ty {
                    TypeRef::Str { owned: true } => format!("{}.as_str()", name),
                    _ => name.to_string(),
                };
                w.open(format_args!("{{"))?;
                w.line(format_args!(
                    "let {} = {}::NativeString::new({});",
                    local, runtime, text
                ))?;
                Ok(format!("{}.as_ptr()", local))
            }
            MarshalStrategy::NativeHandleObject { nullable } => {
                let local = format!("__{}_handle", stem);
                if nullable {
                    w.line(format_args!(
                        "let {} = {}::nullable_handle_ptr({});",
                        local, runtime, name
                    ))?;
                } else {
                    w.line(format_args!(
                        "let {} = {}::handle_ptr({}, \"{}\");",
                        local, runtime, name, stem
                    ))?;
                }
                Ok(local)
            }
        }
    }

    /// Emit the post-call statements for parameter `name`.
    pub fn end_argument(&self, w: &mut CodeWriter, name: &str, runtime: &str) -> fmt::Result {
        let stem = ident_stem(name);
        match self.strategy {
            MarshalStrategy::Boolean if matches!(self.mode, PassMode::Ref | PassMode::Out) => {
                w.line(format_args!(
                    "*{} = {}::bool_from_native(__{}_native);",
                    name, runtime, stem
                ))
            }
            _ if self.opens_scope() => w.close(),
            _ => Ok(()),
        }
    }

    /// Expression converting the raw native result `value` to the managed type.
    pub fn unmarshal_return(&self, value: &str, runtime: &str) -> String {
        match self.strategy {
            MarshalStrategy::Boolean => format!("{}::bool_from_native({})", runtime, value),
            MarshalStrategy::StringHandle => {
                format!("unsafe {{ {}::NativeString::take({}) }}", runtime, value)
            }
            // Native objects never reach here; `is_allowed` rejects them as returns.
            MarshalStrategy::Default | MarshalStrategy::NativeHandleObject { .. } => {
                value.to_string()
            }
        }
    }
}
