//! Type references as supplied by the front end, and the closed shape set
//! that marshaling decisions are made on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in scalar types that can cross the boundary by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Char,
}

impl PrimitiveType {
    pub fn rust_name(self) -> &'static str {
        match self {
            PrimitiveType::I8 => "i8",
            PrimitiveType::I16 => "i16",
            PrimitiveType::I32 => "i32",
            PrimitiveType::I64 => "i64",
            PrimitiveType::Isize => "isize",
            PrimitiveType::U8 => "u8",
            PrimitiveType::U16 => "u16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::Usize => "usize",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
            PrimitiveType::Char => "char",
        }
    }

    pub fn width(self) -> Width {
        match self {
            PrimitiveType::I8 | PrimitiveType::U8 => Width::Bits8,
            PrimitiveType::I16 | PrimitiveType::U16 => Width::Bits16,
            PrimitiveType::I32 | PrimitiveType::U32 | PrimitiveType::F32 | PrimitiveType::Char => {
                Width::Bits32
            }
            PrimitiveType::I64 | PrimitiveType::U64 | PrimitiveType::F64 => Width::Bits64,
            PrimitiveType::Isize | PrimitiveType::Usize => Width::Pointer,
        }
    }

    pub fn numeric_kind(self) -> NumericKind {
        match self {
            PrimitiveType::I8
            | PrimitiveType::I16
            | PrimitiveType::I32
            | PrimitiveType::I64
            | PrimitiveType::Isize => NumericKind::Signed,
            PrimitiveType::U8
            | PrimitiveType::U16
            | PrimitiveType::U32
            | PrimitiveType::U64
            | PrimitiveType::Usize => NumericKind::Unsigned,
            PrimitiveType::F32 | PrimitiveType::F64 => NumericKind::Float,
            PrimitiveType::Char => NumericKind::Char,
        }
    }
}

/// A type as it appears in a declaration.
///
/// Paths are Rust paths resolvable from the module that includes the
/// generated unit (the unit glob-imports `super::*`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// No value; only meaningful as a return type.
    Unit,
    Primitive { name: PrimitiveType },
    Bool,
    /// `&str` when borrowed, `String` when owned. Always `String` when returned.
    Str {
        #[serde(default)]
        owned: bool,
    },
    /// Field-less enum with an explicit `#[repr]`.
    Enum { path: String, repr: PrimitiveType },
    Pointer {
        pointee: String,
        #[serde(default)]
        mutable: bool,
    },
    FnPointer { path: String },
    /// A managed object whose payload is a native pointer.
    NativeObject {
        path: String,
        #[serde(default)]
        nullable: bool,
    },
    /// Any other by-value type, passed through unchanged.
    Named { path: String },
}

impl TypeRef {
    pub fn primitive(name: PrimitiveType) -> Self {
        TypeRef::Primitive { name }
    }

    pub fn named(path: impl Into<String>) -> Self {
        TypeRef::Named { path: path.into() }
    }

    pub fn native_object(path: impl Into<String>, nullable: bool) -> Self {
        TypeRef::NativeObject {
            path: path.into(),
            nullable,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, TypeRef::Unit)
    }

    /// The Rust spelling of the bare type, without any reference for pass mode.
    pub fn rust_name(&self) -> String {
        match self {
            TypeRef::Unit => "()".to_string(),
            TypeRef::Primitive { name } => name.rust_name().to_string(),
            TypeRef::Bool => "bool".to_string(),
            TypeRef::Str { owned: true } => "String".to_string(),
            TypeRef::Str { owned: false } => "&str".to_string(),
            TypeRef::Enum { path, .. } => path.clone(),
            TypeRef::Pointer { pointee, mutable } => {
                if *mutable {
                    format!("*mut {}", pointee)
                } else {
                    format!("*const {}", pointee)
                }
            }
            TypeRef::FnPointer { path } => path.clone(),
            TypeRef::NativeObject { path, .. } => path.clone(),
            TypeRef::Named { path } => path.clone(),
        }
    }

    /// Every path the front end supplied for this type, for syntax validation.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            TypeRef::Enum { path, .. }
            | TypeRef::FnPointer { path }
            | TypeRef::NativeObject { path, .. }
            | TypeRef::Named { path } => vec![path.as_str()],
            TypeRef::Pointer { pointee, .. } => vec![pointee.as_str()],
            TypeRef::Unit | TypeRef::Primitive { .. } | TypeRef::Bool | TypeRef::Str { .. } => {
                Vec::new()
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Str { .. } => write!(f, "str"),
            TypeRef::NativeObject { path, nullable: true } => write!(f, "Option<&{}>", path),
            other => write!(f, "{}", other.rust_name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Bits8,
    Bits16,
    Bits32,
    Bits64,
    /// Target pointer width.
    Pointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Signed,
    Unsigned,
    Float,
    Char,
    /// Raw data or code addresses.
    Address,
}

/// Normalized shape of a type, the only input marshal selection looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Primitive { width: Width, kind: NumericKind },
    Boolean,
    StringHandle,
    NativeHandleObject { nullable: bool },
    Other,
}

impl TypeShape {
    /// Classify a type reference. Stateless; recomputed on demand.
    pub fn of(ty: &TypeRef) -> TypeShape {
        match ty {
            TypeRef::Primitive { name } | TypeRef::Enum { repr: name, .. } => TypeShape::Primitive {
                width: name.width(),
                kind: name.numeric_kind(),
            },
            TypeRef::Pointer { .. } | TypeRef::FnPointer { .. } => TypeShape::Primitive {
                width: Width::Pointer,
                kind: NumericKind::Address,
            },
            TypeRef::Bool => TypeShape::Boolean,
            TypeRef::Str { .. } => TypeShape::StringHandle,
            TypeRef::NativeObject { nullable, .. } => TypeShape::NativeHandleObject {
                nullable: *nullable,
            },
            TypeRef::Unit | TypeRef::Named { .. } => TypeShape::Other,
        }
    }

    pub fn is_scalar(self) -> bool {
        matches!(self, TypeShape::Primitive { .. })
    }
}
