//! Native names and entry-point symbols for declared members
//!
//! The entry-point format is part of the contract with the native side and
//! must stay bit-exact:
//!
//! - methods: `{NativeTypeName}_{NativeMemberName}`
//! - property getters: `{NativeTypeName}_Get{NativeMemberName}`
//! - property setters: `{NativeTypeName}_Set{NativeMemberName}`

use crate::decl::{Container, Declaration, MemberKind};
use crate::naming::{to_rust_ident, to_snake_case};

/// Receiver argument name used when a declaration does not override it.
pub const DEFAULT_THIS_NAME: &str = "__this";

pub fn native_type_name(container: &Container) -> &str {
    container.native_name.as_deref().unwrap_or(&container.name)
}

pub fn native_member_name(decl: &Declaration) -> &str {
    decl.native_name.as_deref().unwrap_or(&decl.name)
}

pub fn entry_point(decl: &Declaration) -> String {
    let type_name = native_type_name(&decl.container);
    let member_name = native_member_name(decl);
    match decl.kind {
        MemberKind::Method => format!("{}_{}", type_name, member_name),
        MemberKind::PropertyGetter => format!("{}_Get{}", type_name, member_name),
        MemberKind::PropertySetter => format!("{}_Set{}", type_name, member_name),
    }
}

/// Name of the static that caches the resolved address.
pub fn slot_name(entry_point: &str) -> String {
    format!("__{}_FunctionPointer", entry_point)
}

/// Receiver argument name: the declaration's override, else `default`.
pub fn this_name<'a>(decl: &'a Declaration, default: &'a str) -> &'a str {
    decl.this_name.as_deref().unwrap_or(default)
}

/// Name of the generated Rust function.
pub fn rust_fn_name(decl: &Declaration) -> String {
    let snake = to_snake_case(&decl.name);
    match decl.kind {
        MemberKind::PropertySetter => format!("set_{}", snake),
        MemberKind::Method | MemberKind::PropertyGetter => to_rust_ident(&snake),
    }
}

/// Everything computed for one member, in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSymbols {
    pub entry_point: String,
    pub slot: String,
    pub fn_name: String,
    /// `None` for static members.
    pub this_name: Option<String>,
}

impl MemberSymbols {
    pub fn compute(decl: &Declaration, default_this_name: &str) -> Self {
        let entry_point = entry_point(decl);
        let slot = slot_name(&entry_point);
        Self {
            fn_name: rust_fn_name(decl),
            this_name: (!decl.is_static).then(|| this_name(decl, default_this_name).to_string()),
            entry_point,
            slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrimitiveType, TypeRef};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_static_method_with_native_type_override() {
        let container = Container::new("engine::graphics::GfxTexture").with_native_name("Texture");
        let decl = Declaration::method(container, "Width")
            .with_static(true)
            .with_return(TypeRef::primitive(PrimitiveType::I32));

        assert_eq!(entry_point(&decl), "Texture_Width");
        assert_eq!(rust_fn_name(&decl), "width");
    }

    #[test]
    fn test_property_accessors() {
        let camera = Container::new("Camera");
        let getter = Declaration::getter(camera.clone(), "Enabled", TypeRef::Bool);
        let setter = Declaration::setter(camera, "Enabled", TypeRef::Bool);

        assert_eq!(entry_point(&getter), "Camera_GetEnabled");
        assert_eq!(entry_point(&setter), "Camera_SetEnabled");
        assert_eq!(rust_fn_name(&getter), "enabled");
        assert_eq!(rust_fn_name(&setter), "set_enabled");
    }

    #[test]
    fn test_member_native_name_override() {
        let decl = Declaration::getter(Container::new("Camera"), "Msaa", TypeRef::Bool)
            .with_native_name("EnableMSAA");
        assert_eq!(entry_point(&decl), "Camera_GetEnableMSAA");
    }

    #[test]
    fn test_member_symbols() {
        let decl = Declaration::method(Container::new("Transform"), "Translate");
        let symbols = MemberSymbols::compute(&decl, DEFAULT_THIS_NAME);
        assert_eq!(symbols.entry_point, "Transform_Translate");
        assert_eq!(symbols.slot, "__Transform_Translate_FunctionPointer");
        assert_eq!(symbols.fn_name, "translate");
        assert_eq!(symbols.this_name.as_deref(), Some("__this"));

        let overridden = decl.clone().with_this_name("transform");
        let symbols = MemberSymbols::compute(&overridden, DEFAULT_THIS_NAME);
        assert_eq!(symbols.this_name.as_deref(), Some("transform"));

        let symbols = MemberSymbols::compute(&decl.with_static(true), DEFAULT_THIS_NAME);
        assert_eq!(symbols.this_name, None);
    }

    #[test]
    fn test_reserved_member_name() {
        let decl = Declaration::method(Container::new("Shader"), "Type");
        assert_eq!(rust_fn_name(&decl), "r#type");
        assert_eq!(entry_point(&decl), "Shader_Type");
    }
}
