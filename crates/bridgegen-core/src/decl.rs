//! Member declarations awaiting generated native thunks
//!
//! The front end that discovers annotated members is external; it hands
//! over a flat [`DeclarationSet`] that is immutable for the rest of the
//! build.

use crate::error::CoreError;
use crate::types::TypeRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Flat collection of declarations for one build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclarationSet {
    pub declarations: Vec<Declaration>,
}

impl DeclarationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)?;
        let set = Self::from_json(&text)?;
        tracing::debug!(
            "Loaded {} declarations from {}",
            set.declarations.len(),
            path.display()
        );
        Ok(set)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn push(&mut self, declaration: Declaration) {
        self.declarations.push(declaration);
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// The type that owns a declared member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Full path; the identity members are grouped by.
    pub path: String,
    /// Simple name, used for the `impl` block and the output file.
    pub name: String,
    /// Overrides `name` when computing entry points.
    #[serde(default)]
    pub native_name: Option<String>,
    #[serde(default)]
    pub generic: bool,
    /// Declared inside another type rather than at module level.
    #[serde(default)]
    pub nested: bool,
    /// Marked by the front end as accepting generated members.
    #[serde(default = "default_true")]
    pub generated: bool,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl Container {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit("::").next().unwrap_or(&path).to_string();
        Self {
            path,
            name,
            native_name: None,
            generic: false,
            nested: false,
            generated: true,
            location: None,
        }
    }

    pub fn with_native_name(mut self, name: impl Into<String>) -> Self {
        self.native_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Method,
    PropertyGetter,
    PropertySetter,
}

impl MemberKind {
    pub fn is_accessor(self) -> bool {
        !matches!(self, MemberKind::Method)
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Method => write!(f, "method"),
            MemberKind::PropertyGetter => write!(f, "property getter"),
            MemberKind::PropertySetter => write!(f, "property setter"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Crate,
    /// Visible to the parent of the container's module.
    Super,
    #[default]
    Private,
}

impl Visibility {
    /// Ordering from most to least restrictive; used to clamp accessors.
    fn rank(self) -> u8 {
        match self {
            Visibility::Private => 0,
            Visibility::Super => 1,
            Visibility::Crate => 2,
            Visibility::Public => 3,
        }
    }

    pub fn narrowest(self, other: Visibility) -> Visibility {
        if other.rank() < self.rank() {
            other
        } else {
            self
        }
    }
}

/// How a parameter crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassMode {
    #[default]
    Value,
    Ref,
    In,
    Out,
}

impl PassMode {
    pub fn is_by_ref(self) -> bool {
        !matches!(self, PassMode::Value)
    }
}

impl fmt::Display for PassMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassMode::Value => write!(f, "value"),
            PassMode::Ref => write!(f, "ref"),
            PassMode::In => write!(f, "in"),
            PassMode::Out => write!(f, "out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub mode: PassMode,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            mode: PassMode::Value,
        }
    }

    pub fn with_mode(mut self, mode: PassMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// One member description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub container: Container,
    pub name: String,
    pub kind: MemberKind,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    #[serde(default)]
    pub visibility: Visibility,
    /// Property accessors only; clamped to `visibility`.
    #[serde(default)]
    pub accessor_visibility: Option<Visibility>,
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(default = "unit")]
    pub ret: TypeRef,
    /// Overrides `name` when computing the entry point.
    #[serde(default)]
    pub native_name: Option<String>,
    /// Overrides the receiver argument name of instance members.
    #[serde(default)]
    pub this_name: Option<String>,
    #[serde(default)]
    pub generic: bool,
    /// Marked by the front end as requiring a generated body.
    #[serde(default = "default_true")]
    pub generated: bool,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl Declaration {
    pub fn method(container: Container, name: impl Into<String>) -> Self {
        Self::member(container, name, MemberKind::Method)
    }

    pub fn getter(container: Container, name: impl Into<String>, ty: TypeRef) -> Self {
        let mut decl = Self::member(container, name, MemberKind::PropertyGetter);
        decl.ret = ty;
        decl
    }

    pub fn setter(container: Container, name: impl Into<String>, ty: TypeRef) -> Self {
        let mut decl = Self::member(container, name, MemberKind::PropertySetter);
        decl.params.push(Parameter::new("value", ty));
        decl
    }

    fn member(container: Container, name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            container,
            name: name.into(),
            kind,
            is_static: false,
            visibility: Visibility::Public,
            accessor_visibility: None,
            params: Vec::new(),
            ret: TypeRef::Unit,
            native_name: None,
            this_name: None,
            generic: false,
            generated: true,
            location: None,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_return(mut self, ty: TypeRef) -> Self {
        self.ret = ty;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_accessor_visibility(mut self, visibility: Visibility) -> Self {
        self.accessor_visibility = Some(visibility);
        self
    }

    pub fn with_native_name(mut self, name: impl Into<String>) -> Self {
        self.native_name = Some(name.into());
        self
    }

    pub fn with_this_name(mut self, name: impl Into<String>) -> Self {
        self.this_name = Some(name.into());
        self
    }

    /// Visibility the generated item is emitted with.
    pub fn effective_visibility(&self) -> Visibility {
        match (self.kind.is_accessor(), self.accessor_visibility) {
            (true, Some(accessor)) => self.visibility.narrowest(accessor),
            _ => self.visibility,
        }
    }

    /// The location diagnostics point at: the member, else its container.
    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref().or(self.container.location.as_ref())
    }
}

fn default_true() -> bool {
    true
}

fn unit() -> TypeRef {
    TypeRef::Unit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_container_name_from_path() {
        let container = Container::new("engine::rendering::Camera");
        assert_eq!(container.name, "Camera");
        assert_eq!(Container::new("Camera").name, "Camera");
    }

    #[test]
    fn test_accessor_visibility_is_clamped() {
        let getter = Declaration::getter(Container::new("Camera"), "Enabled", TypeRef::Bool)
            .with_visibility(Visibility::Public)
            .with_accessor_visibility(Visibility::Crate);
        assert_eq!(getter.effective_visibility(), Visibility::Crate);

        // An accessor cannot widen the property.
        let setter = Declaration::setter(Container::new("Camera"), "Enabled", TypeRef::Bool)
            .with_visibility(Visibility::Crate)
            .with_accessor_visibility(Visibility::Public);
        assert_eq!(setter.effective_visibility(), Visibility::Crate);

        // Methods ignore accessor visibility.
        let method = Declaration::method(Container::new("Camera"), "Render")
            .with_accessor_visibility(Visibility::Private);
        assert_eq!(method.effective_visibility(), Visibility::Public);
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "declarations": [{
                "container": { "path": "engine::Texture", "name": "Texture" },
                "name": "Width",
                "kind": "method",
                "static": true,
                "ret": { "kind": "primitive", "name": "i32" }
            }]
        }"#;
        let set = DeclarationSet::from_json(json).unwrap();
        assert_eq!(set.len(), 1);

        let decl = &set.declarations[0];
        assert!(decl.is_static);
        assert!(decl.generated);
        assert!(decl.container.generated);
        assert_eq!(decl.visibility, Visibility::Private);
        assert_eq!(decl.ret, TypeRef::primitive(PrimitiveType::I32));
        assert!(decl.params.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let mut set = DeclarationSet::new();
        set.push(
            Declaration::method(Container::new("engine::Mesh"), "SetName")
                .with_param(Parameter::new("name", TypeRef::Str { owned: false }))
                .with_param(Parameter::new("changed", TypeRef::Bool).with_mode(PassMode::Out)),
        );

        let json = set.to_json().unwrap();
        let back = DeclarationSet::from_json(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_load_reports_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decls.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = DeclarationSet::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::Json(_)));

        let missing = DeclarationSet::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, CoreError::Io(_)));
    }
}
