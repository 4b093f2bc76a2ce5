//! Test fixtures for bridgegen testing
//!
//! Provides small, representative declaration sets instead of stored outputs.
//! Every set is built in code; [`TestFixtures::setup`] also writes one to a
//! temporary directory for tests that drive the CLI.

use bridgegen_core::{
    Container, Declaration, DeclarationSet, Parameter, PassMode, PrimitiveType, SourceLocation,
    TypeRef, Visibility,
};
use std::fs;
use std::path::PathBuf;

/// Test fixture categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureType {
    /// Only legal declarations across several types.
    Engine,
    /// Legal members mixed with members that must be rejected.
    MixedLegality,
    /// Types that cannot carry native members at all.
    InvalidTypes,
}

/// Main test fixtures provider
pub struct TestFixtures {
    temp_dir: Option<tempfile::TempDir>,
}

impl Default for TestFixtures {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixtures {
    pub fn new() -> Self {
        Self { temp_dir: None }
    }

    /// Write the fixture's declarations to `declarations.json` in a fresh
    /// temporary directory and return the file path. The directory lives as
    /// long as `self`.
    pub fn setup(&mut self, fixture_type: FixtureType) -> PathBuf {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("declarations.json");
        let set = declarations(fixture_type);
        fs::write(&path, set.to_json().unwrap()).unwrap();
        self.temp_dir = Some(dir);
        path
    }

    /// The temporary directory of the last `setup`, if any.
    pub fn dir(&self) -> Option<PathBuf> {
        self.temp_dir.as_ref().map(|d| d.path().to_path_buf())
    }
}

pub fn declarations(fixture_type: FixtureType) -> DeclarationSet {
    match fixture_type {
        FixtureType::Engine => engine_declarations(),
        FixtureType::MixedLegality => mixed_legality_declarations(),
        FixtureType::InvalidTypes => invalid_type_declarations(),
    }
}

fn at(file: &str, line: u32) -> Option<SourceLocation> {
    Some(SourceLocation {
        file: file.to_string(),
        line,
        column: 5,
    })
}

pub fn camera() -> Container {
    let mut container = Container::new("engine::Camera");
    container.location = at("src/camera.rs", 10);
    container
}

/// `engine::graphics::GfxTexture`, exported natively as `Texture`.
pub fn texture() -> Container {
    let mut container = Container::new("engine::graphics::GfxTexture").with_native_name("Texture");
    container.location = at("src/graphics/texture.rs", 4);
    container
}

pub fn engine_declarations() -> DeclarationSet {
    let f32_ty = TypeRef::primitive(PrimitiveType::F32);
    let texture_ty = TypeRef::native_object("engine::graphics::GfxTexture", false);
    let mut set = DeclarationSet::new();

    set.push(Declaration::getter(camera(), "Enabled", TypeRef::Bool));
    set.push(Declaration::setter(camera(), "Enabled", TypeRef::Bool));
    set.push(Declaration::getter(camera(), "FieldOfView", f32_ty.clone()));
    set.push(
        Declaration::setter(camera(), "FieldOfView", f32_ty.clone())
            .with_accessor_visibility(Visibility::Crate),
    );
    set.push(
        Declaration::method(camera(), "Render")
            .with_param(Parameter::new("target", texture_ty.clone()))
            .with_param(Parameter::new(
                "fallback",
                TypeRef::native_object("engine::graphics::GfxTexture", true),
            ))
            .with_param(Parameter::new("clear", TypeRef::Bool)),
    );
    set.push(
        Declaration::method(camera(), "Project")
            .with_param(Parameter::new("label", TypeRef::Str { owned: false }))
            .with_param(Parameter::new("origin", TypeRef::named("Vector3")).with_mode(PassMode::Ref))
            .with_return(f32_ty.clone()),
    );
    set.push(
        Declaration::method(camera(), "TryGetViewport")
            .with_param(
                Parameter::new("viewport", TypeRef::named("Viewport")).with_mode(PassMode::Out),
            )
            .with_param(Parameter::new("visible", TypeRef::Bool).with_mode(PassMode::Out))
            .with_return(TypeRef::Bool),
    );
    set.push(Declaration::getter(camera(), "Name", TypeRef::Str { owned: true }));
    set.push(Declaration::setter(camera(), "Name", TypeRef::Str { owned: true }));
    set.push(
        Declaration::method(camera(), "Type")
            .with_this_name("camera")
            .with_visibility(Visibility::Super)
            .with_return(TypeRef::Enum {
                path: "CameraKind".to_string(),
                repr: PrimitiveType::U8,
            }),
    );

    set.push(
        Declaration::method(texture(), "Width")
            .with_static(true)
            .with_return(TypeRef::primitive(PrimitiveType::U32)),
    );
    set.push(
        Declaration::method(texture(), "Load")
            .with_static(true)
            .with_param(Parameter::new("path", TypeRef::Str { owned: false }))
            .with_param(Parameter::new("mip_levels", TypeRef::primitive(PrimitiveType::I32)))
            .with_return(TypeRef::Pointer {
                pointee: "::core::ffi::c_void".to_string(),
                mutable: true,
            }),
    );
    set.push(
        Declaration::method(texture(), "Bind")
            .with_param(Parameter::new("slot", TypeRef::primitive(PrimitiveType::I32)))
            .with_param(Parameter::new("sampler", texture_ty)),
    );

    set
}

/// Camera members where `Bind` and `Active` are illegal; the rest are fine.
pub fn mixed_legality_declarations() -> DeclarationSet {
    let mut set = DeclarationSet::new();
    set.push(Declaration::getter(camera(), "Enabled", TypeRef::Bool));
    set.push(
        Declaration::method(camera(), "Bind").with_param(
            Parameter::new("label", TypeRef::Str { owned: false }).with_mode(PassMode::Ref),
        ),
    );
    set.push(
        Declaration::method(camera(), "Active")
            .with_static(true)
            .with_return(TypeRef::native_object("engine::Camera", false)),
    );
    set.push(Declaration::setter(camera(), "Enabled", TypeRef::Bool));
    set
}

/// One declaration per type-level failure, plus one legal type.
pub fn invalid_type_declarations() -> DeclarationSet {
    let mut nested = Container::new("engine::Scene::Node");
    nested.nested = true;
    let mut generic = Container::new("engine::Pool");
    generic.generic = true;
    let mut unmarked = Container::new("engine::Light");
    unmarked.generated = false;

    let mut set = DeclarationSet::new();
    set.push(Declaration::method(nested, "Attach"));
    set.push(Declaration::method(generic, "Grow"));
    set.push(Declaration::method(unmarked, "Flicker"));
    set.push(Declaration::method(camera(), "Render"));
    set
}
