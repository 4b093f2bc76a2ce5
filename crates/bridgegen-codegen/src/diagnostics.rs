//! Diagnostics for declarations that cannot be bound
//!
//! Every problem found while walking the declaration set is recorded here
//! instead of aborting generation. The offending type or member is skipped;
//! everything else is still emitted. Codes are stable and appear in the
//! rendered message, e.g. `error[BG0007]`.

use std::collections::BTreeMap;
use std::fmt;

use bridgegen_core::{Container, Declaration, MemberKind, SourceLocation};

use crate::error::CodegenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticKind {
    /// A type with native members is nested inside another type.
    TypeMustBeTopLevel,
    /// A type with native members is generic.
    TypeMustNotBeGeneric,
    /// A type with native members is not marked for generated members.
    TypeMustBeGenerated,
    /// A native member is generic.
    MemberMustNotBeGeneric,
    /// A native method is not marked for a generated body.
    MethodMustBeGenerated,
    /// A native property accessor is not marked for a generated body.
    AccessorMustBeGenerated,
    /// A parameter's type cannot be passed in the requested mode.
    CannotPassByRef,
    /// The return type cannot cross the boundary as a return value.
    CannotBeReturned,
    /// A name or type path is not valid Rust syntax.
    InvalidName,
    /// The member's parameter list does not fit its kind.
    MalformedSignature,
    /// Two members of one type resolve to the same entry point.
    DuplicateEntryPoint,
    /// Two members of one type resolve to the same Rust function name.
    DuplicateFunctionName,
    /// Two types would be written to the same unit file.
    DuplicateUnitFile,
}

impl DiagnosticKind {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::TypeMustBeTopLevel => "BG0001",
            DiagnosticKind::TypeMustNotBeGeneric => "BG0002",
            DiagnosticKind::TypeMustBeGenerated => "BG0003",
            DiagnosticKind::MemberMustNotBeGeneric => "BG0004",
            DiagnosticKind::MethodMustBeGenerated => "BG0005",
            DiagnosticKind::AccessorMustBeGenerated => "BG0006",
            DiagnosticKind::CannotPassByRef => "BG0007",
            DiagnosticKind::CannotBeReturned => "BG0008",
            DiagnosticKind::InvalidName => "BG0009",
            DiagnosticKind::MalformedSignature => "BG0010",
            DiagnosticKind::DuplicateEntryPoint => "BG0011",
            DiagnosticKind::DuplicateFunctionName => "BG0012",
            DiagnosticKind::DuplicateUnitFile => "BG0013",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            DiagnosticKind::TypeMustBeTopLevel => "Native type must be top-level",
            DiagnosticKind::TypeMustNotBeGeneric => "Native type must not be generic",
            DiagnosticKind::TypeMustBeGenerated => "Native type must be marked for generation",
            DiagnosticKind::MemberMustNotBeGeneric => "Native member must not be generic",
            DiagnosticKind::MethodMustBeGenerated => "Native method must be marked for generation",
            DiagnosticKind::AccessorMustBeGenerated => {
                "Native property must be marked for generation"
            }
            DiagnosticKind::CannotPassByRef => "Parameter cannot be passed by reference",
            DiagnosticKind::CannotBeReturned => "Type cannot be returned",
            DiagnosticKind::InvalidName => "Invalid name",
            DiagnosticKind::MalformedSignature => "Malformed member signature",
            DiagnosticKind::DuplicateEntryPoint => "Duplicate entry point",
            DiagnosticKind::DuplicateFunctionName => "Duplicate function name",
            DiagnosticKind::DuplicateUnitFile => "Duplicate unit file",
        }
    }

    /// Whether the diagnostic disqualifies the whole type rather than one member.
    pub fn is_type_level(self) -> bool {
        matches!(
            self,
            DiagnosticKind::TypeMustBeTopLevel
                | DiagnosticKind::TypeMustNotBeGeneric
                | DiagnosticKind::TypeMustBeGenerated
                | DiagnosticKind::DuplicateUnitFile
        )
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Where a diagnostic applies: the container, the member, and the source
/// position the front end reported for them, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticLocation {
    pub container: Option<String>,
    pub member: Option<String>,
    pub source: Option<SourceLocation>,
}

impl DiagnosticLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_container(container: &Container) -> Self {
        Self {
            container: Some(container.path.clone()),
            member: None,
            source: container.location.clone(),
        }
    }

    pub fn of_member(decl: &Declaration) -> Self {
        Self {
            container: Some(decl.container.path.clone()),
            member: Some(decl.name.clone()),
            source: decl.location().cloned(),
        }
    }
}

impl fmt::Display for DiagnosticLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{}: ", source)?;
        }
        match (&self.container, &self.member) {
            (Some(c), Some(m)) => write!(f, "{}::{}", c, m),
            (Some(c), None) => write!(f, "{}", c),
            (None, Some(m)) => write!(f, "::{}", m),
            (None, None) => write!(f, "<unknown location>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: DiagnosticLocation,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            location: DiagnosticLocation::new(),
            message: message.into(),
        }
    }

    pub fn at(mut self, location: DiagnosticLocation) -> Self {
        self.location = location;
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn type_must_be_top_level(container: &Container) -> Self {
        Self::new(
            DiagnosticKind::TypeMustBeTopLevel,
            format!(
                "The type '{}' must be top-level because it contains native members",
                container.path
            ),
        )
        .at(DiagnosticLocation::of_container(container))
    }

    pub fn type_must_not_be_generic(container: &Container) -> Self {
        Self::new(
            DiagnosticKind::TypeMustNotBeGeneric,
            format!(
                "The type '{}' must not be generic because it contains native members",
                container.path
            ),
        )
        .at(DiagnosticLocation::of_container(container))
    }

    pub fn type_must_be_generated(container: &Container) -> Self {
        Self::new(
            DiagnosticKind::TypeMustBeGenerated,
            format!(
                "The type '{}' must be marked for generated members because it contains native members",
                container.path
            ),
        )
        .at(DiagnosticLocation::of_container(container))
    }

    pub fn invalid_type_name(container: &Container) -> Self {
        Self::new(
            DiagnosticKind::InvalidName,
            format!(
                "The type name '{}' is not a Rust identifier",
                container.name
            ),
        )
        .at(DiagnosticLocation::of_container(container))
    }

    pub fn member_must_not_be_generic(decl: &Declaration) -> Self {
        Self::new(
            DiagnosticKind::MemberMustNotBeGeneric,
            format!("The native {} '{}' must not be generic", decl.kind, decl.name),
        )
        .at(DiagnosticLocation::of_member(decl))
    }

    pub fn member_must_be_generated(decl: &Declaration) -> Self {
        let kind = match decl.kind {
            MemberKind::Method => DiagnosticKind::MethodMustBeGenerated,
            MemberKind::PropertyGetter | MemberKind::PropertySetter => {
                DiagnosticKind::AccessorMustBeGenerated
            }
        };
        Self::new(
            kind,
            format!(
                "The native {} '{}' must be marked for a generated body",
                decl.kind, decl.name
            ),
        )
        .at(DiagnosticLocation::of_member(decl))
    }

    pub fn cannot_pass_by_ref(decl: &Declaration, parameter: &str, mode: &str, ty: &str) -> Self {
        Self::new(
            DiagnosticKind::CannotPassByRef,
            format!(
                "The parameter '{}' cannot be passed by '{}' because it is of type '{}'",
                parameter, mode, ty
            ),
        )
        .at(DiagnosticLocation::of_member(decl))
    }

    pub fn cannot_be_returned(decl: &Declaration, ty: &str) -> Self {
        Self::new(
            DiagnosticKind::CannotBeReturned,
            format!("The return value cannot be of type '{}'", ty),
        )
        .at(DiagnosticLocation::of_member(decl))
    }

    pub fn invalid_name(decl: &Declaration, what: &str, name: &str) -> Self {
        Self::new(
            DiagnosticKind::InvalidName,
            format!("The {} '{}' is not valid Rust syntax", what, name),
        )
        .at(DiagnosticLocation::of_member(decl))
    }

    pub fn malformed_signature(decl: &Declaration, reason: impl fmt::Display) -> Self {
        Self::new(
            DiagnosticKind::MalformedSignature,
            format!("The native {} '{}' {}", decl.kind, decl.name, reason),
        )
        .at(DiagnosticLocation::of_member(decl))
    }

    pub fn duplicate_entry_point(decl: &Declaration, entry_point: &str) -> Self {
        Self::new(
            DiagnosticKind::DuplicateEntryPoint,
            format!(
                "The entry point '{}' is already bound by another member of '{}'",
                entry_point, decl.container.path
            ),
        )
        .at(DiagnosticLocation::of_member(decl))
    }

    pub fn duplicate_function_name(decl: &Declaration, fn_name: &str) -> Self {
        Self::new(
            DiagnosticKind::DuplicateFunctionName,
            format!(
                "The function '{}' is already defined by another member of '{}'",
                fn_name, decl.container.path
            ),
        )
        .at(DiagnosticLocation::of_member(decl))
    }

    pub fn duplicate_unit_file(container: &Container, file_name: &str, taken_by: &str) -> Self {
        Self::new(
            DiagnosticKind::DuplicateUnitFile,
            format!(
                "The unit file '{}' is already written for '{}'",
                file_name, taken_by
            ),
        )
        .at(DiagnosticLocation::of_container(container))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error[{}] at {}: {}",
            self.kind.code(),
            self.location,
            self.message
        )
    }
}

/// Diagnostics collected over one generation run, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(code = diagnostic.code(), "{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.add(diagnostic);
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn by_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Group by code, most severe (type-level) codes first.
    pub fn format_summary(&self) -> String {
        if self.entries.is_empty() {
            return "No diagnostics".to_string();
        }

        let mut by_kind: BTreeMap<DiagnosticKind, Vec<&Diagnostic>> = BTreeMap::new();
        for entry in &self.entries {
            by_kind.entry(entry.kind).or_default().push(entry);
        }

        let mut lines = Vec::new();
        lines.push(format!("Found {} diagnostic(s):", self.entries.len()));
        lines.push(String::new());

        for (kind, entries) in by_kind {
            lines.push(format!("## {} {} ({}):", kind.code(), kind.title(), entries.len()));
            for entry in entries.iter().take(10) {
                lines.push(format!("  - {}: {}", entry.location, entry.message));
            }
            if entries.len() > 10 {
                lines.push(format!("  ... and {} more", entries.len() - 10));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }

    pub fn format_compact(&self) -> String {
        self.entries
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Diagnostics> for CodegenError {
    fn from(diagnostics: Diagnostics) -> Self {
        CodegenError::Diagnostics {
            count: diagnostics.count(),
            summary: diagnostics.format_summary(),
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridgegen_core::TypeRef;
    use pretty_assertions::assert_eq;

    fn camera() -> Container {
        Container::new("engine::Camera")
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(DiagnosticKind::TypeMustBeTopLevel.code(), "BG0001");
        assert_eq!(DiagnosticKind::CannotPassByRef.code(), "BG0007");
        assert_eq!(DiagnosticKind::CannotBeReturned.code(), "BG0008");
        assert_eq!(DiagnosticKind::DuplicateEntryPoint.code(), "BG0011");
        assert_eq!(DiagnosticKind::DuplicateFunctionName.code(), "BG0012");
        assert_eq!(DiagnosticKind::DuplicateUnitFile.code(), "BG0013");
        assert!(DiagnosticKind::DuplicateUnitFile.is_type_level());
    }

    #[test]
    fn test_accessor_and_method_codes_differ() {
        let mut method = Declaration::method(camera(), "Render");
        method.generated = false;
        let mut getter = Declaration::getter(camera(), "Enabled", TypeRef::Bool);
        getter.generated = false;

        assert_eq!(
            Diagnostic::member_must_be_generated(&method).kind,
            DiagnosticKind::MethodMustBeGenerated
        );
        assert_eq!(
            Diagnostic::member_must_be_generated(&getter).kind,
            DiagnosticKind::AccessorMustBeGenerated
        );
    }

    #[test]
    fn test_display_includes_code_and_location() {
        let mut container = camera();
        container.location = Some(SourceLocation {
            file: "src/camera.rs".to_string(),
            line: 12,
            column: 1,
        });
        let decl = Declaration::method(container, "Render");
        let diagnostic = Diagnostic::cannot_be_returned(&decl, "Texture");

        assert_eq!(
            diagnostic.to_string(),
            "error[BG0008] at src/camera.rs:12:1: engine::Camera::Render: \
             The return value cannot be of type 'Texture'"
        );
    }

    #[test]
    fn test_summary_groups_by_code() {
        let decl = Declaration::method(camera(), "Render");
        let mut diagnostics = Diagnostics::new();
        diagnostics.add(Diagnostic::cannot_be_returned(&decl, "Texture"));
        diagnostics.add(Diagnostic::type_must_be_top_level(&camera()));
        diagnostics.add(Diagnostic::cannot_be_returned(&decl, "Mesh"));

        let summary = diagnostics.format_summary();
        assert!(summary.starts_with("Found 3 diagnostic(s):"));
        let top_level = summary.find("## BG0001").unwrap();
        let returned = summary.find("## BG0008").unwrap();
        assert!(top_level < returned);
        assert!(summary.contains("Type cannot be returned (2)"));
        assert_eq!(diagnostics.by_kind(DiagnosticKind::CannotBeReturned).count(), 2);
    }

    #[test]
    fn test_into_codegen_error() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.add(Diagnostic::type_must_be_generated(&camera()));
        match CodegenError::from(diagnostics) {
            CodegenError::Diagnostics { count, summary } => {
                assert_eq!(count, 1);
                assert!(summary.contains("BG0003"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
