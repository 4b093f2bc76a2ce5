//! Generation driver: declaration set in, one unit per type out
//!
//! Declarations are grouped by container path and containers are processed
//! in path order, so the same input always produces the same units with the
//! same wrapper numbering. Members keep their input order within a unit.

use std::collections::{BTreeMap, HashMap, HashSet};

use bridgegen_core::symbols::native_type_name;
use bridgegen_core::{Container, Declaration, DeclarationSet, MemberKind};
use tracing::{debug, info, instrument, warn};

use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::emit::ThunkEmitter;
use crate::error::CodegenError;
use crate::validation::{check_container, plan_member};
use crate::wrappers::WrapperEntry;
use crate::Codegen;

/// A member that made it into a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedMember {
    pub name: String,
    pub kind: MemberKind,
    pub fn_name: String,
    pub entry_point: String,
    pub slot: String,
}

/// Generated source for one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub container_path: String,
    pub container_name: String,
    pub native_type_name: String,
    /// `{Type}_binding.rs`
    pub file_name: String,
    pub source: String,
    pub members: Vec<EmittedMember>,
    pub wrappers: Vec<WrapperEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    pub units: Vec<GeneratedUnit>,
    pub diagnostics: Diagnostics,
}

impl GenerationOutput {
    pub fn unit(&self, container_path: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|u| u.container_path == container_path)
    }

    pub fn member_count(&self) -> usize {
        self.units.iter().map(|u| u.members.len()).sum()
    }

    /// `Err` carrying the diagnostic summary when anything was skipped.
    pub fn check(&self) -> Result<(), CodegenError> {
        if self.diagnostics.has_errors() {
            return Err(self.diagnostics.clone().into());
        }
        Ok(())
    }
}

/// Binds every declaration it is given to a native entry point.
#[derive(Debug, Clone, Default)]
pub struct BindingGenerator {
    config: GeneratorConfig,
}

impl BindingGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    #[instrument(skip(self, set), fields(declarations = set.len()), level = "debug")]
    pub fn generate_set(&self, set: &DeclarationSet) -> Result<GenerationOutput, CodegenError> {
        self.config.validate()?;

        let mut by_container: BTreeMap<&str, Vec<&Declaration>> = BTreeMap::new();
        for decl in &set.declarations {
            by_container
                .entry(decl.container.path.as_str())
                .or_default()
                .push(decl);
        }
        debug!("Grouped declarations into {} types", by_container.len());

        let mut output = GenerationOutput::default();
        let mut files: HashMap<String, String> = HashMap::new();
        for (path, members) in by_container {
            let container = &members[0].container;
            if members.iter().any(|m| m.container != *container) {
                warn!(
                    "Members of '{}' disagree on type attributes; using the first",
                    path
                );
            }
            let Some(unit) = self.generate_unit(container, &members, &mut output.diagnostics)?
            else {
                continue;
            };
            if let Some(taken_by) = files.get(&unit.file_name) {
                warn!(
                    "Skipping type '{}': {} is already written for '{}'",
                    path, unit.file_name, taken_by
                );
                output.diagnostics.add(Diagnostic::duplicate_unit_file(
                    container,
                    &unit.file_name,
                    taken_by,
                ));
                continue;
            }
            files.insert(unit.file_name.clone(), unit.container_path.clone());
            output.units.push(unit);
        }

        info!(
            "Generated {} units with {} members ({} diagnostics)",
            output.units.len(),
            output.member_count(),
            output.diagnostics.count()
        );
        Ok(output)
    }

    #[instrument(skip_all, fields(container = %container.path), level = "debug")]
    fn generate_unit(
        &self,
        container: &Container,
        members: &[&Declaration],
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<GeneratedUnit>, CodegenError> {
        if let Err(diagnostic) = check_container(container) {
            warn!("Skipping type '{}': {}", container.path, diagnostic);
            diagnostics.add(diagnostic);
            return Ok(None);
        }

        let native_type = native_type_name(container);
        let mut emitter = ThunkEmitter::new(&self.config);
        let mut entry_points = HashSet::new();
        let mut fn_names = HashSet::new();
        let mut emitted = Vec::new();

        for decl in members {
            let plan = match plan_member(decl, &self.config) {
                Ok(plan) => plan,
                Err(found) => {
                    warn!(
                        "Skipping member '{}' of '{}' ({} diagnostics)",
                        decl.name,
                        container.path,
                        found.len()
                    );
                    diagnostics.extend(found);
                    continue;
                }
            };
            if entry_points.contains(&plan.symbols.entry_point) {
                warn!("Skipping member '{}': duplicate entry point", decl.name);
                diagnostics.add(Diagnostic::duplicate_entry_point(
                    decl,
                    &plan.symbols.entry_point,
                ));
                continue;
            }
            if fn_names.contains(&plan.symbols.fn_name) {
                warn!(
                    "Skipping member '{}': function '{}' is already defined",
                    decl.name, plan.symbols.fn_name
                );
                diagnostics.add(Diagnostic::duplicate_function_name(
                    decl,
                    &plan.symbols.fn_name,
                ));
                continue;
            }
            entry_points.insert(plan.symbols.entry_point.clone());
            fn_names.insert(plan.symbols.fn_name.clone());

            emitter.emit_member(&plan)?;
            emitted.push(EmittedMember {
                name: decl.name.clone(),
                kind: decl.kind,
                fn_name: plan.symbols.fn_name.clone(),
                entry_point: plan.symbols.entry_point.clone(),
                slot: plan.symbols.slot.clone(),
            });
        }

        if emitted.is_empty() {
            debug!("No members of '{}' were emitted", container.path);
            return Ok(None);
        }

        let unit = emitter.finish(container, native_type)?;
        debug!(
            "Unit {}_binding.rs: {} members, {} wrappers",
            container.name,
            emitted.len(),
            unit.wrappers.len()
        );
        Ok(Some(GeneratedUnit {
            container_path: container.path.clone(),
            container_name: container.name.clone(),
            native_type_name: native_type.to_string(),
            file_name: format!("{}_binding.rs", container.name),
            source: unit.source,
            members: emitted,
            wrappers: unit.wrappers,
        }))
    }
}

impl Codegen for BindingGenerator {
    fn generate(&mut self, set: &DeclarationSet) -> Result<GenerationOutput, CodegenError> {
        self.generate_set(set)
    }
}
