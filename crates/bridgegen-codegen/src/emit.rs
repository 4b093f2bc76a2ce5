//! Thunk emission for one container
//!
//! Every generated unit has the same layout:
//!
//! ```text
//! mod __{Type}_binding {
//!     use super::*;
//!
//!     static __{EntryPoint}_FunctionPointer: NativeSlot<...> = NativeSlot::new();
//!     ...
//!
//!     impl {Type} {
//!         pub fn member(&self, ...) -> ... { ... }
//!         ...
//!     }
//!
//!     struct __ParamWrapper0 { data: ... }
//!     ...
//! }
//! ```
//!
//! Items live in a private child module so slots and wrappers stay out of
//! the including module's namespace; member visibility is rewritten to be
//! relative to that module.

use std::fmt;

use bridgegen_core::{Container, Visibility};

use crate::config::GeneratorConfig;
use crate::marshal::OPAQUE_PTR;
use crate::validation::MemberPlan;
use crate::wrappers::{WrapperEntry, WrapperRegistry};
use crate::writer::CodeWriter;

/// Visibility of an item inside the binding module, equivalent to
/// `visibility` on an item of the including module.
pub fn render_visibility(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "pub",
        Visibility::Crate => "pub(crate)",
        Visibility::Super => "pub(in super::super)",
        Visibility::Private => "pub(super)",
    }
}

pub fn binding_module_name(container: &Container) -> String {
    format!("__{}_binding", container.name)
}

/// Source text and wrapper table of a finished unit.
#[derive(Debug)]
pub struct UnitSource {
    pub source: String,
    pub wrappers: Vec<WrapperEntry>,
}

pub struct ThunkEmitter<'c> {
    config: &'c GeneratorConfig,
    wrappers: WrapperRegistry,
    slots: CodeWriter,
    methods: CodeWriter,
    emitted: usize,
}

impl<'c> ThunkEmitter<'c> {
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self {
            config,
            wrappers: WrapperRegistry::new(),
            slots: CodeWriter::at_level(1),
            methods: CodeWriter::at_level(2),
            emitted: 0,
        }
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Route an argument through a wrapper when it is a scalar.
    fn wrap(&mut self, native: &str, scalar: bool, expr: String) -> (String, String) {
        if self.config.wrap_scalars && scalar {
            let wrapper = self.wrappers.intern(native).to_string();
            let expr = format!("{}::from({})", wrapper, expr);
            (wrapper, expr)
        } else {
            (native.to_string(), expr)
        }
    }

    pub fn emit_member(&mut self, plan: &MemberPlan<'_>) -> fmt::Result {
        let config = self.config;
        let rt = config.runtime_crate.as_str();
        let decl = plan.decl;
        let symbols = &plan.symbols;
        let has_result = !plan.ret.ty.is_unit();
        let scoped = plan.params.iter().any(|p| p.marshaler.opens_scope());

        let mut body = CodeWriter::at_level(self.methods.level() + 1);
        let mut native_params = Vec::with_capacity(plan.params.len() + 1);
        let mut args = Vec::with_capacity(plan.params.len() + 1);

        body.line(format_args!(
            "let __native = {}.get_or_resolve(\"{}\");",
            symbols.slot, symbols.entry_point
        ))?;
        if let Some(this) = &symbols.this_name {
            body.line(format_args!(
                "let {} = {}::handle_ptr(self, \"self\");",
                this, rt
            ))?;
            let (ty, arg) = self.wrap(OPAQUE_PTR, true, this.clone());
            native_params.push(ty);
            args.push(arg);
        }
        if has_result && scoped {
            body.line(format_args!("let __result;"))?;
        }

        for param in &plan.params {
            let native = param.marshaler.native_type();
            let arg = param.marshaler.begin_argument(&mut body, &param.ident, rt)?;
            let (ty, arg) = self.wrap(&native.rendered, native.scalar, arg);
            native_params.push(ty);
            args.push(arg);
        }

        let call = format!("unsafe {{ __native({}) }}", args.join(", "));
        match (has_result, scoped) {
            (true, true) => body.line(format_args!("__result = {};", call))?,
            (true, false) => body.line(format_args!("let __result = {};", call))?,
            (false, _) => body.line(format_args!("{};", call))?,
        }

        for param in plan.params.iter().rev() {
            param.marshaler.end_argument(&mut body, &param.ident, rt)?;
        }
        if has_result {
            body.line(format_args!("{}", plan.ret.unmarshal_return("__result", rt)))?;
        }

        let return_suffix = if has_result {
            format!(" -> {}", plan.ret.native_type().rendered)
        } else {
            String::new()
        };
        self.slots.line(format_args!("#[doc(hidden)]"))?;
        self.slots.line(format_args!(
            "static {}: {}::NativeSlot<unsafe extern \"{}\" fn({}){}> = {}::NativeSlot::new();",
            symbols.slot,
            rt,
            config.abi.as_str(),
            native_params.join(", "),
            return_suffix,
            rt
        ))?;

        let mut signature = Vec::with_capacity(plan.params.len() + 1);
        if symbols.this_name.is_some() {
            signature.push("&self".to_string());
        }
        for param in &plan.params {
            signature.push(format!("{}: {}", param.ident, param.marshaler.managed_type()));
        }
        let managed_return = if has_result {
            format!(" -> {}", plan.ret.managed_return_type())
        } else {
            String::new()
        };

        if self.emitted > 0 {
            self.methods.blank();
        }
        self.methods.line(format_args!(
            "/// Calls the native entry point `{}`.",
            symbols.entry_point
        ))?;
        self.methods.open(format_args!(
            "{} fn {}({}){} {{",
            render_visibility(decl.effective_visibility()),
            symbols.fn_name,
            signature.join(", "),
            managed_return
        ))?;
        self.methods.append(body.as_str());
        self.methods.close()?;

        self.emitted += 1;
        tracing::trace!(
            entry_point = %symbols.entry_point,
            wrappers = self.wrappers.len(),
            "Emitted thunk {}",
            symbols.fn_name
        );
        Ok(())
    }

    /// Assemble the unit. Wrappers are flushed here, after every member.
    pub fn finish(self, container: &Container, native_type: &str) -> Result<UnitSource, fmt::Error> {
        let mut w = CodeWriter::new();
        if self.config.emit_header {
            w.line(format_args!("// Generated by bridgegen. DO NOT EDIT."))?;
            w.line(format_args!("//"))?;
            w.line(format_args!("// Type: {}", container.path))?;
            w.line(format_args!("// Native type: {}", native_type))?;
            w.line(format_args!("// Native members: {}", self.emitted))?;
            w.blank();
        }

        w.line(format_args!("#[doc(hidden)]"))?;
        w.line(format_args!("#[allow(non_snake_case)]"))?;
        w.open(format_args!("mod {} {{", binding_module_name(container)))?;
        w.line(format_args!(
            "#![allow(non_upper_case_globals, non_camel_case_types, non_snake_case, dead_code, unused_unsafe, clippy::all)]"
        ))?;
        w.blank();
        w.line(format_args!("use super::*;"))?;
        w.blank();
        w.append(self.slots.as_str());
        w.blank();
        w.open(format_args!("impl {} {{", container.name))?;
        w.append(self.methods.as_str());
        w.close()?;

        let wrappers = self.wrappers.flush(&mut w)?;
        w.close()?;

        Ok(UnitSource {
            source: w.finish(),
            wrappers,
        })
    }
}
