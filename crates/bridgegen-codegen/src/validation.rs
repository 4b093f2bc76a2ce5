//! Legality checks run before anything is emitted
//!
//! A container is checked once; any failure skips all of its members. Each
//! member is then checked in stages (structure, names, every parameter and
//! the return value). Within a stage all problems are reported, and a
//! member that fails any stage is skipped. A member that passes comes out
//! as a [`MemberPlan`], which the emitter turns into code without further
//! checks.

use std::collections::HashSet;

use bridgegen_core::naming::to_rust_ident;
use bridgegen_core::{Container, Declaration, MemberKind, MemberSymbols, TypeRef};

use crate::config::GeneratorConfig;
use crate::diagnostics::Diagnostic;
use crate::marshal::{Marshaler, Position, Violation};

/// Locals every thunk declares; parameters and receivers may not shadow them.
const THUNK_LOCALS: &[&str] = &["__native", "__result"];

/// Widest native signature a runtime `NativeSlot` can hold, receiver
/// included.
pub const MAX_NATIVE_ARITY: usize = 12;

/// A parameter that passed every check.
#[derive(Debug, Clone)]
pub struct PlannedParam<'a> {
    /// Rust identifier, keyword-escaped.
    pub ident: String,
    pub marshaler: Marshaler<'a>,
}

/// A member that passed every check, ready for emission.
#[derive(Debug, Clone)]
pub struct MemberPlan<'a> {
    pub decl: &'a Declaration,
    pub symbols: MemberSymbols,
    pub params: Vec<PlannedParam<'a>>,
    pub ret: Marshaler<'a>,
}

pub fn check_container(container: &Container) -> Result<(), Diagnostic> {
    if container.nested {
        return Err(Diagnostic::type_must_be_top_level(container));
    }
    if container.generic {
        return Err(Diagnostic::type_must_not_be_generic(container));
    }
    if !container.generated {
        return Err(Diagnostic::type_must_be_generated(container));
    }
    if !is_ident(&container.name) {
        return Err(Diagnostic::invalid_type_name(container));
    }
    Ok(())
}

pub fn plan_member<'a>(
    decl: &'a Declaration,
    config: &GeneratorConfig,
) -> Result<MemberPlan<'a>, Vec<Diagnostic>> {
    if decl.generic {
        return Err(vec![Diagnostic::member_must_not_be_generic(decl)]);
    }
    if !decl.generated {
        return Err(vec![Diagnostic::member_must_be_generated(decl)]);
    }

    let shape = check_shape(decl);
    if !shape.is_empty() {
        return Err(shape);
    }

    let symbols = MemberSymbols::compute(decl, &config.receiver_name);
    let params: Vec<PlannedParam<'a>> = decl
        .params
        .iter()
        .map(|p| PlannedParam {
            ident: to_rust_ident(&p.name),
            marshaler: Marshaler::new(&p.ty, p.mode),
        })
        .collect();

    let names = check_names(decl, &symbols, &params);
    if !names.is_empty() {
        return Err(names);
    }

    let ret = Marshaler::for_return(&decl.ret);
    let mut occurrences = Vec::new();
    for (param, planned) in decl.params.iter().zip(&params) {
        if let Err(violation) = planned.marshaler.is_allowed(Position::Parameter) {
            let ty = param.ty.to_string();
            occurrences.push(match violation {
                Violation::CannotPassByRef => {
                    Diagnostic::cannot_pass_by_ref(decl, &param.name, &param.mode.to_string(), &ty)
                }
                Violation::CannotBeReturned => Diagnostic::cannot_be_returned(decl, &ty),
            });
        }
    }
    if ret.is_allowed(Position::Return).is_err() {
        occurrences.push(Diagnostic::cannot_be_returned(decl, &decl.ret.to_string()));
    }
    if !occurrences.is_empty() {
        return Err(occurrences);
    }

    Ok(MemberPlan {
        decl,
        symbols,
        params,
        ret,
    })
}

fn check_shape(decl: &Declaration) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    match decl.kind {
        MemberKind::Method => {}
        MemberKind::PropertyGetter => {
            if !decl.params.is_empty() {
                diagnostics.push(Diagnostic::malformed_signature(
                    decl,
                    "must not take parameters",
                ));
            }
            if decl.ret.is_unit() {
                diagnostics.push(Diagnostic::malformed_signature(decl, "must return a value"));
            }
        }
        MemberKind::PropertySetter => {
            match decl.params.as_slice() {
                [value] if value.mode.is_by_ref() => diagnostics.push(
                    Diagnostic::malformed_signature(decl, "must take its value by value"),
                ),
                [_] => {}
                _ => diagnostics.push(Diagnostic::malformed_signature(
                    decl,
                    "must take exactly one parameter",
                )),
            }
            if !decl.ret.is_unit() {
                diagnostics.push(Diagnostic::malformed_signature(
                    decl,
                    "must not return a value",
                ));
            }
        }
    }
    let arity = decl.params.len() + usize::from(!decl.is_static);
    if arity > MAX_NATIVE_ARITY {
        diagnostics.push(Diagnostic::malformed_signature(
            decl,
            format!(
                "takes {} native arguments; at most {} are supported",
                arity, MAX_NATIVE_ARITY
            ),
        ));
    }
    for param in &decl.params {
        if param.ty.is_unit() {
            diagnostics.push(Diagnostic::malformed_signature(
                decl,
                format!("has a parameter '{}' of type '()'", param.name),
            ));
        }
    }
    diagnostics
}

fn check_names(
    decl: &Declaration,
    symbols: &MemberSymbols,
    params: &[PlannedParam<'_>],
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if !is_ident(&symbols.fn_name) {
        diagnostics.push(Diagnostic::invalid_name(decl, "function name", &symbols.fn_name));
    }
    if !is_ident(&symbols.slot) {
        diagnostics.push(Diagnostic::invalid_name(decl, "entry point", &symbols.entry_point));
    }

    let mut seen = HashSet::new();
    for param in params {
        if !is_ident(&param.ident) || param.ident.starts_with("__") {
            diagnostics.push(Diagnostic::invalid_name(decl, "parameter name", &param.ident));
        } else if !seen.insert(param.ident.as_str()) {
            diagnostics.push(Diagnostic::invalid_name(
                decl,
                "repeated parameter name",
                &param.ident,
            ));
        }
    }

    if let Some(this) = &symbols.this_name {
        if !is_ident(this) || THUNK_LOCALS.contains(&this.as_str()) || seen.contains(this.as_str())
        {
            diagnostics.push(Diagnostic::invalid_name(decl, "receiver name", this));
        }
    }

    let types = decl.params.iter().map(|p| &p.ty).chain(std::iter::once(&decl.ret));
    for path in types.flat_map(TypeRef::paths) {
        if syn::parse_str::<syn::Type>(path).is_err() {
            diagnostics.push(Diagnostic::invalid_name(decl, "type path", path));
        }
    }

    diagnostics
}

fn is_ident(text: &str) -> bool {
    syn::parse_str::<syn::Ident>(text).is_ok()
}
