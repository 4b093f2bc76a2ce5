//! `#[repr(C)]` wrappers for scalar arguments
//!
//! Each distinct native parameter type gets one single-field wrapper struct
//! per generated unit, named `__ParamWrapper{n}` in order of first use. The
//! registry is consumed by [`WrapperRegistry::flush`], so definitions are
//! written exactly once, after every member of the unit has been emitted.

use std::collections::HashMap;
use std::fmt;

use crate::writer::CodeWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperEntry {
    pub name: String,
    /// Rendered native type, e.g. `i32` or `*mut ::core::ffi::c_void`.
    pub underlying: String,
}

#[derive(Debug, Default)]
pub struct WrapperRegistry {
    entries: Vec<WrapperEntry>,
    by_type: HashMap<String, usize>,
}

impl WrapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the wrapper for `underlying`, creating it on first use.
    pub fn intern(&mut self, underlying: &str) -> &str {
        let index = match self.by_type.get(underlying) {
            Some(&index) => index,
            None => {
                let index = self.entries.len();
                self.entries.push(WrapperEntry {
                    name: format!("__ParamWrapper{}", index),
                    underlying: underlying.to_string(),
                });
                self.by_type.insert(underlying.to_string(), index);
                tracing::trace!("New wrapper __ParamWrapper{} for {}", index, underlying);
                index
            }
        };
        &self.entries[index].name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every wrapper definition and hand back the table.
    pub fn flush(self, w: &mut CodeWriter) -> Result<Vec<WrapperEntry>, fmt::Error> {
        for entry in &self.entries {
            w.blank();
            w.line(format_args!("#[doc(hidden)]"))?;
            w.line(format_args!("#[repr(C)]"))?;
            w.line(format_args!("#[derive(Clone, Copy)]"))?;
            w.open(format_args!("struct {} {{", entry.name))?;
            w.line(format_args!("data: {},", entry.underlying))?;
            w.close()?;
            w.blank();
            w.open(format_args!(
                "impl ::core::convert::From<{}> for {} {{",
                entry.underlying, entry.name
            ))?;
            w.line(format_args!("#[inline(always)]"))?;
            w.open(format_args!("fn from(data: {}) -> Self {{", entry.underlying))?;
            w.line(format_args!("Self {{ data }}"))?;
            w.close()?;
            w.close()?;
        }
        Ok(self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut registry = WrapperRegistry::new();
        assert_eq!(registry.intern("i32"), "__ParamWrapper0");
        assert_eq!(registry.intern("*mut ::core::ffi::c_void"), "__ParamWrapper1");
        assert_eq!(registry.intern("i32"), "__ParamWrapper0");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_flush_writes_each_wrapper_once() {
        let mut registry = WrapperRegistry::new();
        registry.intern("f32");
        registry.intern("f32");

        let mut w = CodeWriter::new();
        let table = registry.flush(&mut w).unwrap();
        let text = w.finish();

        assert_eq!(table.len(), 1);
        assert_eq!(text.matches("struct __ParamWrapper0").count(), 1);
        assert!(text.contains("impl ::core::convert::From<f32> for __ParamWrapper0 {"));
        assert!(syn::parse_file(&text).is_ok());
    }

    proptest! {
        #[test]
        fn one_wrapper_per_distinct_type(
            picks in prop::collection::vec(0usize..5, 0..40)
        ) {
            const TYPES: [&str; 5] = ["i32", "f32", "u8", "*mut i32", "*mut ::core::ffi::c_void"];
            let mut registry = WrapperRegistry::new();
            let mut first_seen: Vec<&str> = Vec::new();
            for &pick in &picks {
                let ty = TYPES[pick];
                if !first_seen.contains(&ty) {
                    first_seen.push(ty);
                }
                let expected = format!(
                    "__ParamWrapper{}",
                    first_seen.iter().position(|t| *t == ty).unwrap()
                );
                prop_assert_eq!(registry.intern(ty), expected.as_str());
            }

            let table = registry.flush(&mut CodeWriter::new()).unwrap();
            let underlying: Vec<&str> = table.iter().map(|e| e.underlying.as_str()).collect();
            prop_assert_eq!(underlying, first_seen);
        }
    }
}
