//! Entry-point lookup.
//!
//! Native functions are linked into (or already loaded by) the running
//! process, so lookups go against the process image itself rather than a
//! separately opened library.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::OnceLock;

/// Maps an entry-point name to a native address.
///
/// Implementations must be idempotent: the same name always resolves to the
/// same address. [`crate::NativeSlot`] relies on this to tolerate racing
/// first calls.
pub trait SymbolResolver {
    fn resolve(&self, entry_point: &str) -> Option<NonNull<c_void>>;
}

/// Resolves against the running process's own exported symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSymbols;

#[cfg(unix)]
type ProcessLibrary = libloading::os::unix::Library;

#[cfg(windows)]
type ProcessLibrary = libloading::os::windows::Library;

#[cfg(unix)]
fn open_process() -> Option<ProcessLibrary> {
    Some(ProcessLibrary::this())
}

#[cfg(windows)]
fn open_process() -> Option<ProcessLibrary> {
    match ProcessLibrary::this() {
        Ok(library) => Some(library),
        Err(err) => {
            tracing::error!("Cannot open the process image for symbol lookup: {}", err);
            None
        }
    }
}

#[cfg(any(unix, windows))]
fn process_library() -> Option<&'static ProcessLibrary> {
    static PROCESS: OnceLock<Option<ProcessLibrary>> = OnceLock::new();
    PROCESS.get_or_init(open_process).as_ref()
}

impl SymbolResolver for ProcessSymbols {
    #[cfg(any(unix, windows))]
    fn resolve(&self, entry_point: &str) -> Option<NonNull<c_void>> {
        let library = process_library()?;
        // SAFETY: the symbol is only read as an address; it is never called
        // or dereferenced here.
        let symbol = unsafe { library.get::<*mut c_void>(entry_point.as_bytes()) };
        match symbol {
            Ok(symbol) => {
                let address = NonNull::new(*symbol);
                tracing::trace!("Resolved '{}' to {:?}", entry_point, address);
                address
            }
            Err(err) => {
                tracing::debug!("Lookup of '{}' failed: {}", entry_point, err);
                None
            }
        }
    }

    #[cfg(not(any(unix, windows)))]
    fn resolve(&self, entry_point: &str) -> Option<NonNull<c_void>> {
        tracing::debug!("No process symbol table on this target for '{}'", entry_point);
        None
    }
}
