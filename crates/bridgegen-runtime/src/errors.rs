//! Fatal run-time failures raised by generated thunks.
//!
//! Both are raised with [`std::panic::panic_any`] so a caller that catches
//! the unwind can downcast the payload to the specific type.

use thiserror::Error;

/// A native entry point could not be found in the running process.
///
/// Indicates a build/link mismatch between the generated bindings and the
/// native engine. Failure is never cached: every call retries the lookup
/// and fails again while the symbol stays missing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Entry point not found: {entry_point}")]
pub struct EntryPointNotFound {
    pub entry_point: String,
}

impl EntryPointNotFound {
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self {
            entry_point: entry_point.into(),
        }
    }
}

/// A native handle object that must be live wrapped a null pointer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Native handle passed as '{parameter}' has a null native pointer")]
pub struct NullNativeHandle {
    pub parameter: String,
}

/// Log `error` and unwind with it as the payload.
pub(crate) fn raise<E>(error: E) -> !
where
    E: std::error::Error + Send + 'static,
{
    tracing::error!("{}", error);
    std::panic::panic_any(error)
}
