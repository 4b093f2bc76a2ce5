//! Bridgegen Runtime Library
//!
//! This crate provides the run-time contract that bridgegen-generated
//! thunks are written against:
//!
//! - **NativeSlot**: per-member lazily resolved function pointer
//! - **ProcessSymbols**: entry-point lookup against the running process
//! - **NativeString**: length-prefixed UTF-8 buffers shared with native code
//! - **NativeHandle**: managed objects wrapping a native pointer
//! - **Fatal errors**: `EntryPointNotFound` and `NullNativeHandle`
//!
//! # Example
//!
//! ```rust,ignore
//! include!(concat!(env!("OUT_DIR"), "/Camera_binding.rs"));
//!
//! let camera = Camera::new();
//! camera.set_enabled(true); // resolves `Camera_SetEnabled` on first call
//! ```

mod boolean;
mod errors;
mod handle;
mod resolver;
mod slot;
mod string;

pub use boolean::{bool_from_native, bool_to_native, NativeBool};
pub use errors::{EntryPointNotFound, NullNativeHandle};
pub use handle::{handle_ptr, nullable_handle_ptr, NativeHandle};
pub use resolver::{ProcessSymbols, SymbolResolver};
pub use slot::{NativeFn, NativeSlot};
pub use string::{bridgegen_string_data, bridgegen_string_free, bridgegen_string_new, NativeString};
