//! Native string buffers
//!
//! A native string is a single heap block: a `usize` byte length, the UTF-8
//! bytes, then a NUL terminator so native code can also treat the data as a
//! C string. The handle that crosses the boundary is the block's address.
//!
//! Ownership rules:
//! - outgoing arguments: the thunk owns a [`NativeString`] for the duration
//!   of the call and frees it when the scope ends, unwinding included;
//! - returned handles: callee-allocated, caller-owned. The thunk converts
//!   them with [`NativeString::take`], which frees the block.
//!
//! Native code allocates and reads compatible blocks through the exported
//! `bridgegen_string_*` functions.

use std::alloc::{self, Layout};
use std::borrow::Cow;
use std::ffi::c_void;
use std::fmt;
use std::mem;
use std::ptr::{self, NonNull};

#[repr(C)]
struct Header {
    len: usize,
}

fn layout_for(len: usize) -> Layout {
    let size = len
        .checked_add(mem::size_of::<Header>() + 1)
        .unwrap_or_else(|| panic!("native string of {} bytes exceeds the address space", len));
    match Layout::from_size_align(size, mem::align_of::<Header>()) {
        Ok(layout) => layout,
        Err(_) => panic!("native string of {} bytes exceeds the address space", len),
    }
}

/// An owned native string block.
pub struct NativeString {
    header: NonNull<Header>,
}

// SAFETY: the block is uniquely owned and never aliased mutably.
unsafe impl Send for NativeString {}
unsafe impl Sync for NativeString {}

impl NativeString {
    pub fn new(value: &str) -> Self {
        Self::from_bytes(value.as_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let layout = layout_for(bytes.len());
        // SAFETY: layout has non-zero size (header plus terminator).
        let raw = unsafe { alloc::alloc(layout) };
        let Some(header) = NonNull::new(raw.cast::<Header>()) else {
            alloc::handle_alloc_error(layout)
        };

        // SAFETY: the block holds the header, `bytes.len()` data bytes and
        // the terminator.
        unsafe {
            header.as_ptr().write(Header { len: bytes.len() });
            let data = raw.add(mem::size_of::<Header>());
            ptr::copy_nonoverlapping(bytes.as_ptr(), data, bytes.len());
            data.add(bytes.len()).write(0);
        }

        Self { header }
    }

    /// Address handed to native code. Stays owned by `self`.
    pub fn as_ptr(&self) -> *mut c_void {
        self.header.as_ptr().cast()
    }

    pub fn len(&self) -> usize {
        // SAFETY: the header was initialized on allocation.
        unsafe { (*self.header.as_ptr()).len }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `len` data bytes follow the header.
        unsafe { std::slice::from_raw_parts(self.data_ptr(), self.len()) }
    }

    /// Native code may write any bytes; invalid UTF-8 is replaced.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    pub fn into_string(self) -> String {
        self.to_string_lossy().into_owned()
    }

    /// Give up ownership; the block must come back through [`Self::from_raw`]
    /// or `bridgegen_string_free`.
    pub fn into_raw(self) -> *mut c_void {
        let raw = self.as_ptr();
        mem::forget(self);
        raw
    }

    /// Take ownership of a block. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a block produced by this module that nothing
    /// else owns.
    pub unsafe fn from_raw(raw: *mut c_void) -> Option<Self> {
        NonNull::new(raw.cast::<Header>()).map(|header| Self { header })
    }

    /// Convert a returned handle into a `String` and free it. Null converts
    /// to an empty string.
    ///
    /// # Safety
    ///
    /// Same contract as [`Self::from_raw`].
    pub unsafe fn take(raw: *mut c_void) -> String {
        unsafe { Self::from_raw(raw) }
            .map(NativeString::into_string)
            .unwrap_or_default()
    }

    fn data_ptr(&self) -> *mut u8 {
        // SAFETY: the data starts right after the header inside the block.
        unsafe { self.header.as_ptr().cast::<u8>().add(mem::size_of::<Header>()) }
    }
}

impl Drop for NativeString {
    fn drop(&mut self) {
        let layout = layout_for(self.len());
        // SAFETY: allocated in `from_bytes` with exactly this layout.
        unsafe { alloc::dealloc(self.header.as_ptr().cast(), layout) }
    }
}

impl From<&str> for NativeString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for NativeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeString")
            .field(&self.to_string_lossy())
            .finish()
    }
}

/// Allocate a string block from `len` bytes at `data`.
///
/// # Safety
///
/// `data` must be valid for reads of `len` bytes, or `len` must be zero.
#[no_mangle]
pub unsafe extern "C" fn bridgegen_string_new(data: *const u8, len: usize) -> *mut c_void {
    let bytes = if len == 0 {
        &[][..]
    } else {
        unsafe { std::slice::from_raw_parts(data, len) }
    };
    NativeString::from_bytes(bytes).into_raw()
}

/// Read the bytes of a block; writes the length to `len` when non-null.
///
/// # Safety
///
/// `handle` must be null or a live block; `len` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn bridgegen_string_data(handle: *mut c_void, len: *mut usize) -> *const u8 {
    let Some(string) = (unsafe { NativeString::from_raw(handle) }) else {
        if !len.is_null() {
            unsafe { len.write(0) };
        }
        return ptr::null();
    };
    if !len.is_null() {
        unsafe { len.write(string.len()) };
    }
    let data = string.data_ptr() as *const u8;
    mem::forget(string);
    data
}

/// Free a block. Null is ignored.
///
/// # Safety
///
/// `handle` must be null or a block nothing else owns.
#[no_mangle]
pub unsafe extern "C" fn bridgegen_string_free(handle: *mut c_void) {
    drop(unsafe { NativeString::from_raw(handle) });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_layout_is_length_prefixed_and_terminated() {
        let s = NativeString::new("abc");
        assert_eq!(s.len(), 3);
        assert_eq!(s.as_bytes(), b"abc");

        let terminator = unsafe { *s.data_ptr().add(3) };
        assert_eq!(terminator, 0);
    }

    #[test]
    fn test_take_null_is_empty() {
        assert_eq!(unsafe { NativeString::take(ptr::null_mut()) }, "");
    }

    #[test]
    fn test_exported_functions_interoperate() {
        let text = "Shader_Compile: 着色器";
        let handle = unsafe { bridgegen_string_new(text.as_ptr(), text.len()) };

        let mut len = 0usize;
        let data = unsafe { bridgegen_string_data(handle, &mut len) };
        let bytes = unsafe { std::slice::from_raw_parts(data, len) };
        assert_eq!(bytes, text.as_bytes());

        assert_eq!(unsafe { NativeString::take(handle) }, text);
    }

    #[test]
    fn test_data_of_null_handle() {
        let mut len = 7usize;
        let data = unsafe { bridgegen_string_data(ptr::null_mut(), &mut len) };
        assert!(data.is_null());
        assert_eq!(len, 0);
        unsafe { bridgegen_string_free(ptr::null_mut()) };
    }

    #[test]
    fn test_invalid_utf8_from_native_is_replaced() {
        let bytes = [b'o', b'k', 0xFF];
        let handle = unsafe { bridgegen_string_new(bytes.as_ptr(), bytes.len()) };
        assert_eq!(unsafe { NativeString::take(handle) }, "ok\u{FFFD}");
    }
}
