//! Managed objects whose payload is a native pointer.

use crate::errors::{raise, NullNativeHandle};
use std::ffi::c_void;
use std::ptr;

/// A managed wrapper around a native object.
///
/// Instance members pass `native_ptr()` as the receiver; parameters typed
/// as native objects pass it as the argument.
pub trait NativeHandle {
    fn native_ptr(&self) -> *mut c_void;
}

impl<T: NativeHandle + ?Sized> NativeHandle for &T {
    fn native_ptr(&self) -> *mut c_void {
        (**self).native_ptr()
    }
}

/// Extract the native pointer of an object that must be live.
///
/// A null pointer raises [`NullNativeHandle`] before the native call is
/// made, instead of letting the callee fault on it.
pub fn handle_ptr<T: NativeHandle + ?Sized>(object: &T, parameter: &str) -> *mut c_void {
    let native = object.native_ptr();
    if native.is_null() {
        raise(NullNativeHandle {
            parameter: parameter.to_string(),
        });
    }
    native
}

/// Extract the native pointer of an optional object; `None` maps to null.
pub fn nullable_handle_ptr<T: NativeHandle + ?Sized>(object: Option<&T>) -> *mut c_void {
    object.map_or(ptr::null_mut(), |object| object.native_ptr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::catch_unwind;

    struct Texture {
        native: *mut c_void,
    }

    impl NativeHandle for Texture {
        fn native_ptr(&self) -> *mut c_void {
            self.native
        }
    }

    fn live() -> Texture {
        Texture {
            native: 0x1000 as *mut c_void,
        }
    }

    #[test]
    fn test_live_handle() {
        let texture = live();
        assert_eq!(handle_ptr(&texture, "texture"), 0x1000 as *mut c_void);
    }

    #[test]
    fn test_null_handle_is_rejected() {
        let payload = catch_unwind(|| {
            let texture = Texture {
                native: ptr::null_mut(),
            };
            handle_ptr(&texture, "texture");
        })
        .unwrap_err();
        let err = payload.downcast_ref::<NullNativeHandle>().unwrap();
        assert_eq!(err.parameter, "texture");
    }

    #[test]
    fn test_nullable_handle() {
        let texture = live();
        assert_eq!(nullable_handle_ptr(Some(&texture)), 0x1000 as *mut c_void);
        assert!(nullable_handle_ptr::<Texture>(None).is_null());
    }
}
