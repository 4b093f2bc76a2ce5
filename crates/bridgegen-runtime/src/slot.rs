//! Lazily resolved native function-pointer slots
//!
//! Every generated member owns one `static` [`NativeSlot`]. The slot starts
//! out null and is filled on the first call.
//!
//! The slot is deliberately unsynchronized beyond a single relaxed atomic
//! word. Several threads may race through their first call, each resolving
//! the entry point and storing the address. Resolution is idempotent and the
//! store is a single word, so the losers store the same value the winner
//! did: the worst case is a few redundant lookups, never a torn or wrong
//! address. Do not put a lock here.

use crate::errors::{raise, EntryPointNotFound};
use crate::resolver::{ProcessSymbols, SymbolResolver};
use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicPtr, Ordering};

/// Function-pointer types a slot can hold.
///
/// # Safety
///
/// Implementors must be plain function pointers: pointer-sized, and valid
/// to produce from a code address.
pub unsafe trait NativeFn: Copy + 'static {}

macro_rules! native_fn_impls {
    ($($arg:ident),*) => {
        unsafe impl<Ret: 'static, $($arg: 'static),*> NativeFn for unsafe extern "C" fn($($arg),*) -> Ret {}
        unsafe impl<Ret: 'static, $($arg: 'static),*> NativeFn for unsafe extern "system" fn($($arg),*) -> Ret {}
    };
}

native_fn_impls!();
native_fn_impls!(A1);
native_fn_impls!(A1, A2);
native_fn_impls!(A1, A2, A3);
native_fn_impls!(A1, A2, A3, A4);
native_fn_impls!(A1, A2, A3, A4, A5);
native_fn_impls!(A1, A2, A3, A4, A5, A6);
native_fn_impls!(A1, A2, A3, A4, A5, A6, A7);
native_fn_impls!(A1, A2, A3, A4, A5, A6, A7, A8);
native_fn_impls!(A1, A2, A3, A4, A5, A6, A7, A8, A9);
native_fn_impls!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);
native_fn_impls!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11);
native_fn_impls!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12);

/// Process-lifetime cache of one native entry point, typed with the
/// marshaled signature `F`.
pub struct NativeSlot<F> {
    address: AtomicPtr<c_void>,
    _signature: PhantomData<F>,
}

impl<F> NativeSlot<F> {
    pub const fn new() -> Self {
        Self {
            address: AtomicPtr::new(ptr::null_mut()),
            _signature: PhantomData,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.address.load(Ordering::Relaxed).is_null()
    }

    /// The cached address, if a call has resolved it yet.
    pub fn address(&self) -> Option<NonNull<c_void>> {
        NonNull::new(self.address.load(Ordering::Relaxed))
    }
}

impl<F: NativeFn> NativeSlot<F> {
    /// Return the native function, resolving it against the running process
    /// on first use.
    ///
    /// Raises [`EntryPointNotFound`] as a panic payload when the symbol is
    /// missing. Failure is not cached.
    pub fn get_or_resolve(&self, entry_point: &str) -> F {
        match self.try_resolve_with(&ProcessSymbols, entry_point) {
            Ok(function) => function,
            Err(err) => raise(err),
        }
    }

    pub fn try_resolve_with<R>(&self, resolver: &R, entry_point: &str) -> Result<F, EntryPointNotFound>
    where
        R: SymbolResolver + ?Sized,
    {
        let mut address = self.address.load(Ordering::Relaxed);
        if address.is_null() {
            let resolved = resolver
                .resolve(entry_point)
                .ok_or_else(|| EntryPointNotFound::new(entry_point))?;
            address = resolved.as_ptr();
            self.address.store(address, Ordering::Relaxed);
        }

        // SAFETY: `F: NativeFn` is a pointer-sized function pointer, and the
        // address came from a resolver for an entry point with signature `F`.
        Ok(unsafe { std::mem::transmute_copy::<*mut c_void, F>(&address) })
    }
}

impl<F> Default for NativeSlot<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> fmt::Debug for NativeSlot<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeSlot")
            .field("address", &self.address.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::atomic::AtomicUsize;

    type AddFn = unsafe extern "C" fn(i32, i32) -> i32;

    unsafe extern "C" fn native_add(a: i32, b: i32) -> i32 {
        a + b
    }

    struct TableResolver {
        symbols: HashMap<&'static str, NonNull<c_void>>,
        lookups: AtomicUsize,
    }

    impl TableResolver {
        fn new() -> Self {
            let add = native_add as AddFn as *mut c_void;
            let mut symbols = HashMap::new();
            symbols.insert("Math_Add", NonNull::new(add).unwrap());
            Self {
                symbols,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    impl SymbolResolver for TableResolver {
        fn resolve(&self, entry_point: &str) -> Option<NonNull<c_void>> {
            self.lookups.fetch_add(1, Ordering::Relaxed);
            self.symbols.get(entry_point).copied()
        }
    }

    // SAFETY: lookups only read the table.
    unsafe impl Sync for TableResolver {}

    #[test]
    fn test_slot_starts_unresolved() {
        let slot: NativeSlot<AddFn> = NativeSlot::new();
        assert!(!slot.is_resolved());
        assert_eq!(slot.address(), None);
    }

    #[test]
    fn test_resolves_once_then_caches() {
        let resolver = TableResolver::new();
        let slot: NativeSlot<AddFn> = NativeSlot::new();

        let add = slot.try_resolve_with(&resolver, "Math_Add").unwrap();
        assert_eq!(unsafe { add(40, 2) }, 42);

        let again = slot.try_resolve_with(&resolver, "Math_Add").unwrap();
        assert_eq!(unsafe { again(1, 2) }, 3);
        assert_eq!(resolver.lookups.load(Ordering::Relaxed), 1);
        assert!(slot.is_resolved());
    }

    #[test]
    fn test_failure_is_not_cached() {
        let resolver = TableResolver::new();
        let slot: NativeSlot<AddFn> = NativeSlot::new();

        for _ in 0..3 {
            let err = slot.try_resolve_with(&resolver, "Math_Sub").unwrap_err();
            assert_eq!(err.entry_point, "Math_Sub");
        }
        assert_eq!(resolver.lookups.load(Ordering::Relaxed), 3);
        assert!(!slot.is_resolved());
    }

    #[test]
    fn test_racing_first_calls_agree() {
        static SLOT: NativeSlot<AddFn> = NativeSlot::new();
        let resolver = TableResolver::new();
        let expected = resolver.symbols["Math_Add"];

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let add = SLOT.try_resolve_with(&resolver, "Math_Add").unwrap();
                    assert_eq!(unsafe { add(2, 3) }, 5);
                });
            }
        });

        assert_eq!(SLOT.address(), Some(expected));
        let lookups = resolver.lookups.load(Ordering::Relaxed);
        assert!((1..=8).contains(&lookups));
    }

    #[test]
    fn test_missing_process_symbol_is_fatal_every_time() {
        let slot: NativeSlot<unsafe extern "C" fn()> = NativeSlot::new();

        for _ in 0..2 {
            let payload = catch_unwind(AssertUnwindSafe(|| {
                slot.get_or_resolve("Camera_GetDefinitelyNotExported");
            }))
            .unwrap_err();
            let err = payload.downcast_ref::<EntryPointNotFound>().unwrap();
            assert_eq!(err.entry_point, "Camera_GetDefinitelyNotExported");
        }
        assert!(!slot.is_resolved());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_resolves_from_the_process_image() {
        let slot: NativeSlot<unsafe extern "C" fn(*const std::ffi::c_char) -> usize> =
            NativeSlot::new();
        let strlen = slot.get_or_resolve("strlen");
        assert_eq!(unsafe { strlen(c"thunk".as_ptr()) }, 5);
        assert_eq!(slot.address(), ProcessSymbols.resolve("strlen"));
    }
}
