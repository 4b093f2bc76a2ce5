//! Booleans cross the boundary as 4-byte integers.

pub type NativeBool = i32;

#[inline]
pub fn bool_to_native(value: bool) -> NativeBool {
    NativeBool::from(value)
}

/// Any non-zero value is `true`.
#[inline]
pub fn bool_from_native(value: NativeBool) -> bool {
    value != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_representation() {
        assert_eq!(bool_to_native(true), 1);
        assert_eq!(bool_to_native(false), 0);
        assert!(bool_from_native(-1));
        assert!(!bool_from_native(0));
    }
}
