//! Property tests for entry-point naming

use bridgegen_core::symbols::{entry_point, MemberSymbols, DEFAULT_THIS_NAME};
use bridgegen_core::{Container, Declaration, TypeRef};
use proptest::prelude::*;

fn ident() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z0-9]{0,12}"
}

proptest! {
    #[test]
    fn method_entry_point_joins_native_names(ty in ident(), member in ident()) {
        let decl = Declaration::method(Container::new(format!("engine::{}", ty)), member.clone());
        prop_assert_eq!(entry_point(&decl), format!("{}_{}", ty, member));
    }

    #[test]
    fn overrides_win_over_declared_names(
        ty in ident(),
        native_ty in ident(),
        member in ident(),
        native_member in ident(),
    ) {
        let container = Container::new(ty).with_native_name(native_ty.clone());
        let decl = Declaration::getter(container, member, TypeRef::Bool)
            .with_native_name(native_member.clone());
        prop_assert_eq!(entry_point(&decl), format!("{}_Get{}", native_ty, native_member));
    }

    #[test]
    fn accessors_never_share_a_slot(ty in ident(), member in ident()) {
        let container = Container::new(ty);
        let getter = Declaration::getter(container.clone(), member.clone(), TypeRef::Bool);
        let setter = Declaration::setter(container, member, TypeRef::Bool);

        let get = MemberSymbols::compute(&getter, DEFAULT_THIS_NAME);
        let set = MemberSymbols::compute(&setter, DEFAULT_THIS_NAME);
        prop_assert_ne!(get.slot, set.slot);
        prop_assert_ne!(get.fn_name, set.fn_name);
    }
}
