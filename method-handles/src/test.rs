use std::sync::Arc;

use itertools::Itertools;
use strum::IntoEnumIterator;

use invoke_common::primitive::PrimitiveType;
use runtime_classes::types::JType;
use runtime_classes::value::Value;

use crate::conversions::{plan_conversion, ValueConversion};
use crate::error::InvokeError;
use crate::method_handles::{constant, identity, insert_arguments, permute_arguments};
use crate::method_type::MethodType;
use crate::thunks::{thunk_cache_stats, thunk_for, ThunkKey, VariantTag};
use crate::comparator::structurally_equivalent;

#[test]
pub fn method_types_are_interned() {
    let a = MethodType::of(JType::INT, vec![JType::string(), JType::LONG]).unwrap();
    let b = MethodType::of(JType::INT, vec![JType::string(), JType::LONG]).unwrap();
    assert_eq!(a, b);
    let via_insert = MethodType::of(JType::INT, vec![JType::LONG]).unwrap().insert_parameter_types(0, &[JType::string()]).unwrap();
    assert_eq!(a, via_insert);
    assert!(MethodType::interned_count() >= 2);
    assert_eq!(a.parameter_slot_count(), 3);
    assert_eq!(a.erased_shape().to_string(), "LJ_I");
    assert_eq!(a.to_string(), "(String,long)int");
}

#[test]
pub fn malformed_method_types_are_rejected() {
    assert!(matches!(MethodType::of(JType::VOID, vec![JType::VOID]), Err(InvokeError::InvalidSignature(_))));
    assert!(MethodType::of(JType::VOID, vec![JType::INT; 255]).is_ok());
    assert!(matches!(MethodType::of(JType::VOID, vec![JType::INT; 256]), Err(InvokeError::InvalidSignature(_))));
    assert!(matches!(MethodType::of(JType::VOID, vec![JType::LONG; 128]), Err(InvokeError::InvalidSignature(_))));
    let two = MethodType::of(JType::VOID, vec![JType::INT, JType::INT]).unwrap();
    assert!(matches!(two.change_parameter_type(2, JType::LONG), Err(InvokeError::InvalidSignature(_))));
    assert!(matches!(two.drop_parameter_types(1, 3), Err(InvokeError::InvalidSignature(_))));
    assert!(matches!(two.insert_parameter_types(3, &[JType::INT]), Err(InvokeError::InvalidSignature(_))));
}

#[test]
pub fn wrap_and_unwrap_are_inverse_on_primitives() {
    let prims = MethodType::of(JType::DOUBLE, vec![JType::INT, JType::BOOLEAN]).unwrap();
    let wrapped = prims.wrap().unwrap();
    assert!(wrapped.has_wrappers());
    assert!(!wrapped.has_primitives());
    assert_eq!(wrapped.unwrap().unwrap(), prims);
    assert_eq!(prims.generic_type().unwrap(), MethodType::generic(2).unwrap());
}

#[test]
pub fn conversion_planning() {
    assert_eq!(plan_conversion(&JType::INT, &JType::LONG), Some(ValueConversion::Widen(PrimitiveType::Long)));
    assert_eq!(plan_conversion(&JType::LONG, &JType::INT), None);
    assert_eq!(plan_conversion(&JType::INT, &JType::object()), Some(ValueConversion::Box(PrimitiveType::Int)));
    assert_eq!(plan_conversion(&JType::INT, &JType::string()), None);
    assert_eq!(plan_conversion(&JType::object(), &JType::INT), Some(ValueConversion::Unbox(PrimitiveType::Int)));
    assert_eq!(plan_conversion(&JType::wrapper_type(PrimitiveType::Long), &JType::INT), None);
    assert_eq!(plan_conversion(&JType::string(), &JType::object()), Some(ValueConversion::NoOp));
    assert_eq!(plan_conversion(&JType::object(), &JType::string()), Some(ValueConversion::CheckCast(JType::string())));
    assert_eq!(plan_conversion(&JType::VOID, &JType::INT), Some(ValueConversion::ZeroForVoid(JType::INT)));
    assert_eq!(plan_conversion(&JType::INT, &JType::VOID), Some(ValueConversion::Discard));
}

#[test]
pub fn variant_tags_have_distinct_names() {
    let names = VariantTag::iter().map(|tag| tag.to_string()).unique().count();
    assert_eq!(names, VariantTag::iter().count());
    assert_eq!(VariantTag::GuardWithTest.to_string(), "GuardWithTest");
}

#[test]
pub fn inserting_nothing_returns_target() {
    let id = identity(&JType::INT).unwrap();
    assert!(insert_arguments(&id, 0, vec![]).unwrap().is_same_handle(&id));
    let bound = insert_arguments(&id, 0, vec![Value::Int(7)]).unwrap();
    assert_eq!(bound.type_().parameter_count(), 0);
    assert_eq!(bound.invoke_exact(vec![]).unwrap().unwrap_int(), 7);
}

#[test]
pub fn equivalent_shapes_share_thunks() {
    let int_identity = identity(&JType::INT).unwrap();
    let other_int_identity = identity(&JType::INT).unwrap();
    let short_identity = identity(&JType::SHORT).unwrap();
    assert_eq!(ThunkKey::for_handle(&int_identity), ThunkKey::for_handle(&short_identity));
    let a = thunk_for(&int_identity).unwrap();
    let b = thunk_for(&other_int_identity).unwrap();
    let c = thunk_for(&short_identity).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &c));
    assert!(thunk_cache_stats().compilations >= 1);
    let string_identity = identity(&JType::string()).unwrap();
    assert_ne!(ThunkKey::for_handle(&int_identity), ThunkKey::for_handle(&string_identity));
}

#[test]
pub fn nested_permutations_collapse() {
    let three = MethodType::of(JType::INT, vec![JType::INT, JType::INT, JType::INT]).unwrap();
    let pick_first = permute_arguments(&identity(&JType::INT).unwrap(), &three, vec![0]).unwrap();
    let rotated = permute_arguments(&pick_first, &three, vec![2, 0, 1]).unwrap();
    match rotated.kind() {
        crate::handle::HandleKind::Permute { target, reorder } => {
            assert!(matches!(target.kind(), crate::handle::HandleKind::Identity));
            assert_eq!(reorder, &vec![2]);
        }
        other => panic!("expected a permute, got {}", other.tag())
    }
    let args = vec![Value::Int(1), Value::Int(2), Value::Int(3)];
    assert_eq!(rotated.invoke_exact(args).unwrap().unwrap_int(), 3);
}

#[test]
pub fn permuting_a_retyped_permutation() {
    let objects = MethodType::of(JType::object(), vec![JType::object(), JType::object()]).unwrap();
    let strings = MethodType::of(JType::object(), vec![JType::string(), JType::string()]).unwrap();
    let second = permute_arguments(&identity(&JType::object()).unwrap(), &objects, vec![1]).unwrap();
    let narrowed = second.as_type(&strings).unwrap();
    assert!(matches!(narrowed.kind(), crate::handle::HandleKind::Permute { .. }));
    let swapped = permute_arguments(&narrowed, &strings, vec![1, 0]).unwrap();
    assert_eq!(swapped.type_(), &strings);
    match swapped.kind() {
        crate::handle::HandleKind::Permute { target, reorder } => {
            assert!(matches!(target.kind(), crate::handle::HandleKind::Identity));
            assert_eq!(reorder, &vec![0]);
        }
        other => panic!("expected a permute, got {}", other.tag())
    }
    let res = swapped.invoke_exact(vec![Value::string("a"), Value::string("b")]).unwrap();
    assert_eq!(res.unwrap_string(), "a");
    let unswapped = permute_arguments(&swapped, &strings, vec![1, 0]).unwrap();
    assert_eq!(unswapped.invoke_exact(vec![Value::string("a"), Value::string("b")]).unwrap().unwrap_string(), "b");
}

#[test]
pub fn identity_permutation_returns_target() {
    let int_to_int = MethodType::of(JType::INT, vec![JType::INT]).unwrap();
    let id = identity(&JType::INT).unwrap();
    let same = permute_arguments(&id, &int_to_int, vec![0]).unwrap();
    assert!(same.is_same_handle(&id));
}

#[test]
pub fn constants_compare_by_value() {
    let a = constant(&JType::string(), Value::string("x")).unwrap();
    let b = constant(&JType::string(), Value::string("x")).unwrap();
    let c = constant(&JType::string(), Value::string("y")).unwrap();
    assert!(structurally_equivalent(&a, &b));
    assert!(!structurally_equivalent(&a, &c));
    let boxed = constant(&JType::object(), Value::Int(3)).unwrap();
    assert!(boxed.invoke_exact(vec![]).unwrap().unboxed().unwrap().value_equals(&Value::Int(3)));
}
