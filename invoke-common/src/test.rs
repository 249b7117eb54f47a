use strum::IntoEnumIterator;

use crate::basic_type::{BasicType, ErasedShape};
use crate::class_names::{java_source_representation, outermost_class_name, package_name, short_representation};
use crate::primitive::PrimitiveType;
use crate::ref_kinds::ReferenceKind;

#[test]
pub fn widening_is_reflexive() {
    for prim in PrimitiveType::iter() {
        assert!(prim.is_convertible_to(prim));
    }
}

#[test]
pub fn widening_follows_jls() {
    assert!(PrimitiveType::Byte.is_convertible_to(PrimitiveType::Int));
    assert!(PrimitiveType::Char.is_convertible_to(PrimitiveType::Long));
    assert!(PrimitiveType::Int.is_convertible_to(PrimitiveType::Double));
    assert!(!PrimitiveType::Char.is_convertible_to(PrimitiveType::Short));
    assert!(!PrimitiveType::Short.is_convertible_to(PrimitiveType::Char));
    assert!(!PrimitiveType::Long.is_convertible_to(PrimitiveType::Int));
    for prim in PrimitiveType::iter().filter(|prim| *prim != PrimitiveType::Boolean) {
        assert!(!PrimitiveType::Boolean.is_convertible_to(prim));
        assert!(!prim.is_convertible_to(PrimitiveType::Boolean));
    }
}

#[test]
pub fn sub_int_types_erase_to_int() {
    let erased = PrimitiveType::iter().map(|prim| prim.basic_type()).filter(|bt| *bt == BasicType::I).count();
    assert_eq!(erased, 5);
    let shape = ErasedShape { params: vec![BasicType::L, BasicType::J, BasicType::I], ret: BasicType::V };
    assert_eq!(shape.slot_count(), 4);
    assert_eq!(shape.to_string(), "LJI_V");
}

#[test]
pub fn class_name_utilities() {
    assert_eq!(package_name("java/lang/Object"), "java/lang");
    assert_eq!(package_name("Toplevel"), "");
    assert_eq!(outermost_class_name("a/b/Outer$Inner$Deeper"), "a/b/Outer");
    assert_eq!(outermost_class_name("a/b/Plain"), "a/b/Plain");
    assert_eq!(java_source_representation("a/b/Plain"), "a.b.Plain");
    assert_eq!(short_representation("a/b/Plain"), "Plain");
}

#[test]
pub fn reference_kinds_round_trip_through_u8() {
    for kind in ReferenceKind::iter() {
        assert_eq!(ReferenceKind::from_u8(kind as u8), Some(kind));
    }
    assert_eq!(ReferenceKind::from_u8(0), None);
}
