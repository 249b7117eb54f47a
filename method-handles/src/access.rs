use invoke_common::access_flags::{HasAccessFlags, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC, ALL_ACCESS_MODIFIERS};
use runtime_classes::instance_of::is_subclass_of;
use runtime_classes::types::JType;
use runtime_classes::visibility::ClassVisibility;
use runtime_classes::RuntimeClass;

use crate::method_type::MethodType;

pub const PUBLIC: u8 = 0x01;
pub const PRIVATE: u8 = 0x02;
pub const PROTECTED: u8 = 0x04;
pub const PACKAGE: u8 = 0x08;
pub const ALL_MODES: u8 = PUBLIC | PRIVATE | PROTECTED | PACKAGE;

const PACKAGE_ALLOWED: u8 = PACKAGE;
const PROTECTED_OR_PACKAGE_ALLOWED: u8 = PACKAGE_ALLOWED | PROTECTED;

pub fn is_class_accessible(visibility: &dyn ClassVisibility, ref_class: &RuntimeClass, lookup_class: &RuntimeClass, allowed_modes: u8) -> bool {
    if allowed_modes == 0 {
        return false;
    }
    if ref_class.is_public() {
        return true;
    }
    allowed_modes & PACKAGE_ALLOWED != 0 && visibility.is_same_package(lookup_class, ref_class)
}

/// Nest-mates: same loader and same outermost class.
pub fn is_same_package_member(visibility: &dyn ClassVisibility, a: &RuntimeClass, b: &RuntimeClass) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    visibility.is_same_package(a, b) && a.outermost_class_name() == b.outermost_class_name()
}

fn is_related_class(a: &RuntimeClass, b: &RuntimeClass) -> bool {
    std::ptr::eq(a, b) || is_subclass_of(a, b) || is_subclass_of(b, a)
}

/// Whether a member declared in `def_class` with modifiers `mods`, referenced through `ref_class`,
/// is accessible from `lookup_class` with the given lookup modes.
pub fn is_member_accessible(visibility: &dyn ClassVisibility, ref_class: &RuntimeClass, def_class: &RuntimeClass, mods: u16, lookup_class: &RuntimeClass, allowed_modes: u8) -> bool {
    if allowed_modes == 0 {
        return false;
    }
    if !is_class_accessible(visibility, ref_class, lookup_class, allowed_modes) {
        return false;
    }
    if std::ptr::eq(def_class, lookup_class) && allowed_modes & PRIVATE != 0 {
        return true;
    }
    match mods & ALL_ACCESS_MODIFIERS {
        ACC_PUBLIC => true,
        ACC_PROTECTED => {
            if allowed_modes & PROTECTED_OR_PACKAGE_ALLOWED != 0 && visibility.is_same_package(def_class, lookup_class) {
                return true;
            }
            if allowed_modes & PROTECTED == 0 {
                return false;
            }
            if mods & ACC_STATIC != 0 && !is_related_class(ref_class, lookup_class) {
                return false;
            }
            is_subclass_of(lookup_class, def_class)
        }
        ACC_PRIVATE => allowed_modes & PRIVATE != 0 && is_same_package_member(visibility, def_class, lookup_class),
        0 => allowed_modes & PACKAGE_ALLOWED != 0 && visibility.is_same_package(def_class, lookup_class),
        _ => false
    }
}

/// Every class named by `ty` must come from `ref_class`'s loader or one of its ancestors.
pub fn is_type_visible(visibility: &dyn ClassVisibility, ty: &JType, ref_class: &RuntimeClass) -> bool {
    match ty.element_class() {
        None => true,
        Some(class) => visibility.is_ancestor_loader(visibility.class_loader_of(class), visibility.class_loader_of(ref_class))
    }
}

pub fn is_signature_visible(visibility: &dyn ClassVisibility, method_type: &MethodType, ref_class: &RuntimeClass) -> bool {
    is_type_visible(visibility, method_type.rtype(), ref_class) &&
        method_type.ptypes().iter().all(|ptype| is_type_visible(visibility, ptype, ref_class))
}
