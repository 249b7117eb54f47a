use std::sync::Arc;

use crate::handle::{HandleKind, MethodHandle};

fn all_equivalent<'l>(a: impl ExactSizeIterator<Item=&'l MethodHandle>, b: impl ExactSizeIterator<Item=&'l MethodHandle>) -> bool {
    a.len() == b.len() && a.zip(b).all(|(a, b)| structurally_equivalent(a, b))
}

/// Whether two handles would behave identically: same variant, same signature, equal scalar
/// parameters and recursively equivalent children. Bound values compare by value.
pub fn structurally_equivalent(a: &MethodHandle, b: &MethodHandle) -> bool {
    if a.is_same_handle(b) {
        return true;
    }
    if a.type_() != b.type_() {
        return false;
    }
    match (a.kind(), b.kind()) {
        (HandleKind::Direct { method: a_method, mode: a_mode }, HandleKind::Direct { method: b_method, mode: b_mode }) => {
            a_method.is_same_method(b_method) && a_mode == b_mode
        }
        (HandleKind::Virtual { method: a_method, dispatch_class: a_class, interface: a_interface },
            HandleKind::Virtual { method: b_method, dispatch_class: b_class, interface: b_interface }) => {
            a_method.is_same_method(b_method) && Arc::ptr_eq(a_class, b_class) && a_interface == b_interface
        }
        (HandleKind::FieldGetter { field: a_field, is_static: a_static, access: a_access },
            HandleKind::FieldGetter { field: b_field, is_static: b_static, access: b_access }) |
        (HandleKind::FieldSetter { field: a_field, is_static: a_static, access: a_access },
            HandleKind::FieldSetter { field: b_field, is_static: b_static, access: b_access }) => {
            a_field.is_same_field(b_field) && a_static == b_static && std::ptr::eq(Arc::as_ptr(a_access) as *const u8, Arc::as_ptr(b_access) as *const u8)
        }
        (HandleKind::Insert { target: a_target, pos: a_pos, values: a_values },
            HandleKind::Insert { target: b_target, pos: b_pos, values: b_values }) => {
            a_pos == b_pos &&
                a_values.len() == b_values.len() &&
                a_values.iter().zip(b_values.iter()).all(|(a, b)| a.value_equals(b)) &&
                structurally_equivalent(a_target, b_target)
        }
        (HandleKind::Permute { target: a_target, reorder: a_reorder }, HandleKind::Permute { target: b_target, reorder: b_reorder }) => {
            a_reorder == b_reorder && structurally_equivalent(a_target, b_target)
        }
        (HandleKind::Collect { target: a_target, pos: a_pos, count: a_count, array_type: a_array },
            HandleKind::Collect { target: b_target, pos: b_pos, count: b_count, array_type: b_array }) |
        (HandleKind::Spread { target: a_target, pos: a_pos, count: a_count, array_type: a_array },
            HandleKind::Spread { target: b_target, pos: b_pos, count: b_count, array_type: b_array }) => {
            a_pos == b_pos && a_count == b_count && a_array == b_array && structurally_equivalent(a_target, b_target)
        }
        (HandleKind::FilterArguments { target: a_target, pos: a_pos, filters: a_filters },
            HandleKind::FilterArguments { target: b_target, pos: b_pos, filters: b_filters }) => {
            a_pos == b_pos &&
                a_filters.len() == b_filters.len() &&
                a_filters.iter().zip(b_filters.iter()).all(|(a, b)| match (a, b) {
                    (None, None) => true,
                    (Some(a), Some(b)) => structurally_equivalent(a, b),
                    _ => false
                }) &&
                structurally_equivalent(a_target, b_target)
        }
        (HandleKind::FilterReturn { target: a_target, filter: a_filter }, HandleKind::FilterReturn { target: b_target, filter: b_filter }) => {
            all_equivalent([a_target, a_filter].into_iter(), [b_target, b_filter].into_iter())
        }
        (HandleKind::Fold { target: a_target, pos: a_pos, combiner: a_combiner }, HandleKind::Fold { target: b_target, pos: b_pos, combiner: b_combiner }) => {
            a_pos == b_pos && all_equivalent([a_target, a_combiner].into_iter(), [b_target, b_combiner].into_iter())
        }
        (HandleKind::GuardWithTest { test: a_test, target: a_target, fallback: a_fallback },
            HandleKind::GuardWithTest { test: b_test, target: b_target, fallback: b_fallback }) => {
            all_equivalent([a_test, a_target, a_fallback].into_iter(), [b_test, b_target, b_fallback].into_iter())
        }
        (HandleKind::Catch { target: a_target, exception_class: a_class, handler: a_handler },
            HandleKind::Catch { target: b_target, exception_class: b_class, handler: b_handler }) => {
            Arc::ptr_eq(a_class, b_class) && all_equivalent([a_target, a_handler].into_iter(), [b_target, b_handler].into_iter())
        }
        (HandleKind::Convert { target: a_target, args: a_args, ret: a_ret }, HandleKind::Convert { target: b_target, args: b_args, ret: b_ret }) => {
            a_args == b_args && a_ret == b_ret && structurally_equivalent(a_target, b_target)
        }
        (HandleKind::Constant { value: a_value }, HandleKind::Constant { value: b_value }) => a_value.value_equals(b_value),
        (HandleKind::Identity, HandleKind::Identity) => true,
        (HandleKind::Throw, HandleKind::Throw) => true,
        (HandleKind::VarargsCollector { target: a_target, array_type: a_array, .. },
            HandleKind::VarargsCollector { target: b_target, array_type: b_array, .. }) => {
            a_array == b_array && structurally_equivalent(a_target, b_target)
        }
        (HandleKind::DynamicInvoker { site: a_site }, HandleKind::DynamicInvoker { site: b_site }) => a_site.is_same_site(b_site),
        (HandleKind::Unlinked { message: a_message }, HandleKind::Unlinked { message: b_message }) => a_message == b_message,
        _ => false
    }
}
