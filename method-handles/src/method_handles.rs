use std::sync::Arc;

use runtime_classes::bootstrap::bootstrap;
use runtime_classes::instance_of::{is_assignable, is_subclass_of};
use runtime_classes::types::JType;
use runtime_classes::value::Value;
use runtime_classes::RuntimeClass;

use crate::conversions::coerce_value;
use crate::error::InvokeError;
use crate::handle::{HandleKind, MethodHandle};
use crate::method_type::MethodType;

fn incompatible(message: String) -> InvokeError {
    InvokeError::IncompatibleSignature(message)
}

/// Binds `values` to the parameters starting at `pos`. Values are converted to the parameter
/// types the way a cast or unboxing would.
pub fn insert_arguments(target: &MethodHandle, pos: usize, values: Vec<Value>) -> Result<MethodHandle, InvokeError> {
    let old_type = target.type_();
    if pos + values.len() > old_type.parameter_count() {
        return Err(InvokeError::InvalidSignature(format!("cannot insert {} values at {} into {}", values.len(), pos, old_type)));
    }
    let values = values.into_iter().zip(old_type.ptypes()[pos..].iter())
        .map(|(value, ptype)| coerce_value(value, ptype).map_err(|err| InvokeError::TypeMismatch(format!("cannot bind to {}: {}", ptype, err))))
        .collect::<Result<Vec<_>, _>>()?;
    if values.is_empty() {
        return Ok(target.clone());
    }
    let new_type = old_type.drop_parameter_types(pos, pos + values.len())?;
    Ok(MethodHandle::new(new_type, HandleKind::Insert { target: target.clone(), pos, values }))
}

/// Adds ignored parameters of the given types at `pos`.
pub fn drop_arguments(target: &MethodHandle, pos: usize, types: &[JType]) -> Result<MethodHandle, InvokeError> {
    let old_type = target.type_();
    if types.is_empty() {
        return Ok(target.clone());
    }
    let new_type = old_type.insert_parameter_types(pos, types)?;
    let reorder = (0..old_type.parameter_count())
        .map(|i| if i < pos { i } else { i + types.len() })
        .collect();
    permute_arguments(target, &new_type, reorder)
}

/// Routes incoming arguments of `new_type` to `target`: target argument `i` receives incoming
/// argument `reorder[i]`. Arguments may be duplicated or dropped.
pub fn permute_arguments(target: &MethodHandle, new_type: &MethodType, reorder: Vec<usize>) -> Result<MethodHandle, InvokeError> {
    let old_type = target.type_();
    if reorder.len() != old_type.parameter_count() {
        return Err(InvokeError::InvalidSignature(format!("reorder length {} does not match {}", reorder.len(), old_type)));
    }
    if new_type.rtype() != old_type.rtype() {
        return Err(incompatible(format!("return types differ: {} vs {}", new_type, old_type)));
    }
    for (i, &incoming) in reorder.iter().enumerate() {
        if incoming >= new_type.parameter_count() {
            return Err(InvokeError::InvalidSignature(format!("reorder index {} out of range for {}", incoming, new_type)));
        }
        if new_type.ptype(incoming) != old_type.ptype(i) {
            return Err(incompatible(format!("parameter {} of {} does not match {}", incoming, new_type, old_type.ptype(i))));
        }
    }
    if new_type == old_type && reorder.iter().enumerate().all(|(i, &incoming)| i == incoming) {
        return Ok(target.clone());
    }
    if let HandleKind::Permute { target: inner_target, reorder: inner_reorder } = target.kind() {
        // The outer reorder was checked against `target`, whose type may be a narrowed re-typing of
        // the inner permute. Build the collapsed node directly instead of re-checking exact types.
        let combined: Vec<usize> = inner_reorder.iter().map(|&j| reorder[j]).collect();
        let is_identity = combined.len() == new_type.parameter_count()
            && combined.iter().enumerate().all(|(i, &incoming)| i == incoming);
        if is_identity {
            return if new_type == inner_target.type_() {
                Ok(inner_target.clone())
            } else {
                inner_target.clone_with_new_type(new_type)
            };
        }
        return Ok(MethodHandle::new(new_type.clone(), HandleKind::Permute { target: inner_target.clone(), reorder: combined }));
    }
    Ok(MethodHandle::new(new_type.clone(), HandleKind::Permute { target: target.clone(), reorder }))
}

/// Applies unary filters to the arguments starting at `pos`. `None` leaves an argument alone.
pub fn filter_arguments(target: &MethodHandle, pos: usize, filters: Vec<Option<MethodHandle>>) -> Result<MethodHandle, InvokeError> {
    let old_type = target.type_();
    if pos + filters.len() > old_type.parameter_count() {
        return Err(InvokeError::InvalidSignature(format!("too many filters for {}", old_type)));
    }
    let mut new_type = old_type.clone();
    for (i, filter) in filters.iter().enumerate() {
        if let Some(filter) = filter {
            let filter_type = filter.type_();
            if filter_type.parameter_count() != 1 || filter_type.rtype() != old_type.ptype(pos + i) {
                return Err(incompatible(format!("filter {} cannot feed parameter {} of {}", filter_type, pos + i, old_type)));
            }
            new_type = new_type.change_parameter_type(pos + i, filter_type.ptype(0).clone())?;
        }
    }
    if filters.iter().all(|filter| filter.is_none()) {
        return Ok(target.clone());
    }
    Ok(MethodHandle::new(new_type, HandleKind::FilterArguments { target: target.clone(), pos, filters }))
}

/// Passes the target's result (nothing, for void) through `filter`.
pub fn filter_return_value(target: &MethodHandle, filter: &MethodHandle) -> Result<MethodHandle, InvokeError> {
    let old_type = target.type_();
    let filter_type = filter.type_();
    let fits = if old_type.rtype().is_void() {
        filter_type.parameter_count() == 0
    } else {
        filter_type.parameter_count() == 1 && filter_type.ptype(0) == old_type.rtype()
    };
    if !fits {
        return Err(incompatible(format!("filter {} cannot take the result of {}", filter_type, old_type)));
    }
    let new_type = old_type.change_return_type(filter_type.rtype().clone())?;
    Ok(MethodHandle::new(new_type, HandleKind::FilterReturn { target: target.clone(), filter: filter.clone() }))
}

/// Runs `combiner` over the arguments at `pos` and, unless it returns void, passes its result to
/// `target` at `pos` ahead of them.
pub fn fold_arguments(target: &MethodHandle, pos: usize, combiner: &MethodHandle) -> Result<MethodHandle, InvokeError> {
    let old_type = target.type_();
    let combiner_type = combiner.type_();
    let folds_value = !combiner_type.rtype().is_void();
    let skip = folds_value as usize;
    let consumed = combiner_type.parameter_count();
    if pos + skip + consumed > old_type.parameter_count() {
        return Err(incompatible(format!("combiner {} does not fit {} at {}", combiner_type, old_type, pos)));
    }
    if folds_value && old_type.ptype(pos) != combiner_type.rtype() {
        return Err(incompatible(format!("combiner result {} does not match parameter {} of {}", combiner_type.rtype(), pos, old_type)));
    }
    if combiner_type.ptypes() != &old_type.ptypes()[pos + skip..pos + skip + consumed] {
        return Err(incompatible(format!("combiner {} does not match the arguments of {}", combiner_type, old_type)));
    }
    let new_type = if folds_value { old_type.drop_parameter_types(pos, pos + 1)? } else { old_type.clone() };
    Ok(MethodHandle::new(new_type, HandleKind::Fold { target: target.clone(), pos, combiner: combiner.clone() }))
}

/// Replaces parameter `pos` by the parameters of `filter`, whose result (if any) is passed on.
pub fn collect_arguments(target: &MethodHandle, pos: usize, filter: &MethodHandle) -> Result<MethodHandle, InvokeError> {
    let filter_type = filter.type_();
    let filter_params = filter_type.ptypes();
    if filter_type.rtype().is_void() {
        let widened = drop_arguments(target, pos, filter_params)?;
        fold_arguments(&widened, pos, filter)
    } else {
        let widened = drop_arguments(target, pos + 1, filter_params)?;
        fold_arguments(&widened, pos, filter)
    }
}

pub fn guard_with_test(test: &MethodHandle, target: &MethodHandle, fallback: &MethodHandle) -> Result<MethodHandle, InvokeError> {
    let target_type = target.type_();
    let test_type = test.type_();
    if target_type != fallback.type_() {
        return Err(incompatible(format!("target {} and fallback {} differ", target_type, fallback.type_())));
    }
    if test_type.rtype() != &JType::BOOLEAN {
        return Err(incompatible(format!("test {} does not return boolean", test_type)));
    }
    let test_arity = test_type.parameter_count();
    if test_arity > target_type.parameter_count() || test_type.ptypes() != &target_type.ptypes()[..test_arity] {
        return Err(incompatible(format!("test {} is not a prefix of {}", test_type, target_type)));
    }
    Ok(MethodHandle::new(target_type.clone(), HandleKind::GuardWithTest {
        test: test.clone(),
        target: target.clone(),
        fallback: fallback.clone(),
    }))
}

/// Invokes `handler` with the exception and a prefix of the arguments when `target` raises an
/// instance of `exception_class`.
pub fn catch_exception(target: &MethodHandle, exception_class: &Arc<RuntimeClass>, handler: &MethodHandle) -> Result<MethodHandle, InvokeError> {
    let target_type = target.type_();
    let handler_type = handler.type_();
    if !is_subclass_of(exception_class, &bootstrap().throwable) {
        return Err(incompatible(format!("{} is not a throwable", exception_class.name())));
    }
    if handler_type.rtype() != target_type.rtype() {
        return Err(incompatible(format!("handler {} and target {} return differently", handler_type, target_type)));
    }
    let handler_arity = handler_type.parameter_count();
    if handler_arity == 0 || !is_assignable(&JType::class(exception_class), handler_type.ptype(0)) {
        return Err(incompatible(format!("handler {} cannot accept {}", handler_type, exception_class.name())));
    }
    let leading = &handler_type.ptypes()[1..];
    if leading.len() > target_type.parameter_count() || leading != &target_type.ptypes()[..leading.len()] {
        return Err(incompatible(format!("handler {} does not match the arguments of {}", handler_type, target_type)));
    }
    Ok(MethodHandle::new(target_type.clone(), HandleKind::Catch {
        target: target.clone(),
        exception_class: exception_class.clone(),
        handler: handler.clone(),
    }))
}

/// `()T` returning `value`, converted to `ty`.
pub fn constant(ty: &JType, value: Value) -> Result<MethodHandle, InvokeError> {
    let value = coerce_value(value, ty)?;
    Ok(MethodHandle::new(MethodType::of(ty.clone(), vec![])?, HandleKind::Constant { value }))
}

/// `(T)T` returning its argument.
pub fn identity(ty: &JType) -> Result<MethodHandle, InvokeError> {
    Ok(MethodHandle::new(MethodType::of(ty.clone(), vec![ty.clone()])?, HandleKind::Identity))
}

/// `(E)R` that raises its argument.
pub fn throw_exception(rtype: &JType, exception_class: &Arc<RuntimeClass>) -> Result<MethodHandle, InvokeError> {
    if !is_subclass_of(exception_class, &bootstrap().throwable) {
        return Err(incompatible(format!("{} is not a throwable", exception_class.name())));
    }
    Ok(MethodHandle::new(MethodType::of(rtype.clone(), vec![JType::class(exception_class)])?, HandleKind::Throw))
}

/// A handle of type `method_type` that raises `IllegalState` when called.
pub fn unlinked(method_type: &MethodType, message: impl Into<String>) -> MethodHandle {
    MethodHandle::new(method_type.clone(), HandleKind::Unlinked { message: message.into() })
}
