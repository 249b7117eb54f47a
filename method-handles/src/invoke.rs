use invoke_common::access_flags::HasAccessFlags;
use invoke_common::MAX_MH_INVOKER_ARITY;
use runtime_classes::object::Object;
use runtime_classes::resolution::{select_method, ResolutionError, ResolvedMethod};
use runtime_classes::types::JType;
use runtime_classes::value::Value;

use crate::conversions::{coerce_value, matches_exactly};
use crate::error::InvokeError;
use crate::handle::{DirectMode, HandleKind, MethodHandle};
use crate::method_type::MethodType;
use crate::thunks::thunk_for;

impl MethodHandle {
    /// Invokes with arguments that must match the handle's signature exactly.
    pub fn invoke_exact(&self, args: Vec<Value>) -> Result<Value, InvokeError> {
        check_exact_arguments(self.type_(), &args)?;
        self.invoke_basic(args)
    }

    /// Invokes as if from a call site of type `caller_type`, adapting with `as_type` when it
    /// differs from the handle's own signature.
    pub fn invoke(&self, caller_type: &MethodType, args: Vec<Value>) -> Result<Value, InvokeError> {
        if caller_type == self.type_() {
            self.invoke_exact(args)
        } else {
            self.as_type(caller_type)?.invoke_exact(args)
        }
    }

    /// Invokes through the generic signature: primitives are boxed on the way in, the result is
    /// boxed on the way out and `void` comes back as null.
    pub fn invoke_with_arguments(&self, args: Vec<Value>) -> Result<Value, InvokeError> {
        if args.len() > MAX_MH_INVOKER_ARITY {
            return Err(InvokeError::InvalidSignature(format!("{} arguments exceeds invoker limit of {}", args.len(), MAX_MH_INVOKER_ARITY)));
        }
        let generic = MethodType::generic(args.len())?;
        let adapted = self.as_type(&generic).map_err(|_| InvokeError::WrongArgumentType(format!("cannot call {} with {} arguments", self.type_(), args.len())))?;
        let boxed = args.iter().map(|arg| arg.boxed()).collect();
        adapted.invoke_exact(boxed)
    }

    /// Invokes without checking arguments. Callers guarantee they fit the erased signature.
    pub(crate) fn invoke_basic(&self, args: Vec<Value>) -> Result<Value, InvokeError> {
        thunk_for(self)?.call(self, args)
    }
}

fn check_exact_arguments(method_type: &MethodType, args: &[Value]) -> Result<(), InvokeError> {
    if args.len() != method_type.parameter_count() {
        return Err(InvokeError::WrongArgumentType(format!("expected {} arguments for {}, got {}", method_type.parameter_count(), method_type, args.len())));
    }
    for (i, (arg, ptype)) in args.iter().zip(method_type.ptypes()).enumerate() {
        if !matches_exactly(arg, ptype) {
            return Err(InvokeError::WrongArgumentType(format!("argument {} of {} is {:?}", i, method_type, arg)));
        }
    }
    Ok(())
}

fn kind_mismatch(mh: &MethodHandle) -> InvokeError {
    InvokeError::IllegalState(format!("thunk does not match handle {:?}", mh))
}

fn call_body(method: &ResolvedMethod, args: &[Value]) -> Result<Value, InvokeError> {
    match &method.method().body {
        Some(body) => Ok(body(args)?),
        None => Err(ResolutionError::AbstractMethod(format!("{:?}", method)).into())
    }
}

fn receiver_object(args: &[Value], method: &dyn std::fmt::Debug) -> Result<std::sync::Arc<Object>, InvokeError> {
    match args.first() {
        Some(Value::Object(obj)) => Ok(obj.clone()),
        Some(Value::Null) | None => Err(InvokeError::NullPointer(format!("null receiver for {:?}", method))),
        Some(other) => Err(InvokeError::IncompatibleReceiver(format!("{:?} is not an object", other))),
    }
}

pub(crate) fn invoke_direct(mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::Direct { method, mode } = mh.kind() else { return Err(kind_mismatch(mh)) };
    match mode {
        DirectMode::Static => call_body(method, &args),
        DirectMode::Special => {
            receiver_object(&args, method)?;
            call_body(method, &args)
        }
        DirectMode::Constructor => {
            let instance = Object::new_instance(&method.class);
            let mut with_receiver = Vec::with_capacity(args.len() + 1);
            with_receiver.push(Value::Object(instance.clone()));
            with_receiver.extend(args);
            call_body(method, &with_receiver)?;
            Ok(Value::Object(instance))
        }
    }
}

pub(crate) fn invoke_virtual(mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::Virtual { method, dispatch_class, .. } = mh.kind() else { return Err(kind_mismatch(mh)) };
    let receiver = receiver_object(&args, method)?;
    if !receiver.is_instance_of(&JType::class(dispatch_class)) {
        return Err(InvokeError::IncompatibleReceiver(format!("{:?} is not an instance of {}", receiver, dispatch_class.name())));
    }
    let selected = match select_method(receiver.class(), method) {
        Some(selected) if !selected.is_abstract() => selected,
        _ => return Err(ResolutionError::AbstractMethod(format!("{:?} for receiver {}", method, receiver.class().name())).into())
    };
    call_body(&selected, &args)
}

pub(crate) fn invoke_field_getter(mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::FieldGetter { field, is_static, access } = mh.kind() else { return Err(kind_mismatch(mh)) };
    let volatile = field.is_volatile();
    if *is_static {
        Ok(access.read_static(&field.class, field.offset(), volatile)?)
    } else {
        let receiver = receiver_object(&args, field)?;
        Ok(access.read_field(&receiver, field.offset(), volatile)?)
    }
}

pub(crate) fn invoke_field_setter(mh: &MethodHandle, mut args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::FieldSetter { field, is_static, access } = mh.kind() else { return Err(kind_mismatch(mh)) };
    let volatile = field.is_volatile();
    let value = args.pop().ok_or_else(|| kind_mismatch(mh))?;
    if *is_static {
        access.write_static(&field.class, field.offset(), value, volatile)?;
    } else {
        let receiver = receiver_object(&args, field)?;
        access.write_field(&receiver, field.offset(), value, volatile)?;
    }
    Ok(Value::Void)
}

pub(crate) fn invoke_insert(mh: &MethodHandle, mut args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::Insert { target, pos, values } = mh.kind() else { return Err(kind_mismatch(mh)) };
    args.splice(*pos..*pos, values.iter().cloned());
    target.invoke_basic(args)
}

pub(crate) fn invoke_permute(mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::Permute { target, reorder } = mh.kind() else { return Err(kind_mismatch(mh)) };
    let permuted = reorder.iter().map(|&i| args[i].clone()).collect();
    target.invoke_basic(permuted)
}

pub(crate) fn invoke_collect(mh: &MethodHandle, mut args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::Collect { target, pos, count, array_type } = mh.kind() else { return Err(kind_mismatch(mh)) };
    let component = array_type.array_component().ok_or_else(|| kind_mismatch(mh))?.clone();
    let collected = args.splice(*pos..*pos + *count, std::iter::empty()).collect();
    args.insert(*pos, Value::Object(Object::new_array(component, collected)));
    target.invoke_basic(args)
}

pub(crate) fn invoke_spread(mh: &MethodHandle, mut args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::Spread { target, pos, count, .. } = mh.kind() else { return Err(kind_mismatch(mh)) };
    let elements = match &args[*pos] {
        Value::Null if *count == 0 => vec![],
        Value::Null => return Err(InvokeError::ArityMismatch { expected: *count, actual: 0 }),
        Value::Object(array) => match array.array_elements() {
            Some(elements) => elements,
            None => return Err(InvokeError::TypeMismatch(format!("{:?} is not an array", array)))
        },
        other => return Err(InvokeError::TypeMismatch(format!("{:?} is not an array", other)))
    };
    if elements.len() != *count {
        return Err(InvokeError::ArityMismatch { expected: *count, actual: elements.len() });
    }
    let target_types = &target.type_().ptypes()[*pos..*pos + *count];
    let spread = elements.into_iter().zip(target_types.iter())
        .map(|(element, ptype)| coerce_value(element, ptype))
        .collect::<Result<Vec<_>, _>>()?;
    args.splice(*pos..*pos + 1, spread);
    target.invoke_basic(args)
}

pub(crate) fn invoke_filter_arguments(mh: &MethodHandle, mut args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::FilterArguments { target, pos, filters } = mh.kind() else { return Err(kind_mismatch(mh)) };
    for (i, filter) in filters.iter().enumerate() {
        if let Some(filter) = filter {
            let arg = std::mem::replace(&mut args[pos + i], Value::Void);
            args[pos + i] = filter.invoke_basic(vec![arg])?;
        }
    }
    target.invoke_basic(args)
}

pub(crate) fn invoke_filter_return(mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::FilterReturn { target, filter } = mh.kind() else { return Err(kind_mismatch(mh)) };
    let res = target.invoke_basic(args)?;
    if target.type_().rtype().is_void() {
        filter.invoke_basic(vec![])
    } else {
        filter.invoke_basic(vec![res])
    }
}

pub(crate) fn invoke_fold(mh: &MethodHandle, mut args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::Fold { target, pos, combiner } = mh.kind() else { return Err(kind_mismatch(mh)) };
    let combiner_arity = combiner.type_().parameter_count();
    let combined = combiner.invoke_basic(args[*pos..*pos + combiner_arity].to_vec())?;
    if !combiner.type_().rtype().is_void() {
        args.insert(*pos, combined);
    }
    target.invoke_basic(args)
}

pub(crate) fn invoke_guard_with_test(mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::GuardWithTest { test, target, fallback } = mh.kind() else { return Err(kind_mismatch(mh)) };
    let test_arity = test.type_().parameter_count();
    match test.invoke_basic(args[..test_arity].to_vec())? {
        Value::Boolean(true) => target.invoke_basic(args),
        Value::Boolean(false) => fallback.invoke_basic(args),
        other => Err(InvokeError::TypeMismatch(format!("guard returned {:?}", other)))
    }
}

pub(crate) fn invoke_catch(mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::Catch { target, exception_class, handler } = mh.kind() else { return Err(kind_mismatch(mh)) };
    let handler_arity = handler.type_().parameter_count();
    let leading = args[..handler_arity - 1].to_vec();
    match target.invoke_basic(args) {
        Ok(res) => Ok(res),
        Err(err) => match err.as_exception() {
            Some(exception) if exception.exception_obj.is_instance_of(&JType::class(exception_class)) => {
                let mut handler_args = Vec::with_capacity(handler_arity);
                handler_args.push(Value::Object(exception.exception_obj));
                handler_args.extend(leading);
                handler.invoke_basic(handler_args)
            }
            _ => Err(err)
        }
    }
}

pub(crate) fn invoke_convert(mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::Convert { target, args: conversions, ret } = mh.kind() else { return Err(kind_mismatch(mh)) };
    let dispatches = matches!(target.kind(), HandleKind::Virtual { .. });
    let converted = args.into_iter().zip(conversions.iter()).enumerate()
        .map(|(i, (arg, conversion))| match conversion.apply(arg) {
            Err(InvokeError::TypeMismatch(msg)) if i == 0 && dispatches => Err(InvokeError::IncompatibleReceiver(msg)),
            res => res
        })
        .collect::<Result<Vec<_>, _>>()?;
    ret.apply(target.invoke_basic(converted)?)
}

pub(crate) fn invoke_constant(mh: &MethodHandle, _args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::Constant { value } = mh.kind() else { return Err(kind_mismatch(mh)) };
    Ok(value.clone())
}

pub(crate) fn invoke_identity(mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
    args.into_iter().next().ok_or_else(|| kind_mismatch(mh))
}

pub(crate) fn invoke_varargs_collector(mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::VarargsCollector { target, .. } = mh.kind() else { return Err(kind_mismatch(mh)) };
    target.invoke_basic(args)
}

pub(crate) fn invoke_dynamic_invoker(mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::DynamicInvoker { site } = mh.kind() else { return Err(kind_mismatch(mh)) };
    site.get_target()?.invoke_basic(args)
}

pub(crate) fn invoke_unlinked(mh: &MethodHandle, _args: Vec<Value>) -> Result<Value, InvokeError> {
    let HandleKind::Unlinked { message } = mh.kind() else { return Err(kind_mismatch(mh)) };
    Err(InvokeError::IllegalState(message.clone()))
}

pub(crate) fn invoke_throw(mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
    match args.into_iter().next() {
        Some(Value::Object(exception_obj)) => Err(InvokeError::Thrown(runtime_classes::object::WasException { exception_obj })),
        Some(Value::Null) => Err(InvokeError::NullPointer("cannot throw null".to_string())),
        _ => Err(kind_mismatch(mh))
    }
}
