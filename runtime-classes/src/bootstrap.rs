use std::sync::Arc;

use lazy_static::lazy_static;

use invoke_common::access_flags::{ACC_ABSTRACT, ACC_FINAL, ACC_PUBLIC};
use invoke_common::class_names;
use invoke_common::primitive::PrimitiveType;

use crate::builder::ClassBuilder;
use crate::RuntimeClass;

/// Classes every loader can see, owned by the bootstrap loader.
pub struct BootstrapClasses {
    pub object: Arc<RuntimeClass>,
    pub string: Arc<RuntimeClass>,
    pub number: Arc<RuntimeClass>,
    pub throwable: Arc<RuntimeClass>,
    pub exception: Arc<RuntimeClass>,
    pub runtime_exception: Arc<RuntimeClass>,
    pub error: Arc<RuntimeClass>,
    pub illegal_argument_exception: Arc<RuntimeClass>,
    pub illegal_state_exception: Arc<RuntimeClass>,
    pub class_cast_exception: Arc<RuntimeClass>,
    pub null_pointer_exception: Arc<RuntimeClass>,
    pub unsupported_operation_exception: Arc<RuntimeClass>,
    pub wrong_method_type_exception: Arc<RuntimeClass>,
    pub incompatible_class_change_error: Arc<RuntimeClass>,
    wrappers: Vec<(PrimitiveType, Arc<RuntimeClass>)>,
}

lazy_static! {
    static ref BOOTSTRAP_CLASSES: BootstrapClasses = BootstrapClasses::new();
}

pub fn bootstrap() -> &'static BootstrapClasses {
    &BOOTSTRAP_CLASSES
}

fn subclass(name: &str, parent: &Arc<RuntimeClass>) -> Arc<RuntimeClass> {
    ClassBuilder::new(name).extends(parent).build()
}

impl BootstrapClasses {
    fn new() -> Self {
        let object = ClassBuilder::new(class_names::OBJECT).root().build();
        let string = ClassBuilder::new("java/lang/String").access_flags(ACC_PUBLIC | ACC_FINAL).extends(&object).build();
        let number = ClassBuilder::new("java/lang/Number").access_flags(ACC_PUBLIC | ACC_ABSTRACT).extends(&object).build();
        let throwable = subclass("java/lang/Throwable", &object);
        let exception = subclass("java/lang/Exception", &throwable);
        let runtime_exception = subclass("java/lang/RuntimeException", &exception);
        let error = subclass("java/lang/Error", &throwable);
        let illegal_argument_exception = subclass("java/lang/IllegalArgumentException", &runtime_exception);
        let illegal_state_exception = subclass("java/lang/IllegalStateException", &runtime_exception);
        let class_cast_exception = subclass("java/lang/ClassCastException", &runtime_exception);
        let null_pointer_exception = subclass("java/lang/NullPointerException", &runtime_exception);
        let unsupported_operation_exception = subclass("java/lang/UnsupportedOperationException", &runtime_exception);
        let wrong_method_type_exception = subclass("java/lang/invoke/WrongMethodTypeException", &runtime_exception);
        let linkage_error = subclass("java/lang/LinkageError", &error);
        let incompatible_class_change_error = subclass("java/lang/IncompatibleClassChangeError", &linkage_error);
        let wrappers = [
            PrimitiveType::Boolean,
            PrimitiveType::Byte,
            PrimitiveType::Short,
            PrimitiveType::Char,
            PrimitiveType::Int,
            PrimitiveType::Long,
            PrimitiveType::Float,
            PrimitiveType::Double
        ].into_iter().map(|prim| {
            let parent = if prim.is_numeric() && prim != PrimitiveType::Char { &number } else { &object };
            let class = ClassBuilder::new(prim.wrapper_class_name()).access_flags(ACC_PUBLIC | ACC_FINAL).extends(parent).build();
            (prim, class)
        }).collect();
        Self {
            object,
            string,
            number,
            throwable,
            exception,
            runtime_exception,
            error,
            illegal_argument_exception,
            illegal_state_exception,
            class_cast_exception,
            null_pointer_exception,
            unsupported_operation_exception,
            wrong_method_type_exception,
            incompatible_class_change_error,
            wrappers,
        }
    }

    pub fn wrapper(&self, prim: PrimitiveType) -> &Arc<RuntimeClass> {
        match self.wrappers.iter().find(|(wrapped, _)| *wrapped == prim) {
            Some((_, class)) => class,
            None => panic!("no wrapper class for {:?}", prim)
        }
    }

    pub fn unwrapped_primitive(&self, class: &RuntimeClass) -> Option<PrimitiveType> {
        self.wrappers.iter().find(|(_, wrapper)| std::ptr::eq(wrapper.as_ref(), class)).map(|(prim, _)| *prim)
    }

    pub fn all(&self) -> Vec<Arc<RuntimeClass>> {
        let mut res = vec![
            self.object.clone(),
            self.string.clone(),
            self.number.clone(),
            self.throwable.clone(),
            self.exception.clone(),
            self.runtime_exception.clone(),
            self.error.clone(),
            self.illegal_argument_exception.clone(),
            self.illegal_state_exception.clone(),
            self.class_cast_exception.clone(),
            self.null_pointer_exception.clone(),
            self.unsupported_operation_exception.clone(),
            self.wrong_method_type_exception.clone(),
            self.incompatible_class_change_error.clone(),
        ];
        res.extend(self.wrappers.iter().map(|(_, class)| class.clone()));
        res
    }
}
