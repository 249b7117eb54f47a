use std::sync::Arc;

use thiserror::Error;

use runtime_classes::bootstrap::bootstrap;
use runtime_classes::field_access::FieldAccessError;
use runtime_classes::object::WasException;
use runtime_classes::resolution::ResolutionError;
use runtime_classes::RuntimeClass;
use thunk_cache::CompileError;

#[derive(Debug, Clone, Error)]
pub enum InvokeError {
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("wrong argument type: {0}")]
    WrongArgumentType(String),
    #[error("incompatible signature: {0}")]
    IncompatibleSignature(String),
    #[error("arity mismatch: expected {expected} elements, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("call site target not yet bound")]
    NotYetBound,
    #[error("incompatible receiver: {0}")]
    IncompatibleReceiver(String),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("illegal state: {0}")]
    IllegalState(String),
    #[error("null pointer: {0}")]
    NullPointer(String),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    FieldAccess(#[from] FieldAccessError),
    #[error("{0:?}")]
    Thrown(WasException),
}

impl From<WasException> for InvokeError {
    fn from(exception: WasException) -> Self {
        InvokeError::Thrown(exception)
    }
}

impl InvokeError {
    /// The exception class a catch handler observes for this error. Linkage, access and
    /// construction-time errors are not catchable.
    pub fn exception_class(&self) -> Option<&'static Arc<RuntimeClass>> {
        let classes = bootstrap();
        Some(match self {
            InvokeError::ArityMismatch { .. } => &classes.illegal_argument_exception,
            InvokeError::TypeMismatch(_) => &classes.class_cast_exception,
            InvokeError::NullPointer(_) => &classes.null_pointer_exception,
            InvokeError::IncompatibleReceiver(_) |
            InvokeError::FieldAccess(_) => &classes.incompatible_class_change_error,
            InvokeError::WrongArgumentType(_) => &classes.wrong_method_type_exception,
            InvokeError::IllegalState(_) => &classes.illegal_state_exception,
            InvokeError::UnsupportedOperation(_) => &classes.unsupported_operation_exception,
            InvokeError::Thrown(_) |
            InvokeError::InvalidSignature(_) |
            InvokeError::AccessDenied(_) |
            InvokeError::IncompatibleSignature(_) |
            InvokeError::NotYetBound |
            InvokeError::Resolution(_) |
            InvokeError::Compile(_) => return None,
        })
    }

    /// The throwable a catch handler receives, materialised for runtime errors.
    pub fn as_exception(&self) -> Option<WasException> {
        match self {
            InvokeError::Thrown(exception) => Some(exception.clone()),
            other => other.exception_class().map(|class| WasException::new(class, other.to_string())),
        }
    }
}
