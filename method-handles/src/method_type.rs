use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use itertools::Itertools;
use lazy_static::lazy_static;
use parking_lot::RwLock;

use invoke_common::basic_type::ErasedShape;
use invoke_common::MAX_JVM_ARITY;
use runtime_classes::types::{JType, MethodDescriptor};

use crate::error::InvokeError;

struct MethodTypeInner {
    rtype: JType,
    ptypes: Vec<JType>,
    slot_count: usize,
    erased: ErasedShape,
}

/// An interned `(ptypes)rtype` pair. Two equal signatures are always the same object, so
/// equality and hashing go by address.
#[derive(Clone)]
pub struct MethodType(Arc<MethodTypeInner>);

lazy_static! {
    static ref INTERNED: RwLock<HashMap<(JType, Vec<JType>), MethodType>> = RwLock::new(HashMap::new());
}

fn validate(ptypes: &[JType]) -> Result<usize, InvokeError> {
    if let Some(i) = ptypes.iter().position(|ptype| ptype.is_void()) {
        return Err(InvokeError::InvalidSignature(format!("parameter {} is void", i)));
    }
    let slot_count = ptypes.iter().map(|ptype| ptype.slot_count()).sum();
    if slot_count > MAX_JVM_ARITY {
        return Err(InvokeError::InvalidSignature(format!("{} argument slots exceeds {}", slot_count, MAX_JVM_ARITY)));
    }
    Ok(slot_count)
}

impl MethodType {
    pub fn of(rtype: JType, ptypes: Vec<JType>) -> Result<MethodType, InvokeError> {
        let slot_count = validate(&ptypes)?;
        let key = (rtype, ptypes);
        if let Some(existing) = INTERNED.read().get(&key) {
            return Ok(existing.clone());
        }
        let mut guard = INTERNED.write();
        let interned = guard.entry(key).or_insert_with_key(|(rtype, ptypes)| {
            let erased = ErasedShape {
                params: ptypes.iter().map(|ptype| ptype.basic_type()).collect(),
                ret: rtype.basic_type(),
            };
            MethodType(Arc::new(MethodTypeInner { rtype: rtype.clone(), ptypes: ptypes.clone(), slot_count, erased }))
        });
        Ok(interned.clone())
    }

    pub fn from_descriptor(desc: &MethodDescriptor) -> Result<MethodType, InvokeError> {
        Self::of(desc.return_type.clone(), desc.arg_types.clone())
    }

    /// `(Object, ..., Object)Object` with `n` parameters.
    pub fn generic(n: usize) -> Result<MethodType, InvokeError> {
        Self::of(JType::object(), vec![JType::object(); n])
    }

    pub fn interned_count() -> usize {
        INTERNED.read().len()
    }

    pub fn rtype(&self) -> &JType {
        &self.0.rtype
    }

    pub fn ptypes(&self) -> &[JType] {
        self.0.ptypes.as_slice()
    }

    pub fn ptype(&self, i: usize) -> &JType {
        &self.0.ptypes[i]
    }

    pub fn parameter_count(&self) -> usize {
        self.0.ptypes.len()
    }

    pub fn parameter_slot_count(&self) -> usize {
        self.0.slot_count
    }

    pub fn last_parameter_type(&self) -> Option<&JType> {
        self.0.ptypes.last()
    }

    pub fn erased_shape(&self) -> &ErasedShape {
        &self.0.erased
    }

    fn check_index(&self, i: usize, inclusive_end: bool) -> Result<(), InvokeError> {
        let limit = if inclusive_end { self.parameter_count() } else { self.parameter_count().saturating_sub(1) };
        if i > limit || (!inclusive_end && self.parameter_count() == 0) {
            return Err(InvokeError::InvalidSignature(format!("index {} out of range for {}", i, self)));
        }
        Ok(())
    }

    pub fn change_parameter_type(&self, i: usize, ptype: JType) -> Result<MethodType, InvokeError> {
        self.check_index(i, false)?;
        let mut ptypes = self.0.ptypes.clone();
        ptypes[i] = ptype;
        Self::of(self.0.rtype.clone(), ptypes)
    }

    pub fn insert_parameter_types(&self, i: usize, inserted: &[JType]) -> Result<MethodType, InvokeError> {
        self.check_index(i, true)?;
        let mut ptypes = self.0.ptypes.clone();
        ptypes.splice(i..i, inserted.iter().cloned());
        Self::of(self.0.rtype.clone(), ptypes)
    }

    pub fn append_parameter_types(&self, appended: &[JType]) -> Result<MethodType, InvokeError> {
        self.insert_parameter_types(self.parameter_count(), appended)
    }

    /// Removes parameters `start..end`.
    pub fn drop_parameter_types(&self, start: usize, end: usize) -> Result<MethodType, InvokeError> {
        if start > end || end > self.parameter_count() {
            return Err(InvokeError::InvalidSignature(format!("cannot drop {}..{} from {}", start, end, self)));
        }
        let mut ptypes = self.0.ptypes.clone();
        ptypes.drain(start..end);
        Self::of(self.0.rtype.clone(), ptypes)
    }

    pub fn change_return_type(&self, rtype: JType) -> Result<MethodType, InvokeError> {
        Self::of(rtype, self.0.ptypes.clone())
    }

    /// References become `Object`; primitives stay.
    pub fn erase(&self) -> Result<MethodType, InvokeError> {
        let erase = |ty: &JType| if ty.is_reference() { JType::object() } else { ty.clone() };
        Self::of(erase(&self.0.rtype), self.0.ptypes.iter().map(erase).collect())
    }

    pub fn generic_type(&self) -> Result<MethodType, InvokeError> {
        Self::generic(self.parameter_count())
    }

    /// Primitives become their wrapper classes.
    pub fn wrap(&self) -> Result<MethodType, InvokeError> {
        let wrap = |ty: &JType| match ty.try_primitive() {
            Some(prim) => JType::wrapper_type(prim),
            None => ty.clone()
        };
        Self::of(wrap(&self.0.rtype), self.0.ptypes.iter().map(wrap).collect())
    }

    /// Wrapper classes become their primitives.
    pub fn unwrap(&self) -> Result<MethodType, InvokeError> {
        let unwrap = |ty: &JType| match ty.unwrapped_primitive() {
            Some(prim) => JType::Primitive(prim),
            None => ty.clone()
        };
        Self::of(unwrap(&self.0.rtype), self.0.ptypes.iter().map(unwrap).collect())
    }

    pub fn has_primitives(&self) -> bool {
        self.0.rtype.is_primitive() || self.0.ptypes.iter().any(|ptype| ptype.is_primitive())
    }

    pub fn has_wrappers(&self) -> bool {
        self.0.rtype.unwrapped_primitive().is_some() || self.0.ptypes.iter().any(|ptype| ptype.unwrapped_primitive().is_some())
    }

    pub fn to_method_descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(self.0.ptypes.clone(), self.0.rtype.clone())
    }
}

impl PartialEq for MethodType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MethodType {}

impl Hash for MethodType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state)
    }
}

impl Display for MethodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}){}", self.0.ptypes.iter().join(","), self.0.rtype)
    }
}

impl Debug for MethodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
