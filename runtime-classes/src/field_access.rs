use std::sync::atomic::{fence, Ordering};

use thiserror::Error;

use crate::object::{FieldSlot, Object};
use crate::value::Value;
use crate::RuntimeClass;

#[derive(Debug, Clone, Error)]
pub enum FieldAccessError {
    #[error("no field slot {offset} in {holder}")]
    MissingSlot { offset: usize, holder: String },
}

/// Raw slot access. Offsets come from field resolution; a holder without the slot is an error.
pub trait RawFieldAccess: Send + Sync {
    fn read_field(&self, object: &Object, offset: usize, volatile: bool) -> Result<Value, FieldAccessError>;
    fn write_field(&self, object: &Object, offset: usize, value: Value, volatile: bool) -> Result<(), FieldAccessError>;
    fn read_static(&self, class: &RuntimeClass, offset: usize, volatile: bool) -> Result<Value, FieldAccessError>;
    fn write_static(&self, class: &RuntimeClass, offset: usize, value: Value, volatile: bool) -> Result<(), FieldAccessError>;
}

fn missing(offset: usize, holder: &dyn std::fmt::Debug) -> FieldAccessError {
    FieldAccessError::MissingSlot { offset, holder: format!("{:?}", holder) }
}

pub struct SlotFieldAccess;

fn load(slot: &FieldSlot, volatile: bool) -> Value {
    let res = slot.load();
    if volatile {
        fence(Ordering::Acquire);
    }
    res
}

fn store(slot: &FieldSlot, value: Value, volatile: bool) {
    if volatile {
        fence(Ordering::Release);
    }
    slot.store(value);
    if volatile {
        fence(Ordering::SeqCst);
    }
}

impl RawFieldAccess for SlotFieldAccess {
    fn read_field(&self, object: &Object, offset: usize, volatile: bool) -> Result<Value, FieldAccessError> {
        let slot = object.field_slot(offset).ok_or_else(|| missing(offset, object))?;
        Ok(load(slot, volatile))
    }

    fn write_field(&self, object: &Object, offset: usize, value: Value, volatile: bool) -> Result<(), FieldAccessError> {
        let slot = object.field_slot(offset).ok_or_else(|| missing(offset, object))?;
        store(slot, value, volatile);
        Ok(())
    }

    fn read_static(&self, class: &RuntimeClass, offset: usize, volatile: bool) -> Result<Value, FieldAccessError> {
        let slot = class.static_slot(offset).ok_or_else(|| missing(offset, class))?;
        Ok(load(slot, volatile))
    }

    fn write_static(&self, class: &RuntimeClass, offset: usize, value: Value, volatile: bool) -> Result<(), FieldAccessError> {
        let slot = class.static_slot(offset).ok_or_else(|| missing(offset, class))?;
        store(slot, value, volatile);
        Ok(())
    }
}
