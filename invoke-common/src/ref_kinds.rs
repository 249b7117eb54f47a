use strum_macros::{Display, EnumIter};

pub const REF_GET_FIELD: u8 = 1;
pub const REF_GET_STATIC: u8 = 2;
pub const REF_PUT_FIELD: u8 = 3;
pub const REF_PUT_STATIC: u8 = 4;
pub const REF_INVOKE_VIRTUAL: u8 = 5;
pub const REF_INVOKE_STATIC: u8 = 6;
pub const REF_INVOKE_SPECIAL: u8 = 7;
pub const REF_NEW_INVOKE_SPECIAL: u8 = 8;
pub const REF_INVOKE_INTERFACE: u8 = 9;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, EnumIter)]
#[repr(u8)]
pub enum ReferenceKind {
    GetField = REF_GET_FIELD,
    GetStatic = REF_GET_STATIC,
    PutField = REF_PUT_FIELD,
    PutStatic = REF_PUT_STATIC,
    InvokeVirtual = REF_INVOKE_VIRTUAL,
    InvokeStatic = REF_INVOKE_STATIC,
    InvokeSpecial = REF_INVOKE_SPECIAL,
    NewInvokeSpecial = REF_NEW_INVOKE_SPECIAL,
    InvokeInterface = REF_INVOKE_INTERFACE,
}

impl ReferenceKind {
    pub fn from_u8(kind: u8) -> Option<Self> {
        Some(match kind {
            REF_GET_FIELD => ReferenceKind::GetField,
            REF_GET_STATIC => ReferenceKind::GetStatic,
            REF_PUT_FIELD => ReferenceKind::PutField,
            REF_PUT_STATIC => ReferenceKind::PutStatic,
            REF_INVOKE_VIRTUAL => ReferenceKind::InvokeVirtual,
            REF_INVOKE_STATIC => ReferenceKind::InvokeStatic,
            REF_INVOKE_SPECIAL => ReferenceKind::InvokeSpecial,
            REF_NEW_INVOKE_SPECIAL => ReferenceKind::NewInvokeSpecial,
            REF_INVOKE_INTERFACE => ReferenceKind::InvokeInterface,
            _ => return None,
        })
    }

    pub fn is_field(&self) -> bool {
        matches!(self, ReferenceKind::GetField | ReferenceKind::GetStatic | ReferenceKind::PutField | ReferenceKind::PutStatic)
    }

    pub fn is_static(&self) -> bool {
        matches!(self, ReferenceKind::GetStatic | ReferenceKind::PutStatic | ReferenceKind::InvokeStatic)
    }

    pub fn is_getter(&self) -> bool {
        matches!(self, ReferenceKind::GetField | ReferenceKind::GetStatic)
    }

    pub fn is_setter(&self) -> bool {
        matches!(self, ReferenceKind::PutField | ReferenceKind::PutStatic)
    }

    pub fn has_receiver(&self) -> bool {
        matches!(self, ReferenceKind::GetField | ReferenceKind::PutField | ReferenceKind::InvokeVirtual | ReferenceKind::InvokeSpecial | ReferenceKind::InvokeInterface)
    }
}
