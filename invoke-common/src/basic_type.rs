use std::fmt::{Display, Formatter};

/// Erased calling convention of a single argument or return value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum BasicType {
    L,
    I,
    J,
    F,
    D,
    V,
}

impl BasicType {
    pub fn bt_char(&self) -> char {
        match self {
            BasicType::L => 'L',
            BasicType::I => 'I',
            BasicType::J => 'J',
            BasicType::F => 'F',
            BasicType::D => 'D',
            BasicType::V => 'V',
        }
    }

    pub fn slot_count(&self) -> usize {
        match self {
            BasicType::J | BasicType::D => 2,
            BasicType::V => 0,
            _ => 1,
        }
    }
}

impl Display for BasicType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bt_char())
    }
}

/// The erased form of a signature: every reference collapses to `L`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ErasedShape {
    pub params: Vec<BasicType>,
    pub ret: BasicType,
}

impl ErasedShape {
    pub fn slot_count(&self) -> usize {
        self.params.iter().map(|param| param.slot_count()).sum()
    }
}

impl Display for ErasedShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for param in self.params.iter() {
            write!(f, "{}", param)?;
        }
        write!(f, "_{}", self.ret)
    }
}
