use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LoaderIndex(pub usize);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LoaderName {
    UserDefinedLoader(LoaderIndex),
    BootstrapLoader,
}

impl LoaderName {
    pub fn is_bootstrap(&self) -> bool {
        matches!(self, LoaderName::BootstrapLoader)
    }
}

impl Display for LoaderName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderName::BootstrapLoader => write!(f, "<bl>"),
            LoaderName::UserDefinedLoader(LoaderIndex(idx)) => write!(f, "<loader {}>", idx),
        }
    }
}
