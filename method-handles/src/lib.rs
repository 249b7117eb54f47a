pub mod error;
pub mod tracing;
pub mod options;
pub mod method_type;
pub mod conversions;
pub mod handle;
pub mod invoke;
pub mod thunks;
pub mod method_handles;
pub mod comparator;
pub mod access;
pub mod member_cache;
pub mod env;
pub mod lookup;
pub mod call_site;
#[cfg(test)]
pub mod test;

pub use call_site::{CallSite, CallSiteKind};
pub use comparator::structurally_equivalent;
pub use env::InvokeEnv;
pub use error::InvokeError;
pub use handle::{HandleKind, MethodHandle};
pub use lookup::Lookup;
pub use method_type::MethodType;
pub use options::InvokeOptions;
