pub mod access_flags;
pub mod basic_type;
pub mod class_names;
pub mod loading;
pub mod primitive;
pub mod ref_kinds;
#[cfg(test)]
pub mod test;

/// Upper bound on argument slots in a signature. Long and double take two.
pub const MAX_JVM_ARITY: usize = 255;
/// Upper bound on arguments passed through array based invocation.
pub const MAX_MH_INVOKER_ARITY: usize = 253;
