#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InvokeOptions {
    pub trace_thunk_compiles: bool,
    pub trace_access_checks: bool,
    pub trace_lookups: bool,
    pub trace_relink: bool,
    pub member_cache: bool,
}

impl InvokeOptions {
    pub fn new(trace_thunk_compiles: bool,
               trace_access_checks: bool,
               trace_lookups: bool,
               trace_relink: bool,
               member_cache: bool,
    ) -> Self {
        Self {
            trace_thunk_compiles,
            trace_access_checks,
            trace_lookups,
            trace_relink,
            member_cache,
        }
    }

    pub fn test_options() -> Self {
        Self::new(false, false, false, false, true)
    }
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self::new(false, false, false, true, true)
    }
}
