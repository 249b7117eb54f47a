use clap::Parser;
use log::LevelFilter;

use method_handles::options::InvokeOptions;

#[derive(Parser, Debug, Clone)]
#[clap(version, about = "method handle runtime demo")]
pub struct InvokeArgs {
    #[clap(long, help = "log every thunk compilation")]
    pub trace_thunks: bool,
    #[clap(long, help = "log access check outcomes")]
    pub trace_access: bool,
    #[clap(long, help = "log member handle lookups")]
    pub trace_lookups: bool,
    #[clap(long, help = "log call site relinks")]
    pub trace_relink: bool,
    #[clap(long, help = "create a fresh handle on every lookup")]
    pub no_member_cache: bool,
    #[clap(short, long, default_value = "info", help = "off, error, warn, info, debug or trace")]
    pub log_level: LevelFilter,
}

impl InvokeArgs {
    pub fn options(&self) -> InvokeOptions {
        InvokeOptions::new(
            self.trace_thunks,
            self.trace_access,
            self.trace_lookups,
            self.trace_relink,
            !self.no_member_cache,
        )
    }
}

impl From<&InvokeArgs> for InvokeOptions {
    fn from(args: &InvokeArgs) -> Self {
        args.options()
    }
}

#[cfg(test)]
pub mod test;
