use clap::Parser;
use log::LevelFilter;

use method_handles::options::InvokeOptions;

use crate::InvokeArgs;

#[test]
pub fn defaults() {
    let args = InvokeArgs::try_parse_from(["mh-demo"]).unwrap();
    assert_eq!(args.log_level, LevelFilter::Info);
    assert_eq!(args.options(), InvokeOptions::new(false, false, false, false, true));
}

#[test]
pub fn flags_map_onto_options() {
    let args = InvokeArgs::try_parse_from(["mh-demo", "--trace-thunks", "--trace-relink", "--no-member-cache", "--log-level", "trace"]).unwrap();
    assert_eq!(args.log_level, LevelFilter::Trace);
    let options = InvokeOptions::from(&args);
    assert!(options.trace_thunk_compiles);
    assert!(options.trace_relink);
    assert!(!options.trace_access_checks);
    assert!(!options.member_cache);
}

#[test]
pub fn rejects_unknown_levels() {
    assert!(InvokeArgs::try_parse_from(["mh-demo", "-l", "loud"]).is_err());
}
