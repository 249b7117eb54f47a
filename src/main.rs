use anyhow::anyhow;
use clap::Parser;
use log::info;
use simple_logger::SimpleLogger;

use invoke_args::InvokeArgs;
use invoke_common::access_flags::{ACC_PUBLIC, ACC_STATIC};
use method_handles::call_site::CallSite;
use method_handles::env::InvokeEnv;
use method_handles::lookup::Lookup;
use method_handles::method_handles::{filter_return_value, guard_with_test, insert_arguments};
use method_handles::method_type::MethodType;
use method_handles::thunks::thunk_cache_stats;
use runtime_classes::builder::ClassBuilder;
use runtime_classes::types::{JType, MethodDescriptor};
use runtime_classes::value::Value;

fn main() -> anyhow::Result<()> {
    let args = InvokeArgs::parse();
    SimpleLogger::new().with_level(args.log_level).init()?;
    let env = InvokeEnv::new(args.options());

    let string = JType::string();
    let greeter = env.classes.define(ClassBuilder::new("demo/Greeter")
        .method("greet", MethodDescriptor::new(vec![string.clone(), string.clone()], string.clone()), ACC_PUBLIC | ACC_STATIC, |args| {
            Ok(Value::string(format!("{}, {}!", args[0].unwrap_string(), args[1].unwrap_string())))
        })
        .method("shout", MethodDescriptor::new(vec![string.clone()], string.clone()), ACC_PUBLIC | ACC_STATIC, |args| {
            Ok(Value::string(args[0].unwrap_string().to_uppercase()))
        })
        .method("isLoud", MethodDescriptor::new(vec![string.clone()], JType::BOOLEAN), ACC_PUBLIC | ACC_STATIC, |args| {
            Ok(Value::Boolean(args[0].unwrap_string().ends_with('!')))
        }))?;
    let lookup = Lookup::lookup(&env, &greeter);

    let greet = lookup.find_static(&greeter, "greet", &MethodType::of(string.clone(), vec![string.clone(), string.clone()])?)?;
    let shout = lookup.find_static(&greeter, "shout", &MethodType::of(string.clone(), vec![string.clone()])?)?;
    let is_loud = lookup.find_static(&greeter, "isLoud", &MethodType::of(JType::BOOLEAN, vec![string.clone()])?)?;

    let hello = insert_arguments(&greet, 0, vec![Value::string("Hello")])?;
    let loud_hello = filter_return_value(&hello, &shout)?;
    info!("{:?} -> {}", hello, hello.invoke_exact(vec![Value::string("world")])?.unwrap_string());
    info!("{:?} -> {}", loud_hello, loud_hello.invoke_exact(vec![Value::string("world")])?.unwrap_string());

    let site = CallSite::mutable(hello.clone());
    let invoker = site.dynamic_invoker()?;
    for name in ["ada", "grace!"] {
        info!("site({}) -> {}", name, invoker.invoke_exact(vec![Value::string(name)])?.unwrap_string());
    }
    site.set_target(guard_with_test(&is_loud, &loud_hello, &hello)?)?;
    CallSite::sync_all(&[site.clone()]);
    for name in ["ada", "grace!"] {
        info!("site({}) -> {}", name, invoker.invoke_exact(vec![Value::string(name)])?.unwrap_string());
    }

    let boxed = greet.invoke_with_arguments(vec![Value::string("Hi"), Value::string("there")])?;
    let text = boxed.try_object().and_then(|obj| obj.string_value().map(str::to_string))
        .ok_or_else(|| anyhow!("expected a string from {:?}", greet))?;
    info!("invoke_with_arguments -> {}", text);

    let stats = thunk_cache_stats();
    info!("thunks: {} compiled, {} cached; call site epoch {}; member cache {} hits / {} misses",
        stats.compilations, stats.cached, site.epoch(), env.member_cache.hits(), env.member_cache.misses());
    Ok(())
}
