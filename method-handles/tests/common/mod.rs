#![allow(dead_code)]

use std::sync::Arc;

use invoke_common::access_flags::{ACC_FINAL, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC, ACC_VARARGS};
use invoke_common::loading::LoaderName;
use method_handles::env::InvokeEnv;
use method_handles::method_type::MethodType;
use method_handles::options::InvokeOptions;
use runtime_classes::bootstrap::bootstrap;
use runtime_classes::builder::ClassBuilder;
use runtime_classes::object::WasException;
use runtime_classes::types::{JType, MethodDescriptor};
use runtime_classes::value::Value;
use runtime_classes::RuntimeClass;

/// Classes spread over two packages and two loaders.
pub struct Fixture {
    pub env: Arc<InvokeEnv>,
    pub shape: Arc<RuntimeClass>,
    pub square: Arc<RuntimeClass>,
    pub helper: Arc<RuntimeClass>,
    pub client: Arc<RuntimeClass>,
    pub stranger: Arc<RuntimeClass>,
    pub widget: Arc<RuntimeClass>,
    pub registry: Arc<RuntimeClass>,
}

pub fn mt(rtype: JType, ptypes: Vec<JType>) -> MethodType {
    MethodType::of(rtype, ptypes).unwrap()
}

fn sides_of(receiver: &Value) -> Value {
    receiver.unwrap_object().field_slot(0).unwrap().load()
}

pub fn fixture() -> Fixture {
    let _ = simple_logger::SimpleLogger::new().with_level(log::LevelFilter::Warn).init();
    let env = InvokeEnv::new(InvokeOptions::test_options());
    let classes = &env.classes;
    let shape = classes.define(ClassBuilder::new("shapes/Shape")
        .field("sides", JType::INT, ACC_PUBLIC)
        .field("id", JType::INT, ACC_PUBLIC | ACC_FINAL)
        .field("created", JType::LONG, ACC_PUBLIC | ACC_STATIC)
        .field("tag", JType::string(), ACC_PROTECTED)
        .constructor(vec![JType::INT], ACC_PUBLIC, |args| {
            args[0].unwrap_object().field_slot(0).unwrap().store(args[1].clone());
            Ok(Value::Void)
        })
        .constructor(vec![], ACC_PROTECTED, |_| Ok(Value::Void))
        .method("area", MethodDescriptor::new(vec![JType::INT, JType::INT], JType::INT), ACC_PUBLIC | ACC_STATIC, |args| {
            Ok(Value::Int(args[0].unwrap_int() * args[1].unwrap_int()))
        })
        .method("name", MethodDescriptor::empty_args(JType::string()), ACC_PUBLIC, |_| Ok(Value::string("shape")))
        .method("sides", MethodDescriptor::empty_args(JType::INT), ACC_PUBLIC, |args| Ok(sides_of(&args[0])))
        .method("describe", MethodDescriptor::empty_args(JType::string()), ACC_PROTECTED, |args| {
            Ok(Value::string(format!("{} sides", sides_of(&args[0]).unwrap_int())))
        })
        .method("secret", MethodDescriptor::empty_args(JType::INT), ACC_PRIVATE, |_| Ok(Value::Int(42)))
        .method("hidden", MethodDescriptor::empty_args(JType::INT), ACC_STATIC, |_| Ok(Value::Int(7)))
        .method("sum", MethodDescriptor::new(vec![JType::string(), JType::array_of(JType::INT)], JType::string()), ACC_PUBLIC | ACC_STATIC | ACC_VARARGS, |args| {
            let total: i32 = args[1].unwrap_object().array_elements().unwrap().iter().map(|elem| elem.unwrap_int()).sum();
            Ok(Value::string(format!("{}{}", args[0].unwrap_string(), total)))
        })
        .method("fail", MethodDescriptor::new(vec![JType::string()], JType::INT), ACC_PUBLIC | ACC_STATIC, |args| {
            Err(WasException::new(&bootstrap().illegal_argument_exception, args[0].unwrap_string()))
        })).unwrap();
    let square = classes.define(ClassBuilder::new("shapes/Square")
        .extends(&shape)
        .constructor(vec![], ACC_PUBLIC, |args| {
            args[0].unwrap_object().field_slot(0).unwrap().store(Value::Int(4));
            Ok(Value::Void)
        })
        .method("name", MethodDescriptor::empty_args(JType::string()), ACC_PUBLIC, |_| Ok(Value::string("square")))).unwrap();
    let helper = classes.define(ClassBuilder::new("shapes/Helper")
        .access_flags(0)
        .method("help", MethodDescriptor::empty_args(JType::INT), ACC_PUBLIC | ACC_STATIC, |_| Ok(Value::Int(1)))).unwrap();
    let client = classes.define(ClassBuilder::new("client/Client")
        .extends(&shape)
        .constructor(vec![], ACC_PUBLIC, |_| Ok(Value::Void))
        .method("describe", MethodDescriptor::empty_args(JType::string()), ACC_PROTECTED, |_| Ok(Value::string("client")))).unwrap();
    let stranger = classes.define(ClassBuilder::new("client/Stranger")).unwrap();
    let plugins = classes.new_loader(LoaderName::BootstrapLoader);
    let widget = classes.define(ClassBuilder::new("plugin/Widget").loader(plugins)).unwrap();
    let registry = classes.define(ClassBuilder::new("shapes/Registry")
        .method("register", MethodDescriptor::void_return(vec![JType::class(&widget)]), ACC_PUBLIC | ACC_STATIC, |_| Ok(Value::Void))).unwrap();
    Fixture { env, shape, square, helper, client, stranger, widget, registry }
}
