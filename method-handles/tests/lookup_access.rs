use std::sync::Arc;

use invoke_common::access_flags::{ACC_ABSTRACT, ACC_INTERFACE, ACC_PUBLIC, ACC_STATIC};
use method_handles::access::{ALL_MODES, PACKAGE, PUBLIC};
use method_handles::env::InvokeEnv;
use method_handles::error::InvokeError;
use method_handles::handle::HandleKind;
use method_handles::lookup::Lookup;
use method_handles::options::InvokeOptions;
use runtime_classes::builder::ClassBuilder;
use runtime_classes::object::Object;
use runtime_classes::resolution::{MethodSearch, ResolutionError};
use runtime_classes::types::{JType, MethodDescriptor};
use runtime_classes::value::Value;

use crate::common::{fixture, mt};

mod common;

fn denied<T>(res: Result<T, InvokeError>) -> bool {
    matches!(res, Err(InvokeError::AccessDenied(_)))
}

#[test]
pub fn private_members_need_private_access() {
    let f = fixture();
    let own = Lookup::lookup(&f.env, &f.shape);
    let secret = own.find_virtual(&f.shape, "secret", &mt(JType::INT, vec![])).unwrap();
    assert!(matches!(secret.kind(), HandleKind::Direct { .. }));
    let square = Object::new_instance(&f.square);
    assert_eq!(secret.invoke_exact(vec![Value::Object(square)]).unwrap().unwrap_int(), 42);
    assert!(denied(Lookup::lookup(&f.env, &f.square).find_virtual(&f.shape, "secret", &mt(JType::INT, vec![]))));
    assert!(denied(Lookup::lookup(&f.env, &f.stranger).find_virtual(&f.shape, "secret", &mt(JType::INT, vec![]))));
}

#[test]
pub fn package_private_members_stay_in_package() {
    let f = fixture();
    let neighbour = Lookup::lookup(&f.env, &f.square);
    let hidden = neighbour.find_static(&f.shape, "hidden", &mt(JType::INT, vec![])).unwrap();
    assert_eq!(hidden.invoke_exact(vec![]).unwrap().unwrap_int(), 7);
    assert!(denied(Lookup::lookup(&f.env, &f.client).find_static(&f.shape, "hidden", &mt(JType::INT, vec![]))));

    assert!(Arc::ptr_eq(&neighbour.find_class("shapes/Helper").unwrap(), &f.helper));
    assert!(denied(Lookup::lookup(&f.env, &f.client).find_class("shapes/Helper")));
    assert!(matches!(neighbour.find_class("shapes/Missing"), Err(InvokeError::Resolution(ResolutionError::NoSuchClass(_)))));
    let help = neighbour.find_static(&f.helper, "help", &mt(JType::INT, vec![])).unwrap();
    assert_eq!(help.invoke_exact(vec![]).unwrap().unwrap_int(), 1);
    assert!(denied(Lookup::lookup(&f.env, &f.client).find_static(&f.helper, "help", &mt(JType::INT, vec![]))));
}

#[test]
pub fn public_lookup_sees_only_public() {
    let f = fixture();
    let public = Lookup::public_lookup(&f.env);
    assert_eq!(public.lookup_modes(), PUBLIC);
    let area = public.find_static(&f.shape, "area", &mt(JType::INT, vec![JType::INT, JType::INT])).unwrap();
    assert_eq!(area.invoke_exact(vec![Value::Int(2), Value::Int(3)]).unwrap().unwrap_int(), 6);
    assert!(denied(public.find_virtual(&f.shape, "describe", &mt(JType::string(), vec![]))));
    assert!(denied(public.find_static(&f.helper, "help", &mt(JType::INT, vec![]))));
    assert!(denied(public.find_static(&f.shape, "hidden", &mt(JType::INT, vec![]))));
}

#[test]
pub fn protected_instance_members_narrow_the_receiver() {
    let f = fixture();
    let subclass = Lookup::lookup(&f.env, &f.client);
    let describe = subclass.find_virtual(&f.shape, "describe", &mt(JType::string(), vec![])).unwrap();
    assert_eq!(describe.type_(), &mt(JType::string(), vec![JType::class(&f.client)]));
    let client = Object::new_instance(&f.client);
    assert_eq!(describe.invoke_exact(vec![Value::Object(client.clone())]).unwrap().unwrap_string(), "client");
    let square = Object::new_instance(&f.square);
    assert!(matches!(describe.invoke_exact(vec![Value::Object(square)]), Err(InvokeError::WrongArgumentType(_))));

    let tag = subclass.find_getter(&f.shape, "tag", &JType::string()).unwrap();
    assert_eq!(tag.type_(), &mt(JType::string(), vec![JType::class(&f.client)]));
    assert!(tag.invoke_exact(vec![Value::Object(client)]).unwrap().is_null());

    let same_package = Lookup::lookup(&f.env, &f.square);
    let wide = same_package.find_virtual(&f.shape, "describe", &mt(JType::string(), vec![])).unwrap();
    assert_eq!(wide.type_(), &mt(JType::string(), vec![JType::class(&f.shape)]));
    assert!(denied(Lookup::lookup(&f.env, &f.stranger).find_virtual(&f.shape, "describe", &mt(JType::string(), vec![]))));
}

#[test]
pub fn fields() {
    let f = fixture();
    let own = Lookup::lookup(&f.env, &f.shape);
    let shape = Object::new_instance(&f.shape);
    let set_sides = own.find_setter(&f.shape, "sides", &JType::INT).unwrap();
    let get_sides = own.find_getter(&f.shape, "sides", &JType::INT).unwrap();
    assert_eq!(set_sides.type_(), &mt(JType::VOID, vec![JType::class(&f.shape), JType::INT]));
    set_sides.invoke_exact(vec![Value::Object(shape.clone()), Value::Int(3)]).unwrap();
    assert_eq!(get_sides.invoke_exact(vec![Value::Object(shape.clone())]).unwrap().unwrap_int(), 3);

    assert!(own.find_getter(&f.shape, "id", &JType::INT).is_ok());
    assert!(denied(own.find_setter(&f.shape, "id", &JType::INT)));

    let set_created = own.find_static_setter(&f.shape, "created", &JType::LONG).unwrap();
    let get_created = own.find_static_getter(&f.shape, "created", &JType::LONG).unwrap();
    set_created.invoke_exact(vec![Value::Long(1234)]).unwrap();
    assert_eq!(get_created.invoke_exact(vec![]).unwrap().unwrap_long(), 1234);

    assert!(matches!(own.find_getter(&f.shape, "created", &JType::LONG), Err(InvokeError::Resolution(ResolutionError::IncompatibleClassChange(_)))));
    assert!(matches!(own.find_getter(&f.shape, "corners", &JType::INT), Err(InvokeError::Resolution(ResolutionError::NoSuchField(_)))));
    assert!(matches!(get_sides.invoke_exact(vec![Value::Null]), Err(InvokeError::NullPointer(_))));
}

#[test]
pub fn constructors() {
    let f = fixture();
    let own = Lookup::lookup(&f.env, &f.shape);
    let new_shape = own.find_constructor(&f.shape, &mt(JType::VOID, vec![JType::INT])).unwrap();
    assert_eq!(new_shape.type_(), &mt(JType::class(&f.shape), vec![JType::INT]));
    let made = new_shape.invoke_exact(vec![Value::Int(5)]).unwrap();
    assert!(Arc::ptr_eq(made.unwrap_object().class(), &f.shape));
    assert_eq!(made.unwrap_object().field_slot(0).unwrap().load().unwrap_int(), 5);

    assert!(Lookup::lookup(&f.env, &f.square).find_constructor(&f.shape, &mt(JType::VOID, vec![])).is_ok());
    assert!(denied(Lookup::lookup(&f.env, &f.client).find_constructor(&f.shape, &mt(JType::VOID, vec![]))));
    assert!(matches!(own.find_constructor(&f.shape, &mt(JType::INT, vec![JType::INT])), Err(InvokeError::InvalidSignature(_))));
    assert!(matches!(own.find_constructor(&f.shape, &mt(JType::VOID, vec![JType::LONG])), Err(InvokeError::Resolution(ResolutionError::NoSuchMethod(_)))));
}

#[test]
pub fn special_calls_skip_overrides() {
    let f = fixture();
    let square_lookup = Lookup::lookup(&f.env, &f.square);
    let name_type = mt(JType::string(), vec![]);
    let special = square_lookup.find_special(&f.shape, "name", &name_type, &f.square).unwrap();
    assert_eq!(special.type_(), &mt(JType::string(), vec![JType::class(&f.square)]));
    let virtual_ = square_lookup.find_virtual(&f.shape, "name", &name_type).unwrap();
    let square = Value::Object(Object::new_instance(&f.square));
    assert_eq!(special.invoke_exact(vec![square.clone()]).unwrap().unwrap_string(), "shape");
    assert_eq!(virtual_.invoke_exact(vec![square]).unwrap().unwrap_string(), "square");

    assert!(denied(Lookup::lookup(&f.env, &f.client).find_special(&f.shape, "name", &name_type, &f.square)));
    assert!(denied(Lookup::public_lookup(&f.env).find_special(&f.shape, "name", &name_type, &f.square)));
    assert!(denied(Lookup::lookup(&f.env, &f.stranger).find_special(&f.shape, "name", &name_type, &f.stranger)));
}

#[test]
pub fn signatures_must_be_visible_from_the_referenced_class() {
    let f = fixture();
    let register_type = mt(JType::VOID, vec![JType::class(&f.widget)]);
    assert!(denied(Lookup::lookup(&f.env, &f.registry).find_static(&f.registry, "register", &register_type)));
    let trusted = Lookup::trusted(&f.env);
    let register = trusted.find_static(&f.registry, "register", &register_type).unwrap();
    let widget = Object::new_instance(&f.widget);
    assert!(register.invoke_exact(vec![Value::Object(widget)]).unwrap().is_void());
}

#[test]
pub fn package_only_lookups_stop_at_private_members() {
    let f = fixture();
    let package_only = Lookup::lookup(&f.env, &f.square).in_class(&f.helper);
    assert_eq!(package_only.lookup_modes(), PUBLIC | PACKAGE);
    assert!(denied(package_only.find_virtual(&f.shape, "secret", &mt(JType::INT, vec![]))));
    let name = package_only.find_virtual(&f.square, "name", &mt(JType::string(), vec![])).unwrap();
    assert_eq!(name.invoke_exact(vec![Value::Object(Object::new_instance(&f.square))]).unwrap().unwrap_string(), "square");
}

#[test]
pub fn in_class_never_gains_rights() {
    let f = fixture();
    let own = Lookup::lookup(&f.env, &f.shape);
    assert_eq!(own.lookup_modes(), ALL_MODES);
    assert!(own.has_private_access());
    let moved = own.in_class(&f.client);
    assert_eq!(moved.lookup_modes(), PUBLIC);
    assert!(!moved.has_private_access());
    assert!(denied(moved.find_virtual(&f.client, "describe", &mt(JType::string(), vec![]))));
    let nowhere = Lookup::lookup(&f.env, &f.client).in_class(&f.helper);
    assert_eq!(nowhere.lookup_modes(), 0);
    assert!(denied(nowhere.find_static(&f.shape, "area", &mt(JType::INT, vec![JType::INT, JType::INT]))));
    let trusted = Lookup::trusted(&f.env).in_class(&f.helper);
    assert!(trusted.find_static(&f.helper, "help", &mt(JType::INT, vec![])).is_ok());
    assert_eq!(format!("{:?}", Lookup::public_lookup(&f.env)), "java/lang/Object/public");
}

#[test]
pub fn bind_and_unreflect() {
    let f = fixture();
    let own = Lookup::lookup(&f.env, &f.shape);
    let square = Object::new_instance(&f.square);
    let bound = own.bind(&square, "name", &mt(JType::string(), vec![])).unwrap();
    assert_eq!(bound.type_(), &mt(JType::string(), vec![]));
    assert_eq!(bound.invoke_exact(vec![]).unwrap().unwrap_string(), "square");

    let area_desc = MethodDescriptor::new(vec![JType::INT, JType::INT], JType::INT);
    let area = f.env.resolver.resolve_method(&f.shape, "area", &area_desc, MethodSearch::Static).unwrap();
    let unreflected = own.unreflect(&area).unwrap();
    assert_eq!(unreflected.invoke_exact(vec![Value::Int(4), Value::Int(4)]).unwrap().unwrap_int(), 16);

    let sides = f.env.resolver.resolve_field(&f.shape, "sides", &JType::INT, false).unwrap();
    let getter = own.unreflect_getter(&sides).unwrap();
    let setter = own.unreflect_setter(&sides).unwrap();
    setter.invoke_exact(vec![Value::Object(square.clone()), Value::Int(8)]).unwrap();
    assert_eq!(getter.invoke_exact(vec![Value::Object(square)]).unwrap().unwrap_int(), 8);

    let init = f.env.resolver.resolve_constructor(&f.square, &MethodDescriptor::void_return(vec![])).unwrap();
    let made = Lookup::lookup(&f.env, &f.square).unreflect_constructor(&init).unwrap().invoke_exact(vec![]).unwrap();
    assert_eq!(made.unwrap_object().field_slot(0).unwrap().load().unwrap_int(), 4);
    assert!(matches!(own.unreflect_constructor(&area), Err(InvokeError::Resolution(ResolutionError::NoSuchMethod(_)))));
}

#[test]
pub fn interface_methods_dispatch_through_implementations() {
    let f = fixture();
    let label_desc = MethodDescriptor::empty_args(JType::string());
    let named = f.env.classes.define(ClassBuilder::new("shapes/Named")
        .access_flags(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT)
        .method("label", label_desc.clone(), ACC_PUBLIC, |_| Ok(Value::string("default")))
        .abstract_method("title", label_desc.clone(), ACC_PUBLIC)).unwrap();
    let plain = f.env.classes.define(ClassBuilder::new("shapes/Plain").implements(&named)
        .method("title", label_desc.clone(), ACC_PUBLIC, |_| Ok(Value::string("plain")))).unwrap();
    let fancy = f.env.classes.define(ClassBuilder::new("shapes/Fancy").implements(&named)
        .method("label", label_desc.clone(), ACC_PUBLIC, |_| Ok(Value::string("fancy")))).unwrap();
    let lookup = Lookup::lookup(&f.env, &f.shape);
    let label = lookup.find_virtual(&named, "label", &mt(JType::string(), vec![])).unwrap();
    assert!(matches!(label.kind(), HandleKind::Virtual { interface: true, .. }));
    assert_eq!(label.invoke_exact(vec![Value::Object(Object::new_instance(&plain))]).unwrap().unwrap_string(), "default");
    assert_eq!(label.invoke_exact(vec![Value::Object(Object::new_instance(&fancy))]).unwrap().unwrap_string(), "fancy");
    let title = lookup.find_virtual(&named, "title", &mt(JType::string(), vec![])).unwrap();
    assert!(matches!(title.invoke_exact(vec![Value::Object(Object::new_instance(&fancy))]), Err(InvokeError::Resolution(ResolutionError::AbstractMethod(_)))));
    let not_named = Object::new_instance(&f.square);
    assert!(matches!(label.invoke_exact(vec![Value::Object(not_named.clone())]), Err(InvokeError::WrongArgumentType(_))));
    assert!(matches!(label.invoke_with_arguments(vec![Value::Object(not_named)]), Err(InvokeError::IncompatibleReceiver(_))));
    let widened = label.as_type(&mt(JType::object(), vec![JType::object()])).unwrap();
    assert_eq!(widened.invoke_exact(vec![Value::Object(Object::new_instance(&plain))]).unwrap().unwrap_string(), "default");
    assert!(matches!(widened.invoke_exact(vec![Value::string("x")]), Err(InvokeError::IncompatibleReceiver(_))));
}

#[test]
pub fn widened_virtual_receivers_are_checked() {
    let f = fixture();
    let lookup = Lookup::lookup(&f.env, &f.shape);
    let name = lookup.find_virtual(&f.shape, "name", &mt(JType::string(), vec![])).unwrap();
    let res = name.invoke_with_arguments(vec![Value::Object(Object::new_instance(&f.square))]).unwrap();
    assert_eq!(res.unwrap_string(), "square");
    let err = name.invoke_with_arguments(vec![Value::string("x")]).unwrap_err();
    assert!(matches!(err, InvokeError::IncompatibleReceiver(_)));
    assert_eq!(err.exception_class().unwrap().name(), "java/lang/IncompatibleClassChangeError");
}

#[test]
pub fn retyped_getters_check_their_receiver() {
    let f = fixture();
    let get_sides = Lookup::lookup(&f.env, &f.shape).find_getter(&f.shape, "sides", &JType::INT).unwrap();
    let loose = get_sides.as_type(&mt(JType::INT, vec![JType::object()])).unwrap();
    assert!(matches!(loose.kind(), HandleKind::Convert { .. }));
    assert!(matches!(loose.invoke_exact(vec![Value::string("x")]), Err(InvokeError::TypeMismatch(_))));
    assert!(matches!(get_sides.invoke_with_arguments(vec![Value::string("x")]), Err(InvokeError::TypeMismatch(_))));
    let square = Object::new_instance(&f.square);
    assert_eq!(loose.invoke_exact(vec![Value::Object(square)]).unwrap().unwrap_int(), 0);
}

#[test]
pub fn member_cache_shares_direct_handles() {
    let f = fixture();
    let own = Lookup::lookup(&f.env, &f.shape);
    let area_type = mt(JType::INT, vec![JType::INT, JType::INT]);
    let hits = f.env.member_cache.hits();
    let first = own.find_static(&f.shape, "area", &area_type).unwrap();
    let second = Lookup::lookup(&f.env, &f.square).find_static(&f.shape, "area", &area_type).unwrap();
    assert!(first.is_same_handle(&second));
    assert!(f.env.member_cache.hits() > hits);
    assert!(denied(Lookup::lookup(&f.env, &f.client).find_static(&f.shape, "hidden", &mt(JType::INT, vec![]))));
    let _ = own.find_static(&f.shape, "hidden", &mt(JType::INT, vec![])).unwrap();
    assert!(denied(Lookup::lookup(&f.env, &f.client).find_static(&f.shape, "hidden", &mt(JType::INT, vec![]))));

    let uncached_env = InvokeEnv::new(InvokeOptions { member_cache: false, ..InvokeOptions::test_options() });
    let counter = uncached_env.classes.define(ClassBuilder::new("util/Counter")
        .method("zero", MethodDescriptor::empty_args(JType::INT), ACC_PUBLIC | ACC_STATIC, |_| Ok(Value::Int(0)))).unwrap();
    let lookup = Lookup::lookup(&uncached_env, &counter);
    let a = lookup.find_static(&counter, "zero", &mt(JType::INT, vec![])).unwrap();
    let b = lookup.find_static(&counter, "zero", &mt(JType::INT, vec![])).unwrap();
    assert!(!a.is_same_handle(&b));
    assert!(uncached_env.member_cache.is_empty());
    assert_eq!(uncached_env.member_cache.hits(), 0);
}
