use std::sync::Arc;

use invoke_common::access_flags::{ACC_ABSTRACT, ACC_INTERFACE, ACC_PUBLIC, ACC_STATIC, ACC_VOLATILE};
use invoke_common::loading::LoaderName;
use invoke_common::primitive::PrimitiveType;

use crate::bootstrap::bootstrap;
use crate::builder::ClassBuilder;
use crate::class_table::ClassTable;
use crate::field_access::{FieldAccessError, RawFieldAccess, SlotFieldAccess};
use crate::instance_of::{is_assignable, is_subclass_of};
use crate::object::Object;
use crate::resolution::{select_method, MethodSearch, ResolutionError, SymbolResolver};
use crate::types::{JType, MethodDescriptor};
use crate::value::Value;
use crate::visibility::ClassVisibility;

fn animal_hierarchy(table: &ClassTable) -> (Arc<crate::RuntimeClass>, Arc<crate::RuntimeClass>) {
    let speak = MethodDescriptor::empty_args(JType::string());
    let animal = table.define(ClassBuilder::new("zoo/Animal")
        .method("speak", speak.clone(), ACC_PUBLIC, |_| Ok(Value::string("...")))
        .field("legs", JType::INT, ACC_PUBLIC)).unwrap();
    let dog = table.define(ClassBuilder::new("zoo/Dog")
        .extends(&animal)
        .method("speak", speak, ACC_PUBLIC, |_| Ok(Value::string("woof")))
        .field("name", JType::string(), ACC_PUBLIC)).unwrap();
    (animal, dog)
}

#[test]
pub fn subclassing_and_assignability() {
    let table = ClassTable::new();
    let (animal, dog) = animal_hierarchy(&table);
    assert!(is_subclass_of(&dog, &animal));
    assert!(is_subclass_of(&dog, &bootstrap().object));
    assert!(!is_subclass_of(&animal, &dog));
    assert!(is_assignable(&JType::array_of(JType::class(&dog)), &JType::array_of(JType::class(&animal))));
    assert!(is_assignable(&JType::array_of(JType::INT), &JType::object()));
    assert!(!is_assignable(&JType::array_of(JType::INT), &JType::array_of(JType::LONG)));
    assert!(!is_assignable(&JType::INT, &JType::LONG));
}

#[test]
pub fn instance_layout_includes_parent_fields() {
    let table = ClassTable::new();
    let (animal, dog) = animal_hierarchy(&table);
    assert_eq!(animal.instance_layout().len(), 1);
    assert_eq!(dog.instance_layout().len(), 2);
    let rex = Object::new_instance(&dog);
    assert!(rex.is_instance_of(&JType::class(&animal)));
    let legs = table.resolve_field(&dog, "legs", &JType::INT, false).unwrap();
    assert!(Arc::ptr_eq(&legs.class, &animal));
    SlotFieldAccess.write_field(&rex, legs.offset(), Value::Int(4), false).unwrap();
    assert_eq!(SlotFieldAccess.read_field(&rex, legs.offset(), false).unwrap().unwrap_int(), 4);
    let stranger = Object::new_instance(&animal);
    assert!(matches!(SlotFieldAccess.read_field(&stranger, dog.instance_layout().len() + 3, false), Err(FieldAccessError::MissingSlot { .. })));
}

#[test]
pub fn static_volatile_fields() {
    let table = ClassTable::new();
    let counter = table.define(ClassBuilder::new("util/Counter").field("count", JType::LONG, ACC_PUBLIC | ACC_STATIC | ACC_VOLATILE)).unwrap();
    let count = table.resolve_field(&counter, "count", &JType::LONG, true).unwrap();
    assert_eq!(SlotFieldAccess.read_static(&counter, count.offset(), true).unwrap().unwrap_long(), 0);
    SlotFieldAccess.write_static(&counter, count.offset(), Value::Long(7), true).unwrap();
    assert_eq!(SlotFieldAccess.read_static(&counter, count.offset(), true).unwrap().unwrap_long(), 7);
    assert!(matches!(table.resolve_field(&counter, "count", &JType::LONG, false), Err(ResolutionError::IncompatibleClassChange(_))));
}

#[test]
pub fn method_resolution_and_selection() {
    let table = ClassTable::new();
    let (animal, dog) = animal_hierarchy(&table);
    let speak = MethodDescriptor::empty_args(JType::string());
    let resolved = table.resolve_method(&animal, "speak", &speak, MethodSearch::Virtual).unwrap();
    assert!(Arc::ptr_eq(&resolved.class, &animal));
    let selected = select_method(&dog, &resolved).unwrap();
    assert!(Arc::ptr_eq(&selected.class, &dog));
    assert!(matches!(table.resolve_method(&animal, "speak", &speak, MethodSearch::Static), Err(ResolutionError::IncompatibleClassChange(_))));
    assert!(matches!(table.resolve_method(&animal, "bark", &speak, MethodSearch::Virtual), Err(ResolutionError::NoSuchMethod(_))));
}

#[test]
pub fn interface_default_methods_are_selected() {
    let table = ClassTable::new();
    let desc = MethodDescriptor::empty_args(JType::INT);
    let shape = table.define(ClassBuilder::new("geo/Shape")
        .access_flags(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT)
        .method("sides", desc.clone(), ACC_PUBLIC, |_| Ok(Value::Int(0)))).unwrap();
    let square = table.define(ClassBuilder::new("geo/Square").implements(&shape)).unwrap();
    assert!(matches!(table.resolve_method(&shape, "sides", &desc, MethodSearch::Virtual), Err(ResolutionError::IncompatibleClassChange(_))));
    let resolved = table.resolve_method(&shape, "sides", &desc, MethodSearch::Interface).unwrap();
    let selected = select_method(&square, &resolved).unwrap();
    assert!(Arc::ptr_eq(&selected.class, &shape));
    assert!(matches!(table.resolve_constructor(&shape, &MethodDescriptor::void_return(vec![])), Err(ResolutionError::Instantiation(_))));
}

#[test]
pub fn loaders_delegate_parent_first() {
    let table = ClassTable::new();
    let parent = table.new_loader(LoaderName::BootstrapLoader);
    let child = table.new_loader(parent);
    let in_parent = table.define(ClassBuilder::new("app/Thing").loader(parent)).unwrap();
    let in_child = table.define(ClassBuilder::new("app/Thing").loader(child)).unwrap();
    assert!(Arc::ptr_eq(&table.lookup_class(child, "app/Thing").unwrap(), &in_parent));
    assert!(table.lookup_class(LoaderName::BootstrapLoader, "app/Thing").is_none());
    assert!(table.is_ancestor_loader(parent, child));
    assert!(table.is_ancestor_loader(LoaderName::BootstrapLoader, child));
    assert!(!table.is_ancestor_loader(child, parent));
    assert!(!table.is_same_package(&in_parent, &in_child));
    assert_ne!(JType::class(&in_parent), JType::class(&in_child));
    assert!(matches!(table.define(ClassBuilder::new("app/Thing").loader(child)), Err(ResolutionError::DuplicateClass(_))));
}

#[test]
pub fn value_conversions() {
    assert!(Value::Byte(-3).widen_to(PrimitiveType::Long).unwrap().value_equals(&Value::Long(-3)));
    assert!(Value::Char(65).widen_to(PrimitiveType::Int).unwrap().value_equals(&Value::Int(65)));
    assert!(Value::Float(1.5).widen_to(PrimitiveType::Double).unwrap().value_equals(&Value::Double(1.5)));
    assert!(Value::Long(1).widen_to(PrimitiveType::Int).is_none());
    let boxed = Value::Int(42).boxed();
    assert!(boxed.unwrap_object().is_instance_of(&JType::wrapper_type(PrimitiveType::Int)));
    assert!(boxed.unwrap_object().is_instance_of(&JType::class(&bootstrap().number)));
    assert!(boxed.unboxed().unwrap().value_equals(&Value::Int(42)));
    assert!(boxed.value_equals(&Value::Int(42).boxed()));
    assert!(Value::string("a").value_equals(&Value::string("a")));
    assert!(!Value::Int(1).value_equals(&Value::Long(1)));
}
