use invoke_common::loading::LoaderName;

use crate::class_table::ClassTable;
use crate::RuntimeClass;

pub trait ClassVisibility: Send + Sync {
    /// Runtime packages: same defining loader and same package name.
    fn is_same_package(&self, a: &RuntimeClass, b: &RuntimeClass) -> bool;
    fn class_loader_of(&self, class: &RuntimeClass) -> LoaderName;
    /// Reflexive.
    fn is_ancestor_loader(&self, ancestor: LoaderName, descendant: LoaderName) -> bool;
}

impl ClassVisibility for ClassTable {
    fn is_same_package(&self, a: &RuntimeClass, b: &RuntimeClass) -> bool {
        a.loader() == b.loader() && a.package_name() == b.package_name()
    }

    fn class_loader_of(&self, class: &RuntimeClass) -> LoaderName {
        class.loader()
    }

    fn is_ancestor_loader(&self, ancestor: LoaderName, descendant: LoaderName) -> bool {
        self.loader_chain(descendant).contains(&ancestor)
    }
}
