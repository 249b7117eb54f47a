use itertools::Itertools;

pub const OBJECT: &str = "java/lang/Object";

/// Package portion of an internal class name. The default package is "".
pub fn package_name(class_name: &str) -> &str {
    match class_name.rfind('/') {
        None => "",
        Some(idx) => &class_name[..idx],
    }
}

/// Name of the top level class enclosing a (possibly nested) class.
pub fn outermost_class_name(class_name: &str) -> &str {
    let simple_start = class_name.rfind('/').map(|idx| idx + 1).unwrap_or(0);
    match class_name[simple_start..].find('$') {
        None => class_name,
        Some(idx) => &class_name[..simple_start + idx],
    }
}

pub fn java_source_representation(class_name: &str) -> String {
    class_name.split('/').join(".")
}

pub fn short_representation(class_name: &str) -> &str {
    class_name.rsplit('/').next().unwrap_or(class_name)
}
