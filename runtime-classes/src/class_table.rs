use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use invoke_common::loading::{LoaderIndex, LoaderName};

use crate::bootstrap::bootstrap;
use crate::builder::ClassBuilder;
use crate::resolution::ResolutionError;
use crate::RuntimeClass;

/// Defined classes, keyed by defining loader and name, plus the loader delegation tree.
pub struct ClassTable {
    classes: RwLock<HashMap<(LoaderName, String), Arc<RuntimeClass>>>,
    loader_parents: RwLock<HashMap<LoaderIndex, LoaderName>>,
    next_loader: AtomicUsize,
}

impl ClassTable {
    pub fn new() -> Self {
        let classes = bootstrap().all().into_iter()
            .map(|class| ((LoaderName::BootstrapLoader, class.name().to_string()), class))
            .collect();
        Self {
            classes: RwLock::new(classes),
            loader_parents: RwLock::new(HashMap::new()),
            next_loader: AtomicUsize::new(0),
        }
    }

    pub fn new_loader(&self, parent: LoaderName) -> LoaderName {
        let index = LoaderIndex(self.next_loader.fetch_add(1, Ordering::SeqCst));
        self.loader_parents.write().insert(index, parent);
        LoaderName::UserDefinedLoader(index)
    }

    pub fn loader_parent(&self, loader: LoaderName) -> Option<LoaderName> {
        match loader {
            LoaderName::BootstrapLoader => None,
            LoaderName::UserDefinedLoader(index) => Some(self.loader_parents.read().get(&index).copied().unwrap_or(LoaderName::BootstrapLoader)),
        }
    }

    /// The loader followed by its ancestors, ending with the bootstrap loader.
    pub fn loader_chain(&self, loader: LoaderName) -> Vec<LoaderName> {
        let mut res = vec![loader];
        let mut current = loader;
        while let Some(parent) = self.loader_parent(current) {
            res.push(parent);
            current = parent;
        }
        res
    }

    pub fn register(&self, class: Arc<RuntimeClass>) -> Result<Arc<RuntimeClass>, ResolutionError> {
        let key = (class.loader(), class.name().to_string());
        let mut guard = self.classes.write();
        if guard.contains_key(&key) {
            return Err(ResolutionError::DuplicateClass(format!("{}{}", key.1, key.0)));
        }
        debug!("defined class {:?}", class);
        guard.insert(key, class.clone());
        Ok(class)
    }

    pub fn define(&self, builder: ClassBuilder) -> Result<Arc<RuntimeClass>, ResolutionError> {
        self.register(builder.build())
    }

    /// Parent-first lookup through the delegation chain.
    pub fn lookup_class(&self, loader: LoaderName, name: &str) -> Option<Arc<RuntimeClass>> {
        let guard = self.classes.read();
        self.loader_chain(loader).into_iter().rev().find_map(|loader| guard.get(&(loader, name.to_string())).cloned())
    }

    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}
