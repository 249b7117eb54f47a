use std::sync::Arc;

use runtime_classes::class_table::ClassTable;
use runtime_classes::field_access::{RawFieldAccess, SlotFieldAccess};
use runtime_classes::resolution::SymbolResolver;
use runtime_classes::visibility::ClassVisibility;

use crate::member_cache::MemberHandleCache;
use crate::options::InvokeOptions;
use crate::tracing::tracing;

/// The collaborators and caches lookups run against.
pub struct InvokeEnv {
    pub classes: Arc<ClassTable>,
    pub resolver: Arc<dyn SymbolResolver>,
    pub visibility: Arc<dyn ClassVisibility>,
    pub field_access: Arc<dyn RawFieldAccess>,
    pub member_cache: MemberHandleCache,
    pub options: InvokeOptions,
}

impl InvokeEnv {
    pub fn new(options: InvokeOptions) -> Arc<Self> {
        let classes = Arc::new(ClassTable::new());
        Self::with_collaborators(classes.clone(), classes.clone(), classes, Arc::new(SlotFieldAccess), options)
    }

    pub fn with_collaborators(classes: Arc<ClassTable>,
                              resolver: Arc<dyn SymbolResolver>,
                              visibility: Arc<dyn ClassVisibility>,
                              field_access: Arc<dyn RawFieldAccess>,
                              options: InvokeOptions,
    ) -> Arc<Self> {
        tracing().install(&options);
        Arc::new(Self {
            classes,
            resolver,
            visibility,
            field_access,
            member_cache: MemberHandleCache::new(options.member_cache),
            options,
        })
    }
}
