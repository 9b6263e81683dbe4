//! Run-scoped state shared by every evaluation against one module.
//!
//! The environment owns the module, the native registry, the configuration
//! and the memo tables: object singletons, enum entries, static fields and
//! synthesized call adaptors. Cloning an environment shares all of them,
//! so interpreters built from clones see the same singletons while
//! running on their own call stacks.

mod adaptor;

use std::cell::{Ref, RefMut};
use std::rc::Rc;

use ctfe_ir::{ClassId, EnumEntryId, FieldId, FunctionId, IrModule};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::bridge::NativeRegistry;
use crate::config::{Configuration, Platform};
use crate::state::{Shared, State};

/// Call shape a function is adapted to.
///
/// The same function needs different adaptors when invoked with a bound
/// dispatch receiver, a bound extension receiver, or as the target of a
/// delegating constructor call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub function: FunctionId,
    pub has_dispatch: bool,
    pub has_extension: bool,
    pub delegating_constructor: bool,
}

impl FunctionShape {
    pub fn call(function: FunctionId, has_dispatch: bool, has_extension: bool) -> Self {
        FunctionShape {
            function,
            has_dispatch,
            has_extension,
            delegating_constructor: false,
        }
    }

    pub fn delegating(function: FunctionId) -> Self {
        FunctionShape {
            function,
            has_dispatch: false,
            has_extension: false,
            delegating_constructor: true,
        }
    }
}

#[derive(Debug, Default)]
struct Caches {
    objects: FxHashMap<ClassId, State>,
    enum_entries: FxHashMap<EnumEntryId, State>,
    statics: FxHashMap<FieldId, State>,
    adaptors: FxHashMap<FunctionShape, FunctionId>,
}

#[derive(Clone, Debug)]
pub struct Environment {
    module: Shared<IrModule>,
    natives: Rc<NativeRegistry>,
    config: Configuration,
    caches: Shared<Caches>,
    exception_classes: Rc<FxHashSet<ClassId>>,
}

impl Environment {
    pub fn new(module: IrModule, natives: NativeRegistry, config: Configuration) -> Self {
        let throwable = module.prelude().throwable;
        let exception_classes = module
            .class_ids()
            .filter(|&class| module.is_subclass(class, throwable))
            .collect();
        Environment {
            module: Shared::new(module),
            natives: Rc::new(natives),
            config,
            caches: Shared::new(Caches::default()),
            exception_classes: Rc::new(exception_classes),
        }
    }

    /// Borrows the module. The borrow must end before any call that
    /// mutates it.
    #[inline]
    pub fn module(&self) -> Ref<'_, IrModule> {
        self.module.borrow()
    }

    #[inline]
    pub fn module_mut(&self) -> RefMut<'_, IrModule> {
        self.module.borrow_mut()
    }

    #[inline]
    pub fn natives(&self) -> &NativeRegistry {
        &self.natives
    }

    #[inline]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    #[inline]
    pub fn platform(&self) -> Platform {
        self.config.platform
    }

    /// Whether `class` is `kotlin.Throwable` or one of its subclasses.
    pub fn is_exception_class(&self, class: ClassId) -> bool {
        self.exception_classes.contains(&class)
    }

    /// Registered exception class named `fq_name`.
    pub fn exception_class_named(&self, fq_name: &str) -> Option<ClassId> {
        self.module()
            .class_by_fq_name(fq_name)
            .filter(|&class| self.is_exception_class(class))
    }

    // Singletons

    pub fn object(&self, class: ClassId) -> Option<State> {
        self.caches.borrow().objects.get(&class).cloned()
    }

    /// Records the singleton of `class`. The first instance wins.
    pub fn memoize_object(&self, class: ClassId, state: State) -> State {
        debug!(?class, "memoized object");
        self.caches
            .borrow_mut()
            .objects
            .entry(class)
            .or_insert(state)
            .clone()
    }

    pub fn enum_entry(&self, entry: EnumEntryId) -> Option<State> {
        self.caches.borrow().enum_entries.get(&entry).cloned()
    }

    pub fn memoize_enum_entry(&self, entry: EnumEntryId, state: State) -> State {
        debug!(?entry, "memoized enum entry");
        self.caches
            .borrow_mut()
            .enum_entries
            .entry(entry)
            .or_insert(state)
            .clone()
    }

    pub fn static_field(&self, field: FieldId) -> Option<State> {
        self.caches.borrow().statics.get(&field).cloned()
    }

    pub fn memoize_static_field(&self, field: FieldId, state: State) -> State {
        self.caches
            .borrow_mut()
            .statics
            .entry(field)
            .or_insert(state)
            .clone()
    }

    /// Overwrites a static field; only `SetField` without a receiver does this.
    pub fn set_static_field(&self, field: FieldId, state: State) {
        self.caches.borrow_mut().statics.insert(field, state);
    }

    // Function cache

    /// Adaptor function for calling `shape.function` with that shape,
    /// synthesized on first use.
    pub fn function_adaptor(&self, shape: FunctionShape) -> FunctionId {
        if let Some(&adaptor) = self.caches.borrow().adaptors.get(&shape) {
            return adaptor;
        }
        let adaptor = adaptor::synthesize(&mut self.module.borrow_mut(), shape);
        debug!(?shape, ?adaptor, "synthesized call adaptor");
        self.caches.borrow_mut().adaptors.insert(shape, adaptor);
        adaptor
    }

    pub fn adaptor_count(&self) -> usize {
        self.caches.borrow().adaptors.len()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
