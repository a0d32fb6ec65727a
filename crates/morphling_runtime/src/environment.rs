use std::{
    cell::{RefCell, RefMut},
    sync::Arc,
};

use fxhash::FxHashMap;
use morphling_core::TemplateProgram;

use crate::{
    dom::{DomHelper, SimpleDom},
    helpers::{Hash, Helper, HelperOptions, HelperRegistry},
    hooks::Hooks,
    Scope, Value,
};

/// Everything a render needs besides the template and the data:
/// the hook table, helpers, partials and the DOM.
pub struct Environment {
    pub hooks: Hooks,
    pub helpers: HelperRegistry,
    pub partials: FxHashMap<String, Arc<TemplateProgram>>,
    dom: RefCell<Box<dyn DomHelper>>,
}

impl Environment {
    pub fn new(dom: impl DomHelper + 'static) -> Self {
        Environment {
            hooks: Hooks::default(),
            helpers: Default::default(),
            partials: Default::default(),
            dom: RefCell::new(Box::new(dom)),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Mutable access to the DOM.
    /// The borrow must not be held while calling hooks or helpers.
    #[inline]
    pub fn dom(&self) -> RefMut<'_, dyn DomHelper + 'static> {
        RefMut::map(self.dom.borrow_mut(), |dom| dom.as_mut())
    }

    pub fn register_partial(&mut self, name: impl Into<String>, program: Arc<TemplateProgram>) {
        self.partials.insert(name.into(), program);
    }

    pub fn register_helper<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Scope, &[Value], &Hash, &HelperOptions, &Environment) -> Value + 'static,
    {
        self.helpers.register(name, Helper::custom(f));
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(SimpleDom::new())
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("helpers", &self.helpers)
            .field("partials", &self.partials.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
