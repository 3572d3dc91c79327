//! Lexically scoped name bindings for the tree-walking evaluator.

use std::{cell::RefCell, fmt, rc::Rc};

use ahash::AHashMap;

use crate::value::Value;

/// Shared handle to an environment.
///
/// Function values keep a handle to their defining environment, so the chain
/// stays alive as long as any closure over it does.
pub type Env = Rc<RefCell<Environment>>;

/// One scope: local bindings plus a link to the enclosing scope.
pub struct Environment {
    store: AHashMap<String, Value>,
    outer: Option<Env>,
}

impl Environment {
    /// A fresh top-level environment.
    #[must_use]
    pub fn new() -> Env {
        Rc::new(RefCell::new(Self {
            store: AHashMap::new(),
            outer: None,
        }))
    }

    /// A new scope enclosed by `outer`, as created for each function call.
    #[must_use]
    pub fn new_enclosed(outer: &Env) -> Env {
        Rc::new(RefCell::new(Self {
            store: AHashMap::new(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    /// Looks up a name here, then up the outer chain.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .outer
                .as_ref()
                .and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Binds a name in this scope, shadowing any outer binding.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.store.insert(name.into(), value);
    }
}

// Environments can be cyclic through closure values; show local names only.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.store.keys().collect::<Vec<_>>())
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}
