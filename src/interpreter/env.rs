use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Object;

/// One scope frame: local bindings plus the link to the enclosing scope.
/// Frames are shared through Rc because a function value holds on to the
/// frame it was defined in, and that frame must outlive the call that
/// created it for closures to resolve.
pub struct Environment {
    store: RefCell<HashMap<String, Object>>,
    outer: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new_global() -> Rc<Environment> {
        Rc::new(Environment {
            store: RefCell::new(HashMap::new()),
            outer: None,
        })
    }

    /// A fresh frame chained under self. One per call invocation
    pub fn open_scope(self: &Rc<Environment>) -> Rc<Environment> {
        Rc::new(Environment {
            store: RefCell::new(HashMap::new()),
            outer: Some(self.clone()),
        })
    }

    /// Binding is always local to this frame; an outer binding of the same
    /// name is shadowed, never written
    pub fn bind(&self, name: &str, value: Object) {
        self.store.borrow_mut().insert(name.to_string(), value);
    }

    /// Walk the chain towards the root until the name is found
    pub fn lookup(&self, name: &str) -> Option<Object> {
        if let Some(value) = self.store.borrow().get(name) {
            return Some(value.clone());
        }
        match &self.outer {
            Some(outer) => outer.lookup(name),
            None => None,
        }
    }
}
