use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    ast::FunctionDefinition,
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::Value},
};

/// What a name can be bound to.
///
/// Values and function definitions share one namespace but are
/// distinguished at the binding layer, so arithmetic only ever operates on
/// plain array values.
#[derive(Debug, Clone)]
pub enum Binding {
    /// An array value.
    Value(Value),
    /// A function definition.
    Function(Rc<FunctionDefinition>),
}

/// One frame of the scope chain.
///
/// A frame is created at the top level, at each function call, at each
/// `for` and `while` iteration, and for each `if` branch body; it is
/// dropped when its construct exits. Children hold a reference to their
/// parent and parents know nothing about their children, so the chain is
/// a tree with no ownership cycles.
#[derive(Debug, Default)]
pub struct Scope {
    parent:   Option<Rc<Scope>>,
    bindings: RefCell<HashMap<String, Binding>>,
}

impl Scope {
    /// Creates a root frame with no parent.
    #[must_use]
    pub fn root() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Creates a child frame of `parent`.
    #[must_use]
    pub fn child(parent: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self { parent:   Some(Rc::clone(parent)),
                       bindings: RefCell::new(HashMap::new()), })
    }

    /// Binds `name` in this frame, shadowing any outer binding.
    pub fn define(&self, name: &str, binding: Binding) {
        self.bindings.borrow_mut().insert(name.to_string(), binding);
    }

    /// Looks `name` up through the chain, innermost frame first.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Binding> {
        if let Some(binding) = self.bindings.borrow().get(name) {
            return Some(binding.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    /// Assigns `source` into the existing binding for `name`.
    ///
    /// The chain is walked outward to the frame holding the binding and
    /// the value is updated in place under its storage rules, so a `[2]`
    /// binding rejects a length-3 source no matter which frame performs
    /// the assignment.
    ///
    /// # Errors
    /// `UndefinedVariable` if no frame binds `name`,
    /// `FunctionNotAssignable` if the binding holds a function definition,
    /// or any error from [`Value::assign`].
    pub fn assign(&self, name: &str, source: &Value) -> EvalResult<()> {
        let mut bindings = self.bindings.borrow_mut();
        if let Some(binding) = bindings.get_mut(name) {
            return match binding {
                Binding::Value(value) => value.assign(source),
                Binding::Function(_) => {
                    Err(RuntimeError::FunctionNotAssignable { name: name.to_string() })
                },
            };
        }
        drop(bindings);

        match &self.parent {
            Some(parent) => parent.assign(name, source),
            None => Err(RuntimeError::UndefinedVariable { name: name.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward() {
        let root = Scope::root();
        root.define("x", Binding::Value(Value::fixed(vec![1])));
        let child = Scope::child(&root);

        assert!(matches!(child.get("x"), Some(Binding::Value(value))
                         if value.as_slice() == [1]));
        assert!(child.get("y").is_none());
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let root = Scope::root();
        root.define("x", Binding::Value(Value::fixed(vec![1])));
        let child = Scope::child(&root);
        child.define("x", Binding::Value(Value::fixed(vec![2])));

        assert!(matches!(child.get("x"), Some(Binding::Value(value))
                         if value.as_slice() == [2]));
        assert!(matches!(root.get("x"), Some(Binding::Value(value))
                         if value.as_slice() == [1]));
    }

    #[test]
    fn assignment_updates_the_owning_frame() {
        let root = Scope::root();
        root.define("x", Binding::Value(Value::fixed(vec![0])));
        let child = Scope::child(&root);

        child.assign("x", &Value::fixed(vec![9])).unwrap();
        assert!(matches!(root.get("x"), Some(Binding::Value(value))
                         if value.as_slice() == [9]));
    }

    #[test]
    fn assignment_to_unbound_name_fails() {
        let root = Scope::root();
        assert_eq!(Scope::child(&root).assign("ghost", &Value::fixed(vec![1])),
                   Err(RuntimeError::UndefinedVariable { name: "ghost".to_string() }));
    }

    #[test]
    fn assignment_enforces_storage_rules() {
        let root = Scope::root();
        root.define("x", Binding::Value(Value::fixed(vec![0, 0])));
        assert_eq!(root.assign("x", &Value::fixed(vec![1, 2, 3])),
                   Err(RuntimeError::AssignmentSizeMismatch { expected: 2,
                                                              actual:   3, }));
    }
}
