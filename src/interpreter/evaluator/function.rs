use std::rc::Rc;

use crate::{
    ast::{FunctionCall, FunctionDefinition},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{EvalResult, Interpreter},
            scope::{Binding, Scope},
        },
        value::Value,
    },
};

impl Interpreter {
    /// Evaluates a function call expression or statement.
    ///
    /// Arguments are fully evaluated left to right in the caller's scope
    /// before the callee is entered.
    pub fn call(&mut self, call: &FunctionCall, scope: &Rc<Scope>) -> EvalResult<Value> {
        let mut args = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            args.push(self.eval_expression(argument, scope)?);
        }
        self.dispatch_call(&call.name, args, scope)
    }

    /// Dispatches a call with already-evaluated arguments.
    ///
    /// Resolution order: a name bound (anywhere in the scope chain) to a
    /// function definition wins; a name bound to a value is a call error,
    /// even when it shadows a builtin; otherwise the builtins are
    /// consulted.
    pub fn dispatch_call(&mut self,
                         name: &str,
                         args: Vec<Value>,
                         scope: &Rc<Scope>)
                         -> EvalResult<Value> {
        match scope.get(name) {
            Some(Binding::Function(def)) => self.call_user(&def, args),
            Some(Binding::Value(_)) => Err(RuntimeError::NotAFunction { name: name.to_string() }),
            None => self.call_builtin(name, &args),
        }
    }

    /// Calls a user-defined function.
    ///
    /// The frame's parent is the top-level scope the function was defined
    /// in, not the caller's scope, so callees never observe caller locals.
    /// Each parameter is bound through its descriptor, which applies the
    /// declared storage class to the argument value. The result is the
    /// escaped `return` value, or the empty value when the body runs to
    /// completion.
    fn call_user(&mut self, def: &Rc<FunctionDefinition>, args: Vec<Value>) -> EvalResult<Value> {
        if def.params.len() != args.len() {
            return Err(RuntimeError::ArityMismatch { name:     def.name.clone(),
                                                     expected: def.params.len(),
                                                     actual:   args.len(), });
        }

        let frame = Scope::child(&self.globals);
        for (param, arg) in def.params.iter().zip(args) {
            let value = Value::from_descriptor(&param.descriptor, Some(arg))?;
            frame.define(&param.name, Binding::Value(value));
        }

        match self.eval_body(&def.body, &frame)? {
            Some(value) => Ok(value),
            None => Ok(Value::empty()),
        }
    }
}
