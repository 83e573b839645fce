use std::{
    io::{self, Write},
    rc::Rc,
};

use crate::{
    ast::{
        Arithmetic, ArrayNode, Body, Condition, Expression, ForLoop, If, Item, Primary,
        Statement, Use, VarBinding, VariableDeclaration, While,
    },
    error::{Error, RuntimeError},
    interpreter::{
        evaluator::scope::{Binding, Scope},
        lexer::tokenize,
        parser,
        value::Value,
    },
    util::num::usize_to_i64_checked,
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// The interpreter state.
///
/// Holds the top-level scope, the set of files already loaded through
/// `use`, and the output stream `print` writes to. One interpreter runs
/// one program; scopes below the top level live on the Rust call stack of
/// the tree walk.
pub struct Interpreter {
    /// The top-level scope. Function definitions land here, and call
    /// frames use it as their parent.
    pub(crate) globals:      Rc<Scope>,
    /// Filenames already resolved through `use`; repeated imports are
    /// skipped.
    pub(crate) loaded_files: Vec<String>,
    /// Where `print` writes. Stdout normally, a buffer under test.
    pub(crate) output:       Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter that prints to standard output.
    #[must_use]
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Creates an interpreter that prints to the given sink.
    #[must_use]
    pub fn with_output(output: Box<dyn Write>) -> Self {
        Self { globals: Scope::root(),
               loaded_files: Vec::new(),
               output }
    }

    /// Loads and runs a source file, then calls `main` if it is defined.
    ///
    /// # Errors
    /// Any lex, parse, or runtime error the program produces.
    pub fn run_file(&mut self, path: &str, args: &[String]) -> Result<(), Error> {
        let source = read_source(path)?;
        self.loaded_files.push(path.to_string());
        self.run_source(&source, args)
    }

    /// Runs source text as the root program.
    ///
    /// Top-level items execute in order: definitions bind into the global
    /// scope, `use` directives resolve immediately, and bindings and calls
    /// run for their effects. Afterwards, if the global scope binds `main`
    /// to a function, it is called with the conventional `argc`/`argv`
    /// encoding of `args`.
    ///
    /// # Errors
    /// Any lex, parse, or runtime error the program produces.
    pub fn run_source(&mut self, source: &str, args: &[String]) -> Result<(), Error> {
        let tokens = tokenize(source)?;
        let root = parser::parse(&tokens)?;

        let globals = Rc::clone(&self.globals);
        for item in &root.items {
            match item {
                Item::Function(def) => {
                    globals.define(&def.name, Binding::Function(Rc::clone(def)));
                },
                Item::Use(use_node) => self.resolve_use(use_node)?,
                Item::Binding(binding) => self.eval_binding(binding, &globals)?,
                Item::Call(call) => {
                    self.call(call, &globals)?;
                },
            }
        }

        self.call_main(args)?;
        Ok(())
    }

    /// Resolves one `use` directive.
    ///
    /// The payload evaluates (in the global scope) to the byte sequence of
    /// a filename. Each filename is loaded at most once per interpreter.
    fn resolve_use(&mut self, use_node: &Use) -> Result<(), Error> {
        let globals = Rc::clone(&self.globals);
        let payload = self.eval_array(&use_node.payload, &globals)?;
        let filename = String::from_utf8_lossy(&payload.to_bytes()).into_owned();

        if self.loaded_files.iter().any(|loaded| *loaded == filename) {
            return Ok(());
        }
        self.loaded_files.push(filename.clone());
        self.load_module(&filename)
    }

    /// Loads an imported file as a module of definitions.
    ///
    /// Only function definitions and nested `use` directives are
    /// processed; an imported file's top-level bindings and calls are
    /// ignored.
    fn load_module(&mut self, path: &str) -> Result<(), Error> {
        let source = read_source(path)?;
        let tokens = tokenize(&source)?;
        let root = parser::parse(&tokens)?;

        for item in &root.items {
            match item {
                Item::Function(def) => {
                    self.globals.define(&def.name, Binding::Function(Rc::clone(def)));
                },
                Item::Use(use_node) => self.resolve_use(use_node)?,
                Item::Binding(_) | Item::Call(_) => {},
            }
        }
        Ok(())
    }

    /// Calls `main(argc, argv)` when the top level binds one.
    ///
    /// `argc` is a one-element array holding the argument count. `argv` is
    /// the flat length-prefixed encoding: for each argument, its length,
    /// then its bytes.
    fn call_main(&mut self, args: &[String]) -> EvalResult<()> {
        if !matches!(self.globals.get("main"), Some(Binding::Function(_))) {
            return Ok(());
        }

        let overflow = RuntimeError::Overflow { operation: "encode the argument list" };
        let argc = Value::fixed(vec![usize_to_i64_checked(args.len(), overflow.clone())?]);
        let mut argv = Vec::new();
        for arg in args {
            argv.push(usize_to_i64_checked(arg.len(), overflow.clone())?);
            argv.extend(arg.bytes().map(i64::from));
        }

        let globals = Rc::clone(&self.globals);
        self.dispatch_call("main", vec![argc, Value::fixed(argv)], &globals)?;
        Ok(())
    }

    /// Evaluates an expression: the primary first, then its postfix chain
    /// left to right.
    pub fn eval_expression(&mut self,
                           expression: &Expression,
                           scope: &Rc<Scope>)
                           -> EvalResult<Value> {
        let value = match &expression.primary {
            Primary::Arithmetic(arithmetic) => self.eval_arithmetic(arithmetic, scope)?,
            Primary::Array(array) => self.eval_array(array, scope)?,
        };
        self.apply_postfix(value, &expression.postfix, scope)
    }

    /// Evaluates both sides of an arithmetic node and combines them
    /// element-wise.
    fn eval_arithmetic(&mut self,
                       arithmetic: &Arithmetic,
                       scope: &Rc<Scope>)
                       -> EvalResult<Value> {
        let left = self.eval_expression(&arithmetic.left, scope)?;
        let right = self.eval_expression(&arithmetic.right, scope)?;
        left.arithmetic(arithmetic.op, &right)
    }

    /// Evaluates an array primary.
    ///
    /// Identifier payloads must be bound to a value; a function-bound name
    /// cannot be used as an array.
    pub(crate) fn eval_array(&mut self, array: &ArrayNode, scope: &Rc<Scope>) -> EvalResult<Value> {
        match array {
            ArrayNode::Ints(ints) => Ok(Value::fixed(ints.clone())),
            ArrayNode::Identifier(name) => match scope.get(name) {
                Some(Binding::Value(value)) => Ok(value),
                Some(Binding::Function(_)) => {
                    Err(RuntimeError::NotAnArray { name: name.clone() })
                },
                None => Err(RuntimeError::UndefinedVariable { name: name.clone() }),
            },
            ArrayNode::Call(call) => self.call(call, scope),
        }
    }

    /// Evaluates the statements of a body in order.
    ///
    /// A `Some` result is a `return` value escaping toward the enclosing
    /// call frame; the remaining statements do not run.
    pub(crate) fn eval_body(&mut self, body: &Body, scope: &Rc<Scope>) -> EvalResult<Option<Value>> {
        for statement in &body.statements {
            if let Some(value) = self.eval_statement(statement, scope)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Evaluates a single statement.
    fn eval_statement(&mut self,
                      statement: &Statement,
                      scope: &Rc<Scope>)
                      -> EvalResult<Option<Value>> {
        match statement {
            Statement::Binding(binding) => {
                self.eval_binding(binding, scope)?;
                Ok(None)
            },
            Statement::For(for_loop) => self.eval_for(for_loop, scope),
            Statement::While(while_node) => self.eval_while(while_node, scope),
            Statement::If(if_node) => Ok(self.eval_if(if_node, scope)?.0),
            Statement::Call(call) => {
                self.call(call, scope)?;
                Ok(None)
            },
            Statement::Return(ret) => Ok(Some(self.eval_expression(&ret.value, scope)?)),
        }
    }

    /// Evaluates a declaration or assignment.
    fn eval_binding(&mut self, binding: &VarBinding, scope: &Rc<Scope>) -> EvalResult<()> {
        match binding {
            VarBinding::Declaration(declaration) => self.eval_declaration(declaration, scope),
            VarBinding::Assignment(assignment) => {
                let value = self.eval_expression(&assignment.value, scope)?;
                scope.assign(&assignment.name, &value)
            },
        }
    }

    /// Evaluates a `let` declaration and binds the new value in the
    /// innermost scope.
    fn eval_declaration(&mut self,
                        declaration: &VariableDeclaration,
                        scope: &Rc<Scope>)
                        -> EvalResult<()> {
        let init = match &declaration.value {
            Some(expression) => Some(self.eval_expression(expression, scope)?),
            None => None,
        };
        let value = Value::from_descriptor(&declaration.descriptor, init)?;
        scope.define(&declaration.name, Binding::Value(value));
        Ok(())
    }

    /// Evaluates a condition.
    ///
    /// A comparison evaluates both sides and compares them. A declaration
    /// used as a test holds when it has no initializer, or when the
    /// initializer's length fits the descriptor (exactly, or at least its
    /// size for a growable descriptor); only then is the binding
    /// introduced, into the innermost scope.
    fn eval_condition(&mut self, condition: &Condition, scope: &Rc<Scope>) -> EvalResult<bool> {
        match condition {
            Condition::Compare(compare) => {
                let left = self.eval_expression(&compare.left, scope)?;
                let right = self.eval_expression(&compare.right, scope)?;
                Ok(left.compare(compare.op, &right))
            },
            Condition::Declaration(declaration) => {
                let Some(init_expression) = &declaration.value else {
                    self.eval_declaration(declaration, scope)?;
                    return Ok(true);
                };

                let init = self.eval_expression(init_expression, scope)?;
                let descriptor = &declaration.descriptor;
                let holds = match descriptor.size {
                    Some(size) => {
                        size == init.len() || (size < init.len() && descriptor.can_grow)
                    },
                    None => descriptor.can_grow,
                };
                if holds {
                    let value = Value::from_descriptor(descriptor, Some(init))?;
                    scope.define(&declaration.name, Binding::Value(value));
                }
                Ok(holds)
            },
        }
    }

    /// Evaluates an `if` chain.
    ///
    /// Each branch gets a fresh child scope shared by its condition and
    /// body, so a condition declaration is visible to the body it guards.
    /// The boolean in the result reports whether any branch ran.
    fn eval_if(&mut self, if_node: &If, scope: &Rc<Scope>) -> EvalResult<(Option<Value>, bool)> {
        let branch_scope = Scope::child(scope);
        if self.eval_condition(&if_node.condition, &branch_scope)? {
            return Ok((self.eval_body(&if_node.body, &branch_scope)?, true));
        }

        if let Some(else_if) = &if_node.else_if {
            let result = self.eval_if(else_if, &branch_scope)?;
            if result.1 {
                return Ok(result);
            }
        }
        if let Some(else_body) = &if_node.else_body {
            return Ok((self.eval_body(else_body, &Scope::child(scope))?, true));
        }
        Ok((None, false))
    }

    /// Evaluates a `while` loop.
    ///
    /// Condition and body run in a fresh child scope each iteration, so
    /// bindings do not leak across iterations.
    fn eval_while(&mut self, while_node: &While, scope: &Rc<Scope>) -> EvalResult<Option<Value>> {
        loop {
            let iteration_scope = Scope::child(scope);
            if !self.eval_condition(&while_node.condition, &iteration_scope)? {
                return Ok(None);
            }
            if let Some(value) = self.eval_body(&while_node.body, &iteration_scope)? {
                return Ok(Some(value));
            }
        }
    }

    /// Evaluates a `for` loop.
    ///
    /// The iterable evaluates once; each element is bound as a fresh
    /// one-element value in a fresh child scope.
    fn eval_for(&mut self, for_loop: &ForLoop, scope: &Rc<Scope>) -> EvalResult<Option<Value>> {
        let iterable = self.eval_expression(&for_loop.iterable, scope)?;
        for &element in iterable.as_slice() {
            let iteration_scope = Scope::child(scope);
            iteration_scope.define(&for_loop.element,
                                   Binding::Value(Value::fixed(vec![element])));
            if let Some(value) = self.eval_body(&for_loop.body, &iteration_scope)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

/// Reads a source file completely into memory.
fn read_source(path: &str) -> Result<String, RuntimeError> {
    std::fs::read_to_string(path).map_err(|_| RuntimeError::FileRead { path: path.to_string() })
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    /// A `Write` sink the test keeps a handle to after the interpreter
    /// takes ownership of its clone.
    #[derive(Clone, Default)]
    struct SharedOutput(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run(source: &str) -> (Result<(), Error>, Vec<u8>) {
        let sink = SharedOutput::default();
        let mut interpreter = Interpreter::with_output(Box::new(sink.clone()));
        let result = interpreter.run_source(source, &[]);
        let bytes = sink.0.borrow().clone();
        (result, bytes)
    }

    fn output(source: &str) -> Vec<u8> {
        let (result, bytes) = run(source);
        result.unwrap();
        bytes
    }

    fn failure(source: &str) -> RuntimeError {
        match run(source).0 {
            Err(Error::Runtime(error)) => error,
            other => panic!("expected a runtime error, got {other:?}"),
        }
    }

    #[test]
    fn top_level_bindings_and_calls_run_in_order() {
        assert_eq!(output("let x: [1] = [65]; print(x); print(x + [1]);"), b"AB");
    }

    #[test]
    fn main_runs_after_the_root_items() {
        assert_eq!(output("print(\"a\"); fn main(argc: [1], argv: [+]) -> [] { print(\"b\"); }"),
                   b"ab");
    }

    #[test]
    fn main_receives_argument_encoding() {
        let sink = SharedOutput::default();
        let mut interpreter = Interpreter::with_output(Box::new(sink.clone()));
        let args = vec!["ab".to_string(), "c".to_string()];
        interpreter.run_source("fn main(argc: [1], argv: [+]) -> [] { print(argc.append(argv)); }",
                               &args)
                   .unwrap();
        // argc 2, then each argument length-prefixed.
        assert_eq!(*sink.0.borrow(), vec![2, 2, b'a', b'b', 1, b'c']);
    }

    #[test]
    fn callee_cannot_see_caller_locals() {
        let source = "fn peek() -> [1] { return hidden; }
                      fn main(argc: [1], argv: [+]) -> [] {
                          let hidden: [1] = [1];
                          print(peek());
                      }";
        assert_eq!(failure(source),
                   RuntimeError::UndefinedVariable { name: "hidden".to_string() });
    }

    #[test]
    fn callee_sees_globals() {
        let source = "let shared: [1] = [33];
                      fn peek() -> [1] { return shared; }
                      fn main(argc: [1], argv: [+]) -> [] { print(peek()); }";
        assert_eq!(output(source), b"!");
    }

    #[test]
    fn return_escapes_nested_control_flow() {
        let source = "fn find() -> [1] {
                          for e : range([10]) {
                              if e == [3] { return e; }
                          }
                          return [99];
                      }
                      fn main(argc: [1], argv: [+]) -> [] { print(find() + [65]); }";
        assert_eq!(output(source), b"D");
    }

    #[test]
    fn call_without_return_yields_the_empty_value() {
        let source = "fn silent() -> [] { }
                      fn main(argc: [1], argv: [+]) -> [] { print(silent().size() + [48]); }";
        assert_eq!(output(source), b"0");
    }

    #[test]
    fn arity_error_names_both_counts() {
        let source = "fn two(a: [1], b: [1]) -> [] { }
                      fn main(argc: [1], argv: [+]) -> [] { two([1]); }";
        let error = failure(source);
        assert_eq!(error,
                   RuntimeError::ArityMismatch { name:     "two".to_string(),
                                                 expected: 2,
                                                 actual:   1, });
        let message = error.to_string();
        assert!(message.contains('2') && message.contains('1'), "message was: {message}");
    }

    #[test]
    fn fixed_binding_rejects_longer_assignment() {
        let source = "fn main(argc: [1], argv: [+]) -> [] {
                          let x: [2] = [1, 2];
                          x = [1, 2, 3];
                      }";
        assert_eq!(failure(source),
                   RuntimeError::AssignmentSizeMismatch { expected: 2,
                                                          actual:   3, });
    }

    #[test]
    fn assignment_reaches_outer_scopes() {
        let source = "fn main(argc: [1], argv: [+]) -> [] {
                          let x: [1] = [0];
                          if x == [0] { x = [65]; }
                          print(x);
                      }";
        assert_eq!(output(source), b"A");
    }

    #[test]
    fn while_iterations_get_fresh_scopes() {
        let source = "fn main(argc: [1], argv: [+]) -> [] {
                          let i: [1] = [0];
                          while i < [3] {
                              let fresh: [1] = [65] + i;
                              print(fresh);
                              i = i + [1];
                          }
                      }";
        assert_eq!(output(source), b"ABC");
    }

    #[test]
    fn condition_declaration_binds_only_on_success() {
        let source = "fn main(argc: [1], argv: [+]) -> [] {
                          let v: [+] = [1, 2, 3];
                          if let w: [3] = v { print(\"y\"); }
                          if let w: [2] = v { print(\"n\"); }
                          if let w: [2+] = v { print(\"g\"); }
                      }";
        assert_eq!(output(source), b"yg");
    }

    #[test]
    fn condition_declaration_without_initializer_is_true() {
        let source = "fn main(argc: [1], argv: [+]) -> [] {
                          if let w: [1] { print(w + [65]); }
                      }";
        assert_eq!(output(source), b"A");
    }

    #[test]
    fn else_branches_dispatch() {
        let source = "fn pick(n: [1]) -> [] {
                          if n == [0] { print(\"a\"); }
                          else if n == [1] { print(\"b\"); }
                          else { print(\"c\"); }
                      }
                      fn main(argc: [1], argv: [+]) -> [] {
                          pick([0]); pick([1]); pick([7]);
                      }";
        assert_eq!(output(source), b"abc");
    }

    #[test]
    fn function_bound_name_is_not_an_array() {
        let source = "fn f() -> [] { }
                      fn main(argc: [1], argv: [+]) -> [] { print(f + [1]); }";
        assert_eq!(failure(source), RuntimeError::NotAnArray { name: "f".to_string() });
    }

    #[test]
    fn value_bound_name_is_not_callable() {
        let source = "fn main(argc: [1], argv: [+]) -> [] {
                          let print: [1] = [0];
                          print([1]);
                      }";
        assert_eq!(failure(source), RuntimeError::NotAFunction { name: "print".to_string() });
    }

    #[test]
    fn undefined_function_is_reported() {
        assert_eq!(failure("fn main(argc: [1], argv: [+]) -> [] { missing(); }"),
                   RuntimeError::UndefinedFunction { name: "missing".to_string() });
    }

    #[test]
    fn evaluation_is_pure_for_literal_arithmetic() {
        // The same literal expression evaluates identically regardless of
        // what the scope contains.
        let source = "fn main(argc: [1], argv: [+]) -> [] {
                          let x: [1] = [9];
                          print(([1] + [2]) * [21]);
                      }";
        assert_eq!(output(source), b"?");
    }
}
