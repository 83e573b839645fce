use std::io::Write;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        value::Value,
    },
    util::term,
};

/// Type alias for builtin function handlers.
///
/// A builtin receives the interpreter (for its output stream) and a slice
/// of evaluated argument values, and returns the call result.
type BuiltinFn = fn(&mut Interpreter, &[Value]) -> EvalResult<Value>;

/// One entry of the builtin table.
struct BuiltinDef {
    name:  &'static str,
    arity: usize,
    func:  BuiltinFn,
}

/// The builtin functions, consulted after user definitions.
static BUILTIN_TABLE: &[BuiltinDef] = &[
    BuiltinDef { name: "print", arity: 1, func: print },
    BuiltinDef { name: "read", arity: 1, func: read },
    BuiltinDef { name: "getchar", arity: 0, func: getchar },
    BuiltinDef { name: "clear", arity: 0, func: clear },
    BuiltinDef { name: "range", arity: 1, func: range },
    BuiltinDef { name: "exit", arity: 1, func: exit },
];

impl Interpreter {
    /// Calls a builtin by name with already-evaluated arguments.
    ///
    /// # Errors
    /// `UndefinedFunction` for an unknown name, `ArityMismatch` for the
    /// wrong argument count, and whatever the builtin itself raises.
    pub(crate) fn call_builtin(&mut self, name: &str, args: &[Value]) -> EvalResult<Value> {
        let Some(def) = BUILTIN_TABLE.iter().find(|def| def.name == name) else {
            return Err(RuntimeError::UndefinedFunction { name: name.to_string() });
        };
        if args.len() != def.arity {
            return Err(RuntimeError::ArityMismatch { name:     name.to_string(),
                                                     expected: def.arity,
                                                     actual:   args.len(), });
        }
        (def.func)(self, args)
    }
}

/// Writes the bytes of the argument (each element modulo 256) to the
/// interpreter's output stream. Returns the empty value.
fn print(interpreter: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let bytes = args[0].to_bytes();
    let _ = interpreter.output.write_all(&bytes);
    let _ = interpreter.output.flush();
    Ok(Value::empty())
}

/// Reads a file named by the argument's bytes and returns its contents as
/// a byte array.
fn read(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let path = String::from_utf8_lossy(&args[0].to_bytes()).into_owned();
    let bytes = std::fs::read(&path).map_err(|_| RuntimeError::FileRead { path: path.clone() })?;
    Ok(Value::from_bytes(&bytes))
}

/// Reads one byte from the terminal in raw mode and returns it as a
/// one-element value.
fn getchar(_: &mut Interpreter, _args: &[Value]) -> EvalResult<Value> {
    let byte = term::read_byte_raw().map_err(|_| RuntimeError::BadArgument {
        function: "getchar",
        details: "could not read from the terminal".to_string(),
    })?;
    Ok(Value::from_bytes(&[byte]))
}

/// Clears the terminal. Returns the empty value.
fn clear(_: &mut Interpreter, _args: &[Value]) -> EvalResult<Value> {
    term::clear_terminal();
    Ok(Value::empty())
}

/// Returns `[0, 1, ..., n-1]` for a one-element non-negative argument.
fn range(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let arg = &args[0];
    if arg.len() != 1 {
        return Err(RuntimeError::BadArgument { function: "range",
                                               details:  format!("expected 1 argument with size \
                                                                  [1] but received [{}]",
                                                                 arg.len()), });
    }
    let length = arg.as_slice()[0];
    if length < 0 {
        return Err(RuntimeError::BadArgument { function: "range",
                                               details:  format!("expected 1 non-negative \
                                                                  argument with size [1] but \
                                                                  received the value {arg}"), });
    }
    Ok(Value::fixed((0..length).collect()))
}

/// Terminates the process with the argument's first element as the exit
/// status. Does not return.
#[allow(clippy::cast_possible_truncation)]
fn exit(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let Some(&code) = args[0].as_slice().first() else {
        return Err(RuntimeError::BadArgument { function: "exit",
                                               details:  "expected 1 argument with size [1]"
                                                   .to_string(), });
    };
    std::process::exit(code as i32);
}
