/// Builtin functions.
///
/// The table of builtin functions (`print`, `read`, `getchar`, `clear`,
/// `range`, `exit`) and their implementations.
pub mod builtin;

/// Core evaluation logic.
///
/// Contains the `Interpreter` state, expression and statement walking,
/// control flow, `use` resolution, and the `main` convention.
pub mod core;

/// Function call evaluation.
///
/// Handles call dispatch between user-defined functions and builtins,
/// frame construction, and parameter binding.
pub mod function;

/// Postfix evaluation.
///
/// Applies range slices and the built-in methods (`append`, `sqrt`,
/// `size`) to array values.
pub mod postfix;

/// Lexically nested scopes.
///
/// The scope chain mapping names to array values or function definitions.
pub mod scope;
