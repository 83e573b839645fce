//! # ints
//!
//! ints is a tree-walking interpreter for a small array-oriented language
//! in which every value is an array of machine integers; scalars are
//! arrays of length one. The interpreter reads a source file, parses it
//! into an abstract syntax tree, and evaluates that tree directly,
//! resolving `use` imports and calling `main` when one is defined.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{error::Error, interpreter::evaluator::core::Interpreter};

/// Defines the structure of parsed code.
///
/// This module declares the node types that represent the syntactic
/// structure of source code as a tree. The AST is built by the parser and
/// traversed by the evaluator.
///
/// # Responsibilities
/// - Defines item, statement, and expression types for all language
///   constructs.
/// - Renders nodes back to surface syntax through `Display`.
/// - Keeps nodes immutable after construction; shared subtrees are
///   reference-counted.
pub mod ast;
/// Provides unified error types for lexing, parsing, and evaluation.
///
/// This module defines all errors that can be raised while running a
/// program. It standardizes error reporting and carries source-location
/// hints where they are available.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Attaches line numbers and detailed messages for context.
/// - Supports integration with standard error handling traits.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, the value
/// model, and error handling to provide a complete runtime for source
/// files. It exposes the public API for interpreting programs.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, and value
///   types.
/// - Provides entry points for running files and source text.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities used across the interpreter.
///
/// # Responsibilities
/// - Safe conversions between `i64` and `usize` without silent data loss.
/// - Platform terminal access for the `getchar` and `clear` builtins.
pub mod util;

/// Loads and runs a source file, forwarding `args` to its `main`.
///
/// This is the one-call entry the CLI uses. Output goes to standard
/// output; embedders who need to capture it construct an
/// [`Interpreter`] with their own sink instead.
///
/// # Errors
/// Returns an [`Error`] if the file cannot be read, lexed, or parsed, or
/// if evaluation raises a runtime error.
///
/// # Example
/// ```no_run
/// let args = vec!["world".to_string()];
/// if let Err(e) = ints::run_file("hello.ints", &args) {
///     eprintln!("Error: {e}");
/// }
/// ```
pub fn run_file(path: &str, args: &[String]) -> Result<(), Error> {
    Interpreter::new().run_file(path, args)
}
