/// The evaluator module executes AST nodes and computes results.
///
/// The evaluator walks the tree inside a chain of scopes, performs all
/// array operations, resolves `use` imports, dispatches builtins, and
/// drives the `main` convention. It is the core execution engine of the
/// interpreter.
///
/// # Responsibilities
/// - Evaluates expressions, statements, and control flow.
/// - Manages the scope chain and function call frames.
/// - Reports runtime errors such as size mismatches or undefined names.
pub mod evaluator;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces a stream of tokens,
/// each corresponding to meaningful language elements such as integers,
/// identifiers, operators, delimiters, and string literals. This is the
/// first stage of interpretation.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with source lines.
/// - Handles numeric and string literals, identifiers, and operators.
/// - Reports lexical errors for invalid or malformed input.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser processes the token stream produced by the lexer and
/// constructs an AST that represents the syntactic structure of the
/// program. Expressions are parsed with a single-pass shunting yard
/// embedded in the recursive descent grammar.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes (items, statements,
///   expressions).
/// - Validates correct grammar and syntax, reporting errors with location
///   info.
/// - Desugars single-index ranges into their slice form.
pub mod parser;
/// The value module defines the runtime data type for evaluation.
///
/// Every runtime value is an array of machine integers with a declared
/// minimum length; storage is either fixed or growable, and the two kinds
/// differ in their assignment semantics.
///
/// # Responsibilities
/// - Defines the `Value` type and its storage classes.
/// - Implements construction from descriptors, assignment, element-wise
///   arithmetic, and comparisons.
pub mod value;
