use crate::{ast::Root, interpreter::lexer::Token, error::ParseError};

/// Expression parsing.
///
/// Contains the shunting-yard expression parser and everything an
/// expression can contain: array literals, postfix chains, ranges, method
/// calls, and function calls.
pub mod expression;

/// Statement and top-level parsing.
///
/// Implements the recursive descent grammar for root items, function
/// definitions, `use` directives, bodies, and all statement forms.
pub mod statement;

/// Parser utilities.
///
/// Provides the `expect` helpers and shared list parsing the grammar
/// productions are built from.
pub mod utils;

/// Parses a complete token stream into a [`Root`].
///
/// # Errors
/// Returns a [`ParseError`] when the tokens do not form a valid program.
///
/// # Example
/// ```
/// use ints::interpreter::{lexer::tokenize, parser::parse};
///
/// let tokens = tokenize("fn main(argc: [1], argv: [+]) -> [] { print(\"hi\"); }").unwrap();
/// let root = parse(&tokens).unwrap();
/// assert_eq!(root.items.len(), 1);
/// ```
pub fn parse(tokens: &[(Token, usize)]) -> Result<Root, ParseError> {
    let mut iter = tokens.iter().peekable();
    statement::parse_root(&mut iter)
}
