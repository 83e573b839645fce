use std::iter::Peekable;

use crate::{ast::Expression, error::ParseError, interpreter::lexer::Token};

pub type ParseResult<T> = Result<T, ParseError>;

/// Consumes the next token, which must equal `expected`.
///
/// # Parameters
/// - `tokens`: Token iterator providing `(Token, line)` pairs.
/// - `source`: The grammar construct being parsed, used in error messages.
/// - `expected`: The exact token the grammar requires here.
///
/// # Returns
/// The line number of the consumed token.
///
/// # Errors
/// `UnexpectedToken` if the next token differs, `UnexpectedEof` if the
/// stream is exhausted.
pub(in crate::interpreter::parser) fn expect<'a, I>(tokens: &mut Peekable<I>,
                                                    source: &'static str,
                                                    expected: &Token)
                                                    -> ParseResult<usize>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.next() {
        Some((token, line)) if token == expected => Ok(*line),
        Some((token, line)) => {
            Err(ParseError::UnexpectedToken { source,
                                              found: token.to_string(),
                                              expected: format!("'{expected}'"),
                                              line: *line })
        },
        None => {
            Err(ParseError::UnexpectedEof { source,
                                            expected: format!("'{expected}'"), })
        },
    }
}

/// Consumes the next token, which must be an identifier, and returns its
/// name.
///
/// This does not treat keywords specially; `let` or `fn` in an identifier
/// position parse as ordinary names.
pub(in crate::interpreter::parser) fn expect_identifier<'a, I>(tokens: &mut Peekable<I>,
                                                               source: &'static str)
                                                               -> ParseResult<String>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.next() {
        Some((Token::Identifier(name), _)) => Ok(name.clone()),
        Some((token, line)) => {
            Err(ParseError::UnexpectedToken { source,
                                              found: token.to_string(),
                                              expected: "an identifier".to_string(),
                                              line: *line })
        },
        None => {
            Err(ParseError::UnexpectedEof { source,
                                            expected: "an identifier".to_string(), })
        },
    }
}

/// Consumes the next token, which must be the identifier `keyword`.
pub(in crate::interpreter::parser) fn expect_keyword<'a, I>(tokens: &mut Peekable<I>,
                                                            source: &'static str,
                                                            keyword: &'static str)
                                                            -> ParseResult<()>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.next() {
        Some((Token::Identifier(name), _)) if name == keyword => Ok(()),
        Some((token, line)) => {
            Err(ParseError::UnexpectedToken { source,
                                              found: token.to_string(),
                                              expected: format!("'{keyword}'"),
                                              line: *line })
        },
        None => {
            Err(ParseError::UnexpectedEof { source,
                                            expected: format!("'{keyword}'"), })
        },
    }
}

/// Tests whether the next token equals `token` without consuming it.
pub(in crate::interpreter::parser) fn peek_is<'a, I>(tokens: &mut Peekable<I>,
                                                     token: &Token)
                                                     -> bool
    where I: Iterator<Item = &'a (Token, usize)>
{
    matches!(tokens.peek(), Some((tok, _)) if tok == token)
}

/// Tests whether the next token is the identifier `keyword`.
pub(in crate::interpreter::parser) fn peek_is_keyword<'a, I>(tokens: &mut Peekable<I>,
                                                             keyword: &str)
                                                             -> bool
    where I: Iterator<Item = &'a (Token, usize)>
{
    matches!(tokens.peek(), Some((Token::Identifier(name), _)) if name == keyword)
}

/// Tests whether the token after the next one equals `token`.
///
/// Used for the one-token lookahead that separates a function call
/// (`name (`) from a plain identifier.
pub(in crate::interpreter::parser) fn second_is<'a, I>(tokens: &Peekable<I>, token: &Token) -> bool
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut ahead = tokens.clone();
    ahead.next();
    matches!(ahead.next(), Some((tok, _)) if tok == token)
}

/// Parses the expressions of an argument list, up to a closing `)`.
///
/// The closing parenthesis is not consumed. Commas between arguments are
/// consumed when present but not required; expressions terminate themselves
/// at any token that cannot continue them, so `f([1] [2])` parses the same
/// as `f([1], [2])`.
///
/// # Errors
/// Returns a `ParseError` if an argument fails to parse or the stream ends
/// before the closing parenthesis.
pub(in crate::interpreter::parser) fn parse_expressions<'a, I>(tokens: &mut Peekable<I>,
                                                               source: &'static str)
                                                               -> ParseResult<Vec<Expression>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut expressions = Vec::new();
    while !peek_is(tokens, &Token::RParen) {
        if tokens.peek().is_none() {
            return Err(ParseError::UnexpectedEof { source,
                                                   expected: "',' or ')'".to_string(), });
        }
        expressions.push(super::expression::parse_expression(tokens)?);
        if peek_is(tokens, &Token::Comma) {
            tokens.next();
        }
    }
    Ok(expressions)
}
