use std::iter::Peekable;

use crate::{
    ast::{
        ArithmeticOp, ArrayNode, ArrayRange, Expression, FunctionCall, MethodCall, PostfixOp,
        Primary, RangeBound,
    },
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::utils::{
            ParseResult, expect, expect_identifier, parse_expressions, peek_is, second_is,
        },
    },
    util::num::i64_to_usize_checked,
};

/// One entry of the shunting-yard operator stack.
///
/// The left parenthesis lives on the operator stack as a sentinel with the
/// lowest precedence, so draining on a closing parenthesis stops at it and
/// ordinary operator pushes never pop past it. The sentinel remembers how
/// long the output queue was when the group opened; everything pushed
/// after that belongs to the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackOp {
    /// The `(` sentinel, carrying the output length at its position.
    Paren(usize),
    /// A pending arithmetic operator.
    Operator(ArithmeticOp),
}

/// One entry of the output queue, in reverse Polish order.
#[derive(Debug)]
enum RpnItem {
    Operand(Expression),
    Operator(ArithmeticOp),
}

const fn precedence(op: ArithmeticOp) -> u8 {
    match op {
        ArithmeticOp::Add | ArithmeticOp::Sub => 1,
        ArithmeticOp::Mul | ArithmeticOp::Div => 2,
    }
}

const fn stack_precedence(op: StackOp) -> u8 {
    match op {
        StackOp::Paren(_) => 0,
        StackOp::Operator(op) => precedence(op),
    }
}

/// Maps an operator token to its arithmetic operator, if it is one.
const fn arithmetic_op(token: &Token) -> Option<ArithmeticOp> {
    match token {
        Token::Plus => Some(ArithmeticOp::Add),
        Token::Minus => Some(ArithmeticOp::Sub),
        Token::Star => Some(ArithmeticOp::Mul),
        Token::Slash => Some(ArithmeticOp::Div),
        _ => None,
    }
}

/// Parses an expression with a single-pass shunting yard.
///
/// The parser consumes tokens until it reaches a `)` at parenthesis depth
/// zero or any token that is neither an operator nor the start of a primary
/// (`;`, `{`, `,`, `]`, `:`, ...); that terminator is left in the stream
/// for the caller.
///
/// Primaries are array nodes (literals, identifiers, calls) with their
/// postfix chain attached immediately, so postfix binds tighter than any
/// arithmetic operator: `a[0] + b` is `(a[0]) + b`. A closing parenthesis
/// reduces its group to a single operand, so a postfix chain can also
/// follow a parenthesized expression. A bare integer literal is rejected
/// here; all integer values arrive wrapped in `[...]` or string literals.
///
/// When the pass ends, pending operators drain into the output queue and
/// the queue, now in reverse Polish order, folds into a tree of arithmetic
/// nodes.
///
/// # Errors
/// - `EmptyExpression` when no tokens formed an operand.
/// - `IntLiteralInExpression` for a bare integer literal.
/// - `UnbalancedParentheses` / `UnclosedParenthesis` for parenthesis
///   mismatches in either direction.
/// - `MalformedExpression` when operators and operands do not combine into
///   a single tree.
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expression>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let start_line = tokens.peek().map_or(0, |(_, line)| *line);

    let mut output: Vec<RpnItem> = Vec::new();
    let mut operators: Vec<StackOp> = Vec::new();
    let mut depth = 0usize;

    loop {
        match tokens.peek() {
            None => break,
            Some((Token::Identifier(_) | Token::Str(_) | Token::LBracket, _)) => {
                let array = parse_array(tokens)?;
                let postfix = parse_postfix(tokens)?;
                output.push(RpnItem::Operand(Expression { primary: Primary::Array(array),
                                                          postfix }));
            },
            Some((Token::Int(_), line)) => {
                return Err(ParseError::IntLiteralInExpression { line: *line });
            },
            Some((Token::LParen, _)) => {
                tokens.next();
                operators.push(StackOp::Paren(output.len()));
                depth += 1;
            },
            Some((Token::RParen, line)) => {
                if depth == 0 {
                    break;
                }
                let line = *line;
                tokens.next();
                let mark = loop {
                    match operators.pop() {
                        Some(StackOp::Operator(op)) => output.push(RpnItem::Operator(op)),
                        Some(StackOp::Paren(mark)) => break mark,
                        None => return Err(ParseError::UnbalancedParentheses { line }),
                    }
                };
                depth -= 1;

                // Reduce the group to a single operand so a postfix chain
                // can attach to it: in `(x + y).size()` the method applies
                // to the sum, not to y.
                let group = output.split_off(mark);
                let mut expression = fold_rpn(group, line)?;
                expression.postfix.extend(parse_postfix(tokens)?);
                output.push(RpnItem::Operand(expression));
            },
            Some((token, _)) => {
                let Some(op) = arithmetic_op(token) else {
                    break;
                };
                tokens.next();
                while let Some(top) = operators.last().copied() {
                    if stack_precedence(top) < precedence(op) {
                        break;
                    }
                    operators.pop();
                    if let StackOp::Operator(popped) = top {
                        output.push(RpnItem::Operator(popped));
                    }
                }
                operators.push(StackOp::Operator(op));
            },
        }
    }

    while let Some(op) = operators.pop() {
        match op {
            StackOp::Operator(op) => output.push(RpnItem::Operator(op)),
            StackOp::Paren(_) => return Err(ParseError::UnclosedParenthesis { line: start_line }),
        }
    }

    fold_rpn(output, start_line)
}

/// Folds a reverse-Polish queue into a single expression tree.
///
/// Each operator takes the last two produced operands, so equal-precedence
/// runs fold into left-deep trees.
fn fold_rpn(output: Vec<RpnItem>, line: usize) -> ParseResult<Expression> {
    if output.is_empty() {
        return Err(ParseError::EmptyExpression { line });
    }

    let mut stack: Vec<Expression> = Vec::new();
    for item in output {
        match item {
            RpnItem::Operand(expression) => stack.push(expression),
            RpnItem::Operator(op) => {
                let right = stack.pop()
                                 .ok_or(ParseError::MalformedExpression { line })?;
                let left = stack.pop()
                                .ok_or(ParseError::MalformedExpression { line })?;
                stack.push(Expression::from_arithmetic(op, left, right));
            },
        }
    }

    let expression = stack.pop().ok_or(ParseError::MalformedExpression { line })?;
    if !stack.is_empty() {
        return Err(ParseError::MalformedExpression { line });
    }
    Ok(expression)
}

/// Parses an array primary.
///
/// - An identifier followed by `(` is a function call payload.
/// - Any other identifier is a reference to a bound name.
/// - A string literal becomes its byte sequence, one element per byte.
/// - `[ int (, int)* ]` is a literal integer sequence. A trailing comma is
///   accepted.
pub fn parse_array<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<ArrayNode>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.peek() {
        Some((Token::Identifier(_), _)) => {
            if second_is(tokens, &Token::LParen) {
                Ok(ArrayNode::Call(parse_function_call(tokens)?))
            } else {
                Ok(ArrayNode::Identifier(expect_identifier(tokens, "Array")?))
            }
        },
        Some((Token::Str(text), _)) => {
            let node = ArrayNode::from_text(text);
            tokens.next();
            Ok(node)
        },
        _ => {
            expect(tokens, "Array", &Token::LBracket)?;
            let mut ints = Vec::new();
            loop {
                match tokens.peek() {
                    Some((Token::RBracket, _)) => {
                        tokens.next();
                        break;
                    },
                    Some((Token::Int(value), _)) => {
                        ints.push(*value);
                        tokens.next();
                        if !peek_is(tokens, &Token::RBracket) {
                            expect(tokens, "Array", &Token::Comma)?;
                        }
                    },
                    Some((token, line)) => {
                        return Err(ParseError::UnexpectedToken {
                            source: "Array",
                            found: token.to_string(),
                            expected: "an int literal or ']'".to_string(),
                            line: *line,
                        });
                    },
                    None => {
                        return Err(ParseError::UnexpectedEof { source:   "Array",
                                                               expected: "']'".to_string(), });
                    },
                }
            }
            Ok(ArrayNode::Ints(ints))
        },
    }
}

/// Parses the postfix chain following a primary: zero or more `[...]`
/// ranges and `.name(...)` method calls, in source order.
pub fn parse_postfix<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<PostfixOp>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut ops = Vec::new();
    loop {
        if peek_is(tokens, &Token::LBracket) {
            ops.push(PostfixOp::Range(parse_range(tokens)?));
        } else if peek_is(tokens, &Token::Dot) {
            ops.push(PostfixOp::Method(parse_method(tokens)?));
        } else {
            break;
        }
    }
    Ok(ops)
}

/// Converts an integer literal into a range index.
fn literal_bound(value: i64, line: usize) -> ParseResult<usize> {
    i64_to_usize_checked(value,
                         ParseError::UnexpectedToken { source:   "Array Range",
                                                       found:    value.to_string(),
                                                       expected: "a non-negative integer"
                                                           .to_string(),
                                                       line })
}

/// Parses a `[...]` range following a primary.
///
/// `[i]` is sugar for `[i : i+1]`; with an expression index the end bound
/// becomes the expression plus `[1]`. The full form is
/// `[ start? : end? ]` where each bound is a literal or an expression.
fn parse_range<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<ArrayRange>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, "Array Range", &Token::LBracket)?;

    let mut start = None;
    match tokens.peek() {
        Some((Token::Int(value), line)) => {
            let index = literal_bound(*value, *line)?;
            tokens.next();
            if peek_is(tokens, &Token::RBracket) {
                tokens.next();
                return Ok(ArrayRange { start: Some(RangeBound::Literal(index)),
                                       end:   Some(RangeBound::Literal(index + 1)), });
            }
            start = Some(RangeBound::Literal(index));
        },
        Some((Token::Colon, _)) => {},
        _ => {
            let expression = parse_expression(tokens)?;
            if peek_is(tokens, &Token::RBracket) {
                tokens.next();
                let end = Expression::from_arithmetic(ArithmeticOp::Add,
                                                      expression.clone(),
                                                      Expression::from_ints(vec![1]));
                return Ok(ArrayRange { start: Some(RangeBound::Expression(Box::new(expression))),
                                       end:   Some(RangeBound::Expression(Box::new(end))), });
            }
            start = Some(RangeBound::Expression(Box::new(expression)));
        },
    }

    expect(tokens, "Array Range", &Token::Colon)?;

    let end = match tokens.peek() {
        Some((Token::Int(value), line)) => {
            let index = literal_bound(*value, *line)?;
            tokens.next();
            Some(RangeBound::Literal(index))
        },
        Some((Token::RBracket, _)) => None,
        _ => Some(RangeBound::Expression(Box::new(parse_expression(tokens)?))),
    };

    expect(tokens, "Array Range", &Token::RBracket)?;
    Ok(ArrayRange { start, end })
}

/// Parses a `.name(args)` method call.
fn parse_method<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<MethodCall>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, "Method", &Token::Dot)?;
    let name = expect_identifier(tokens, "Method")?;
    expect(tokens, "Method", &Token::LParen)?;
    let arguments = parse_expressions(tokens, "Method")?;
    expect(tokens, "Method", &Token::RParen)?;
    Ok(MethodCall { name, arguments })
}

/// Parses a `name(args)` function call.
pub fn parse_function_call<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<FunctionCall>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let name = expect_identifier(tokens, "Function Call")?;
    expect(tokens, "Function Call", &Token::LParen)?;
    let arguments = parse_expressions(tokens, "Function Call")?;
    expect(tokens, "Function Call", &Token::RParen)?;
    Ok(FunctionCall { name, arguments })
}
