use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::{
        ArrayDescriptor, ArrayNode, Body, Compare, CompareOp, Condition, ForLoop,
        FunctionDefinition, If, Item, Parameter, Return, Root, Statement, Use, UseKind,
        VarBinding, VariableAssignment, VariableDeclaration, While,
    },
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            expression::{parse_array, parse_expression, parse_function_call},
            utils::{
                ParseResult, expect, expect_identifier, expect_keyword, peek_is, peek_is_keyword,
                second_is,
            },
        },
    },
    util::num::i64_to_usize_checked,
};

/// Parses a whole file into its sequence of top-level items.
///
/// The next identifier selects the production: `fn` starts a function
/// definition, `use` an import directive, and anything else is either a
/// function call (when followed by `(`) or a variable binding; those two
/// require a terminating `;`. Any non-identifier token at this level is an
/// error.
pub fn parse_root<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Root>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut items = Vec::new();
    loop {
        let keyword = match tokens.peek() {
            None => break,
            Some((Token::Identifier(name), _)) => name.clone(),
            Some((token, line)) => {
                return Err(ParseError::UnexpectedToken {
                    source: "Root",
                    found: token.to_string(),
                    expected: "'fn', 'use', 'let', or a function call".to_string(),
                    line: *line,
                });
            },
        };
        match keyword.as_str() {
            "fn" => items.push(Item::Function(Rc::new(parse_function_definition(tokens)?))),
            "use" => items.push(Item::Use(parse_use(tokens)?)),
            _ => {
                if second_is(tokens, &Token::LParen) {
                    items.push(Item::Call(parse_function_call(tokens)?));
                } else {
                    items.push(Item::Binding(parse_var_binding(tokens)?));
                }
                expect(tokens, "Root", &Token::Semicolon)?;
            },
        }
    }
    Ok(Root { items })
}

/// Parses `fn NAME ( params ) -> DESCRIPTOR BODY`.
fn parse_function_definition<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<FunctionDefinition>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect_keyword(tokens, "Function Definition", "fn")?;
    let name = expect_identifier(tokens, "Function Definition")?;
    expect(tokens, "Function Definition", &Token::LParen)?;

    let mut params = Vec::new();
    while !peek_is(tokens, &Token::RParen) {
        let param_name = expect_identifier(tokens, "Function Parameter")?;
        expect(tokens, "Function Definition", &Token::Colon)?;
        let descriptor = parse_descriptor(tokens)?;
        params.push(Parameter { name: param_name,
                                descriptor });
        if peek_is(tokens, &Token::Comma) {
            tokens.next();
        }
    }
    expect(tokens, "Function Definition", &Token::RParen)?;
    expect(tokens, "Function Definition", &Token::Arrow)?;

    let output = parse_descriptor(tokens)?;
    let body = parse_body(tokens)?;

    Ok(FunctionDefinition { name,
                            params,
                            output,
                            body })
}

/// Parses an array descriptor: `[ INT? +? ]`.
pub fn parse_descriptor<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<ArrayDescriptor>
    where I: Iterator<Item = &'a (Token, usize)>
{
    expect(tokens, "Array Descriptor", &Token::LBracket)?;

    let size = match tokens.peek() {
        Some((Token::Int(value), line)) => {
            let size =
                i64_to_usize_checked(*value,
                                     ParseError::UnexpectedToken { source:   "Array Descriptor",
                                                                   found:    value.to_string(),
                                                                   expected:
                                                                       "a non-negative size"
                                                                           .to_string(),
                                                                   line:     *line, })?;
            tokens.next();
            Some(size)
        },
        _ => None,
    };

    let can_grow = peek_is(tokens, &Token::Plus);
    if can_grow {
        tokens.next();
    }

    expect(tokens, "Array Descriptor", &Token::RBracket)?;
    Ok(ArrayDescriptor { size, can_grow })
}

/// Parses `{ Statement* }`.
pub fn parse_body<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Body>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, "Body", &Token::LBrace)?;
    let mut statements = Vec::new();
    while !peek_is(tokens, &Token::RBrace) {
        if tokens.peek().is_none() {
            return Err(ParseError::UnexpectedEof { source:   "Body",
                                                   expected: "'}'".to_string(), });
        }
        statements.push(parse_statement(tokens)?);
    }
    expect(tokens, "Body", &Token::RBrace)?;
    Ok(Body { statements })
}

/// Parses a single statement.
///
/// Dispatch is on the leading identifier: `if`, `for`, `while`, and
/// `return` start control flow; anything else is a function call or a
/// variable binding, both of which require a terminating `;`. Control-flow
/// statements do not take one.
pub fn parse_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let keyword = match tokens.peek() {
        None => {
            return Err(ParseError::UnexpectedEof { source:   "Statement",
                                                   expected: "an identifier".to_string(), });
        },
        Some((Token::Identifier(name), _)) => name.clone(),
        Some((token, line)) => {
            return Err(ParseError::UnexpectedToken { source:   "Statement",
                                                     found:    token.to_string(),
                                                     expected: "an identifier".to_string(),
                                                     line:     *line, });
        },
    };

    match keyword.as_str() {
        "if" => Ok(Statement::If(parse_if(tokens)?)),
        "for" => Ok(Statement::For(parse_for(tokens)?)),
        "while" => Ok(Statement::While(parse_while(tokens)?)),
        "return" => Ok(Statement::Return(parse_return(tokens)?)),
        _ => {
            let statement = if second_is(tokens, &Token::LParen) {
                Statement::Call(parse_function_call(tokens)?)
            } else {
                Statement::Binding(parse_var_binding(tokens)?)
            };
            expect(tokens, "Statement", &Token::Semicolon)?;
            Ok(statement)
        },
    }
}

/// Parses a variable binding: a `let` declaration or an assignment.
fn parse_var_binding<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<VarBinding>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    if peek_is_keyword(tokens, "let") {
        Ok(VarBinding::Declaration(parse_variable_declaration(tokens)?))
    } else {
        Ok(VarBinding::Assignment(parse_variable_assignment(tokens)?))
    }
}

/// Parses `let NAME : DESCRIPTOR (= EXPRESSION)?`.
fn parse_variable_declaration<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<VariableDeclaration>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect_keyword(tokens, "Variable Declaration", "let")?;
    let name = expect_identifier(tokens, "Variable Declaration")?;
    expect(tokens, "Variable Declaration", &Token::Colon)?;
    let descriptor = parse_descriptor(tokens)?;

    let value = if peek_is(tokens, &Token::Equals) {
        tokens.next();
        Some(parse_expression(tokens)?)
    } else {
        None
    };

    Ok(VariableDeclaration { name,
                             descriptor,
                             value })
}

/// Parses `NAME = EXPRESSION`.
fn parse_variable_assignment<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<VariableAssignment>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let name = expect_identifier(tokens, "Variable Assignment")?;
    expect(tokens, "Variable Assignment", &Token::Equals)?;
    let value = parse_expression(tokens)?;
    Ok(VariableAssignment { name, value })
}

/// Parses an `if` statement with its optional `else if` chain and `else`
/// body.
fn parse_if<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<If>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect_keyword(tokens, "If", "if")?;
    let condition = parse_condition(tokens)?;
    let body = parse_body(tokens)?;

    let mut else_if = None;
    let mut else_body = None;
    if peek_is_keyword(tokens, "else") {
        tokens.next();
        if peek_is(tokens, &Token::LBrace) {
            else_body = Some(parse_body(tokens)?);
        } else {
            else_if = Some(Box::new(parse_if(tokens)?));
        }
    }

    Ok(If { condition,
            body,
            else_if,
            else_body })
}

/// Parses `while CONDITION BODY`.
fn parse_while<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<While>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect_keyword(tokens, "While", "while")?;
    let condition = parse_condition(tokens)?;
    let body = parse_body(tokens)?;
    Ok(While { condition, body })
}

/// Parses the condition shared by `if` and `while`: either a declaration
/// used as a test (leading `let`) or a comparison of two expressions.
fn parse_condition<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Condition>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    if peek_is_keyword(tokens, "let") {
        return Ok(Condition::Declaration(parse_variable_declaration(tokens)?));
    }

    let left = parse_expression(tokens)?;
    let op = match tokens.next() {
        Some((Token::EqualEqual, _)) => CompareOp::Eq,
        Some((Token::BangEqual, _)) => CompareOp::Ne,
        Some((Token::Less, _)) => CompareOp::Lt,
        Some((Token::LessEqual, _)) => CompareOp::Le,
        Some((Token::Greater, _)) => CompareOp::Gt,
        Some((Token::GreaterEqual, _)) => CompareOp::Ge,
        Some((token, line)) => {
            return Err(ParseError::UnexpectedToken { source:   "If Comparison",
                                                     found:    token.to_string(),
                                                     expected: "a comparison operator"
                                                         .to_string(),
                                                     line:     *line, });
        },
        None => {
            return Err(ParseError::UnexpectedEof { source:   "If Comparison",
                                                   expected: "a comparison operator".to_string(), });
        },
    };
    let right = parse_expression(tokens)?;

    Ok(Condition::Compare(Compare { op, left, right }))
}

/// Parses `for ELEMENT : ITERABLE BODY`.
fn parse_for<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<ForLoop>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect_keyword(tokens, "For Loop", "for")?;
    let element = expect_identifier(tokens, "For Loop")?;
    expect(tokens, "For Loop", &Token::Colon)?;
    let iterable = parse_expression(tokens)?;
    let body = parse_body(tokens)?;
    Ok(ForLoop { element,
                 iterable,
                 body })
}

/// Parses `return EXPRESSION ;`.
fn parse_return<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Return>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect_keyword(tokens, "Return", "return")?;
    let value = parse_expression(tokens)?;
    expect(tokens, "Return", &Token::Semicolon)?;
    Ok(Return { value })
}

/// Parses a `use` directive: `use <NAME>` or `use ARRAY`.
fn parse_use<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Use>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect_keyword(tokens, "Use", "use")?;
    if peek_is(tokens, &Token::Less) {
        tokens.next();
        let name = expect_identifier(tokens, "Use")?;
        expect(tokens, "Use", &Token::Greater)?;
        return Ok(Use { payload: ArrayNode::from_text(&name),
                        kind:    UseKind::StandardHeader, });
    }
    Ok(Use { payload: parse_array(tokens)?,
             kind:    UseKind::Path, })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{lexer::tokenize, parser::parse};

    fn root(source: &str) -> ParseResult<Root> {
        parse(&tokenize(source).unwrap())
    }

    fn rendered(source: &str) -> String {
        root(source).unwrap().to_string()
    }

    #[test]
    fn function_definition_round_trips() {
        assert_eq!(rendered("fn add(a: [1], b: [1]) -> [1] { return a + b; }"),
                   "fn add(a: [1], b: [1]) -> [1] { return (a + b); }\n");
    }

    #[test]
    fn descriptor_forms() {
        let source = "fn f(a: [5], b: [+], c: [5+], d: []) -> [] { }";
        assert_eq!(rendered(source), format!("{source}\n"));
        let parsed = root(source).unwrap();
        let Item::Function(def) = &parsed.items[0] else {
            panic!("expected a function definition");
        };
        let descriptors: Vec<ArrayDescriptor> =
            def.params.iter().map(|p| p.descriptor).collect();
        assert_eq!(descriptors,
                   vec![ArrayDescriptor { size:     Some(5),
                                          can_grow: false, },
                        ArrayDescriptor { size:     None,
                                          can_grow: true, },
                        ArrayDescriptor { size:     Some(5),
                                          can_grow: true, },
                        ArrayDescriptor { size:     None,
                                          can_grow: false, }]);
    }

    #[test]
    fn top_level_binding_requires_semicolon() {
        assert!(root("let x: [1] = [1]").is_err());
        assert!(root("let x: [1] = [1];").is_ok());
    }

    #[test]
    fn top_level_call_and_binding() {
        assert_eq!(rendered("let x: [1] = [1]; f(x);"), "let x: [1] = [1];\nf(x);\n");
    }

    #[test]
    fn non_identifier_at_root_is_rejected() {
        assert!(matches!(root("[1];"),
                         Err(ParseError::UnexpectedToken { source: "Root", .. })));
    }

    #[test]
    fn if_else_chain() {
        let source = "fn f(n: [1]) -> [] { if n < [1] { } else if n < [2] { } else { } }";
        let parsed = root(source).unwrap();
        let Item::Function(def) = &parsed.items[0] else {
            panic!("expected a function definition");
        };
        let Statement::If(if_node) = &def.body.statements[0] else {
            panic!("expected an if statement");
        };
        let chained = if_node.else_if.as_ref().expect("expected an else if");
        assert!(chained.else_body.is_some());
        assert!(if_node.else_body.is_none());
    }

    #[test]
    fn condition_declaration_form() {
        let source = "fn f(v: [+]) -> [] { if let w: [3+] = v { print(w); } }";
        let parsed = root(source).unwrap();
        let Item::Function(def) = &parsed.items[0] else {
            panic!("expected a function definition");
        };
        let Statement::If(if_node) = &def.body.statements[0] else {
            panic!("expected an if statement");
        };
        assert!(matches!(&if_node.condition, Condition::Declaration(decl)
                         if decl.name == "w" && decl.descriptor.can_grow));
    }

    #[test]
    fn while_and_for_render() {
        assert_eq!(rendered("fn f() -> [] { while i < [5] { i = i + [1]; } }"),
                   "fn f() -> [] { while i < [5] { i = (i + [1]); } }\n");
        assert_eq!(rendered("fn f() -> [] { for e : range([3]) { print(e); } }"),
                   "fn f() -> [] { for e : range([3]) { print(e); } }\n");
    }

    #[test]
    fn comparison_operators_all_parse() {
        for op in ["==", "!=", "<", "<=", ">", ">="] {
            let source = format!("fn f() -> [] {{ if a {op} b {{ }} }}");
            assert!(root(&source).is_ok(), "operator {op} failed to parse");
        }
    }

    #[test]
    fn use_forms() {
        let parsed = root("use <math> use \"lib.ints\"").unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert!(matches!(&parsed.items[0],
                         Item::Use(Use { kind: UseKind::StandardHeader, .. })));
        assert!(matches!(&parsed.items[1], Item::Use(Use { kind: UseKind::Path, .. })));
        assert_eq!(parsed.to_string(), "use <math>\nuse [108, 105, 98, 46, 105, 110, 116, 115]\n");
    }

    #[test]
    fn negative_descriptor_size_is_rejected() {
        assert!(root("let x: [-3] = [1];").is_err());
    }

    #[test]
    fn missing_arrow_is_rejected() {
        assert!(matches!(root("fn f() [] { }"),
                         Err(ParseError::UnexpectedToken { source: "Function Definition", .. })));
    }
}
