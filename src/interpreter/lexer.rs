use logos::Logos;

use crate::error::LexError;

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the language.
///
/// Keywords (`fn`, `let`, `if`, ...) are not tokens of their own; they lex
/// as ordinary identifiers and the parser dispatches on their text. This
/// keeps the token alphabet identical for array literals, identifiers,
/// calls, and postfixes, which all share it.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
#[logos(error = LexErrorKind)]
pub enum Token {
    /// Identifier tokens; variable or function names such as `x` or `main`.
    #[regex(r"[a-zA-Z][a-zA-Z0-9]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// Integer literal tokens, such as `42` or `-3`.
    ///
    /// A `-` immediately followed by a digit is part of the literal, so
    /// `x-1` lexes as `x` followed by `-1` rather than as a subtraction.
    #[regex(r"-?[0-9]+", parse_int)]
    Int(i64),
    /// String literal tokens. The carried text is already escape-decoded.
    #[regex(r#""([^"\\]|\\[\s\S])*""#, parse_string)]
    Str(String),
    /// `->`
    #[token("->")]
    Arrow,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `=`
    #[token("=")]
    Equals,
    /// `!`
    #[token("!")]
    Bang,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `:`
    #[token(":")]
    Colon,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `.`
    #[token(".")]
    Dot,
    /// `,`
    #[token(",")]
    Comma,

    /// Newlines bump the line counter and are otherwise skipped.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        lex.extras.line_start = lex.span().end;
        logos::Skip
    })]
    NewLine,
    /// Spaces, tabs and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number and the byte offset of that line's start,
/// used for error reporting and diagnostics.
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line:       usize,
    /// Byte offset where the current line begins.
    pub line_start: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line:       1,
               line_start: 0, }
    }
}

/// Error detail produced inside lexer callbacks.
///
/// This is the raw `logos` error type; [`tokenize`] enriches it with the
/// source location and turns it into a [`LexError`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A character no rule matches.
    #[default]
    UnexpectedCharacter,
    /// A `\` escape the language does not define.
    UnknownEscape(char),
    /// An integer literal outside the 64-bit range.
    LiteralTooLarge,
}

/// Parses an integer literal from the current token slice.
fn parse_int(lex: &logos::Lexer<Token>) -> Result<i64, LexErrorKind> {
    lex.slice().parse().map_err(|_| LexErrorKind::LiteralTooLarge)
}

/// Decodes a string literal from the current token slice.
///
/// The surrounding quotes are stripped and the escape sequences
/// `\n \t \r \\ \" \' \0` are replaced by the bytes they denote. Any other
/// character after a backslash is an error. Literal newlines are legal
/// inside a string and advance the lexer's line counter.
fn parse_string(lex: &mut logos::Lexer<Token>) -> Result<String, LexErrorKind> {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.char_indices();
    while let Some((offset, c)) = chars.next() {
        if c == '\\' {
            // The token regex only matches backslashes in pairs, so the
            // escaped character is always present.
            let Some((_, escaped)) = chars.next() else {
                return Err(LexErrorKind::UnexpectedCharacter);
            };
            result.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            '\\' => '\\',
                            '"' => '"',
                            '\'' => '\'',
                            '0' => '\0',
                            other => return Err(LexErrorKind::UnknownEscape(other)),
                        });
        } else {
            if c == '\n' {
                lex.extras.line += 1;
                lex.extras.line_start = lex.span().start + offset + 1;
            }
            result.push(c);
        }
    }
    Ok(result)
}

/// Turns source text into a flat token sequence.
///
/// Each token is paired with the line it ends on. Tokenization is pure and
/// total: any input either produces a token list or a single [`LexError`]
/// describing the first offending position.
///
/// # Errors
/// Returns a [`LexError`] for characters outside the alphabet, unknown
/// escape sequences, oversized integer literals, and unterminated strings.
///
/// # Example
/// ```
/// use ints::interpreter::lexer::{Token, tokenize};
///
/// let tokens = tokenize("x-1").unwrap();
/// assert_eq!(tokens[0].0, Token::Identifier("x".to_string()));
/// assert_eq!(tokens[1].0, Token::Int(-1));
/// ```
pub fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(token) = lexer.next() {
        match token {
            Ok(tok) => tokens.push((tok, lexer.extras.line)),
            Err(kind) => {
                let line = lexer.extras.line;
                return Err(match kind {
                               LexErrorKind::UnknownEscape(escape) => {
                                   LexError::UnknownEscape { escape, line }
                               },
                               LexErrorKind::LiteralTooLarge => LexError::LiteralTooLarge { line },
                               LexErrorKind::UnexpectedCharacter => {
                                   let slice = lexer.slice();
                                   if slice.starts_with('"') {
                                       LexError::UnterminatedString { line }
                                   } else {
                                       let column =
                                           lexer.span().start - lexer.extras.line_start + 1;
                                       LexError::UnexpectedCharacter { found: slice.chars()
                                                                                   .next()
                                                                                   .unwrap_or('\0'),
                                                                       line,
                                                                       column }
                                   }
                               },
                           });
            },
        }
    }

    Ok(tokens)
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "{name}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(text) => write!(f, "\"{text}\""),
            Self::Arrow => write!(f, "->"),
            Self::LessEqual => write!(f, "<="),
            Self::GreaterEqual => write!(f, ">="),
            Self::EqualEqual => write!(f, "=="),
            Self::BangEqual => write!(f, "!="),
            Self::Less => write!(f, "<"),
            Self::Greater => write!(f, ">"),
            Self::Equals => write!(f, "="),
            Self::Bang => write!(f, "!"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::Colon => write!(f, ":"),
            Self::Semicolon => write!(f, ";"),
            Self::Dot => write!(f, "."),
            Self::Comma => write!(f, ","),
            Self::NewLine | Self::Ignored => Ok(()),
        }
    }
}
