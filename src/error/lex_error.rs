#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur while tokenizing source text.
pub enum LexError {
    /// A character outside the language's alphabet was encountered.
    UnexpectedCharacter {
        /// The offending character.
        found:  char,
        /// The source line where the error occurred.
        line:   usize,
        /// The character position within that line.
        column: usize,
    },
    /// A string literal contained a `\` followed by an unknown character.
    UnknownEscape {
        /// The character that followed the backslash.
        escape: char,
        /// The source line where the error occurred.
        line:   usize,
    },
    /// The input ended inside a string literal.
    UnterminatedString {
        /// The source line where the string literal started.
        line: usize,
    },
    /// An integer literal does not fit in 64 bits.
    LiteralTooLarge {
        /// The source line where the error occurred.
        line: usize,
    },
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedCharacter { found, line, column } => {
                write!(f, "Unexpected character '{found}' at line {line}, char {column}.")
            },
            Self::UnknownEscape { escape, line } => {
                write!(f, "Unexpected character after '\\' at line {line}: '{escape}'.")
            },
            Self::UnterminatedString { line } => {
                write!(f, "Unexpected end of file in string literal at line {line}. Expected '\"'.")
            },
            Self::LiteralTooLarge { line } => {
                write!(f, "Integer literal at line {line} does not fit in 64 bits.")
            },
        }
    }
}

impl std::error::Error for LexError {}
