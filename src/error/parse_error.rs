#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur while parsing the token stream.
pub enum ParseError {
    /// Found a token other than the one the grammar requires.
    UnexpectedToken {
        /// The grammar construct being parsed when the error occurred.
        source:   &'static str,
        /// The token encountered.
        found:    String,
        /// What the parser expected instead.
        expected: String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// Reached the end of input while a construct was still open.
    UnexpectedEof {
        /// The grammar construct being parsed when the input ended.
        source:   &'static str,
        /// What the parser expected next.
        expected: String,
    },
    /// An integer literal appeared outside an array literal.
    ///
    /// All integer values are written wrapped in `[...]`, so a bare integer
    /// at expression level is always a mistake. `x-1` lexes as `x` followed
    /// by the literal `-1`, which lands here rather than parsing as
    /// subtraction; write `x - [1]` instead.
    IntLiteralInExpression {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An expression closed more parentheses than it opened.
    UnbalancedParentheses {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An expression opened a parenthesis it never closed.
    UnclosedParenthesis {
        /// The source line where the expression started.
        line: usize,
    },
    /// An expression was expected but no tokens formed one.
    EmptyExpression {
        /// The source line where the expression was expected.
        line: usize,
    },
    /// Operators and operands did not combine into a single expression.
    MalformedExpression {
        /// The source line where the expression started.
        line: usize,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken { source,
                                    found,
                                    expected,
                                    line, } => {
                write!(f,
                       "Unexpected token {found} in {source} on line {line}. Expected {expected}.")
            },
            Self::UnexpectedEof { source, expected } => {
                write!(f, "Unexpected end of file in {source}. Expected {expected}.")
            },
            Self::IntLiteralInExpression { line } => {
                write!(f, "Unexpected int literal in array expression on line {line}.")
            },
            Self::UnbalancedParentheses { line } => {
                write!(f, "More ')' than '(' in array expression on line {line}.")
            },
            Self::UnclosedParenthesis { line } => {
                write!(f, "Unclosed '(' in array expression on line {line}.")
            },
            Self::EmptyExpression { line } => write!(f, "Empty expression on line {line}."),
            Self::MalformedExpression { line } => {
                write!(f, "Invalid array expression on line {line}.")
            },
        }
    }
}

impl std::error::Error for ParseError {}
