use rpal_lexer::LexError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("lexical error(s): {0:?}")]
    Lex(Vec<LexError>),
    #[error("line {line}: expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        line: usize,
    },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
}
