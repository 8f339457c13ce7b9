pub mod token;

use logos::Logos;
use thiserror::Error;
use token::{LexerExtras, Token};

/// A token paired with its literal source text and line number.
///
/// For `IntLit`/`StringLit`/`Identifier`, `text` is the token's resolved
/// value (for strings: quotes stripped, escapes resolved). For `True`/
/// `False`, `text` is already collapsed to `"1"`/`"0"` and the token kind
/// itself is rewritten to `IntLit` — RPAL's lexical grammar tokenizes the
/// literals `true`/`false` as the integers `1`/`0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub text: String,
    pub line: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("line {line}: unrecognized character: {text:?}")]
    UnknownChar { line: usize, text: String },
}

/// Lex the input source, returning all meaningful tokens with line numbers.
///
/// Hidden tokens (newlines, line comments) are consumed for line tracking
/// but never appear in the returned stream.
pub fn lex(source: &str) -> Result<Vec<SpannedToken>, Vec<LexError>> {
    let mut lexer = Token::lexer_with_extras(source, LexerExtras { line: 1 });
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    while let Some(result) = lexer.next() {
        let line = lexer.extras.line;
        let slice = lexer.slice();

        match result {
            Ok(tok) if tok.is_hidden() => continue,
            Ok(Token::True) => tokens.push(SpannedToken {
                token: Token::IntLit,
                text: "1".to_string(),
                line,
            }),
            Ok(Token::False) => tokens.push(SpannedToken {
                token: Token::IntLit,
                text: "0".to_string(),
                line,
            }),
            Ok(Token::StringLit) => tokens.push(SpannedToken {
                token: Token::StringLit,
                text: unescape_string_literal(slice),
                line,
            }),
            Ok(tok) => tokens.push(SpannedToken {
                token: tok,
                text: slice.to_string(),
                line,
            }),
            Err(_) => errors.push(LexError::UnknownChar {
                line,
                text: slice.to_string(),
            }),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

/// Strip the surrounding quote and resolve `\t \n \\ \'` escapes.
/// Unrecognized escapes keep their backslash rather than erroring.
fn unescape_string_literal(raw: &str) -> String {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('t') => out.push('\t'),
                Some('n') => out.push('\n'),
                Some('\\') => out.push('\\'),
                Some('\'') => out.push('\''),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
