use logos::Logos;

#[derive(Default, Debug, Clone)]
pub struct LexerExtras {
    pub line: usize,
}

fn newline_callback(lex: &mut logos::Lexer<Token>) {
    lex.extras.line += 1;
}

/// Tokens of the RPAL lexical grammar.
///
/// Word-form and symbol-form spellings of the relational/logical operators
/// are distinct variants; `rpal-parser` treats them as interchangeable where
/// the grammar allows both (`Bp`'s `gr`/`>` alternation, etc).
#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(extras = LexerExtras)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(error = String)]
pub enum Token {
    #[regex(r"\n", newline_callback)]
    Newline,

    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,

    // ── Keywords ──────────────────────────────────────────────
    #[token("let")]
    Let,
    #[token("in")]
    In,
    #[token("fn")]
    Fn,
    #[token("where")]
    Where,
    #[token("within")]
    Within,
    #[token("rec")]
    Rec,
    #[token("and")]
    And,
    #[token("aug")]
    Aug,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("gr")]
    Gr,
    #[token("ge")]
    Ge,
    #[token("ls")]
    Ls,
    #[token("le")]
    Le,
    #[token("eq")]
    Eq,
    #[token("ne")]
    Ne,
    #[token("nil")]
    Nil,
    #[token("dummy")]
    Dummy,

    // ── Boolean literals (collapsed to integers by `lex`, per spec) ──
    #[token("true")]
    True,
    #[token("false")]
    False,

    // ── Delimiters & punctuation ──────────────────────────────
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,

    // ── Operators (longest-match order matters for logos priority) ──
    #[token("->")]
    Arrow,
    #[token("**")]
    StarStar,
    #[token("@")]
    At,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("!=")]
    BangEqual,
    #[token("=")]
    Equal,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,

    // ── Literals ───────────────────────────────────────────────
    #[regex(r"[0-9]+")]
    IntLit,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    StringLit,

    #[regex(r"[A-Za-z][A-Za-z0-9_]*")]
    Identifier,
}

impl Token {
    /// Tokens kept only for line tracking; never handed to the parser.
    pub fn is_hidden(&self) -> bool {
        matches!(self, Token::Newline | Token::LineComment)
    }
}
