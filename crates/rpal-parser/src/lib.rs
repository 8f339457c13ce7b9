//! Recursive-descent LL(1) parser for RPAL, one function per grammar
//! production, producing an `rpal_tree::Tree` AST.

pub mod error;

use error::ParseError;
use rpal_lexer::{lex, token::Token, SpannedToken};
use rpal_tree::Tree;

type PResult<T> = Result<T, ParseError>;

/// Parse a complete RPAL source string into its AST.
pub fn parse(source: &str) -> PResult<Tree> {
    let tokens = lex(source).map_err(ParseError::Lex)?;
    let mut p = Parser { tokens: &tokens, pos: 0 };
    let tree = p.e()?;
    if let Some(extra) = p.peek() {
        return Err(p.unexpected("end of input", extra));
    }
    Ok(tree)
}

struct Parser<'a> {
    tokens: &'a [SpannedToken],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn unexpected(&self, expected: &str, found: &SpannedToken) -> ParseError {
        ParseError::Unexpected {
            expected: expected.to_string(),
            found: format!("{:?}({})", found.token, found.text),
            line: found.line,
        }
    }

    fn expect(&mut self, tok: Token, what: &str) -> PResult<SpannedToken> {
        match self.peek() {
            Some(t) if t.token == tok => Ok(self.advance().unwrap()),
            Some(t) => Err(self.unexpected(what, t)),
            None => Err(ParseError::UnexpectedEof {
                expected: what.to_string(),
            }),
        }
    }

    fn is_at(&self, tok: &Token) -> bool {
        self.peek_token() == Some(tok)
    }

    fn eat_if(&mut self, tok: &Token) -> bool {
        if self.is_at(tok) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ─── E → 'let' D 'in' E | 'fn' Vb+ '.' E | Ew ────────────────────────
    fn e(&mut self) -> PResult<Tree> {
        if self.eat_if(&Token::Let) {
            let d = self.d()?;
            self.expect(Token::In, "'in'")?;
            let e = self.e()?;
            return Ok(Tree::internal("let", vec![d, e]));
        }
        if self.eat_if(&Token::Fn) {
            let mut vbs = vec![self.vb()?];
            while self.is_vb_start() {
                vbs.push(self.vb()?);
            }
            self.expect(Token::Dot, "'.'")?;
            let body = self.e()?;
            vbs.push(body);
            return Ok(Tree::internal("lambda", vbs));
        }
        self.ew()
    }

    fn is_vb_start(&self) -> bool {
        matches!(self.peek_token(), Some(Token::Identifier) | Some(Token::LParen))
    }

    // ─── Ew → T ['where' Dr] ──────────────────────────────────────────────
    fn ew(&mut self) -> PResult<Tree> {
        let t = self.t()?;
        if self.eat_if(&Token::Where) {
            let dr = self.dr()?;
            return Ok(Tree::internal("where", vec![t, dr]));
        }
        Ok(t)
    }

    // ─── T → Ta (',' Ta)* ─────────────────────────────────────────────────
    fn t(&mut self) -> PResult<Tree> {
        let mut items = vec![self.ta()?];
        while self.eat_if(&Token::Comma) {
            items.push(self.ta()?);
        }
        Ok(if items.len() == 1 {
            items.pop().unwrap()
        } else {
            Tree::internal("tau", items)
        })
    }

    // ─── Ta → Tc ('aug' Tc)* ──────────────────────────────────────────────
    fn ta(&mut self) -> PResult<Tree> {
        let mut acc = self.tc()?;
        while self.eat_if(&Token::Aug) {
            let rhs = self.tc()?;
            acc = Tree::internal("aug", vec![acc, rhs]);
        }
        Ok(acc)
    }

    // ─── Tc → B ['->' Tc '|' Tc] ──────────────────────────────────────────
    fn tc(&mut self) -> PResult<Tree> {
        let cond = self.b()?;
        if self.eat_if(&Token::Arrow) {
            let then_branch = self.tc()?;
            self.expect(Token::Pipe, "'|'")?;
            let else_branch = self.tc()?;
            return Ok(Tree::internal("->", vec![cond, then_branch, else_branch]));
        }
        Ok(cond)
    }

    // ─── B → Bt ('or' Bt)* ────────────────────────────────────────────────
    fn b(&mut self) -> PResult<Tree> {
        let mut acc = self.bt()?;
        while self.eat_if(&Token::Or) {
            let rhs = self.bt()?;
            acc = Tree::internal("or", vec![acc, rhs]);
        }
        Ok(acc)
    }

    // ─── Bt → Bs ('&' Bs)* ────────────────────────────────────────────────
    fn bt(&mut self) -> PResult<Tree> {
        let mut acc = self.bs()?;
        while self.eat_if(&Token::Amp) {
            let rhs = self.bs()?;
            acc = Tree::internal("&", vec![acc, rhs]);
        }
        Ok(acc)
    }

    // ─── Bs → 'not' Bp | Bp ───────────────────────────────────────────────
    fn bs(&mut self) -> PResult<Tree> {
        if self.eat_if(&Token::Not) {
            let operand = self.bp()?;
            return Ok(Tree::internal("not", vec![operand]));
        }
        self.bp()
    }

    // ─── Bp → A (relop A)? ────────────────────────────────────────────────
    fn bp(&mut self) -> PResult<Tree> {
        let lhs = self.a()?;
        let label = match self.peek_token() {
            Some(Token::Gr) | Some(Token::Greater) => Some("gr"),
            Some(Token::Ge) | Some(Token::GreaterEqual) => Some("ge"),
            Some(Token::Ls) | Some(Token::Less) => Some("ls"),
            Some(Token::Le) | Some(Token::LessEqual) => Some("le"),
            Some(Token::Eq) | Some(Token::Equal) => Some("eq"),
            Some(Token::Ne) | Some(Token::BangEqual) => Some("ne"),
            _ => None,
        };
        if let Some(label) = label {
            self.advance();
            let rhs = self.a()?;
            return Ok(Tree::internal(label, vec![lhs, rhs]));
        }
        Ok(lhs)
    }

    // ─── A → ['+'|'-'] At (('+'|'-') At)* ─────────────────────────────────
    fn a(&mut self) -> PResult<Tree> {
        let mut acc = if self.eat_if(&Token::Minus) {
            let operand = self.at()?;
            Tree::internal("neg", vec![operand])
        } else {
            self.eat_if(&Token::Plus);
            self.at()?
        };
        loop {
            if self.eat_if(&Token::Plus) {
                let rhs = self.at()?;
                acc = Tree::internal("+", vec![acc, rhs]);
            } else if self.eat_if(&Token::Minus) {
                let rhs = self.at()?;
                acc = Tree::internal("-", vec![acc, rhs]);
            } else {
                break;
            }
        }
        Ok(acc)
    }

    // ─── At → Af (('*'|'/') Af)* ───────────────────────────────────────────
    fn at(&mut self) -> PResult<Tree> {
        let mut acc = self.af()?;
        loop {
            if self.eat_if(&Token::Star) {
                let rhs = self.af()?;
                acc = Tree::internal("*", vec![acc, rhs]);
            } else if self.eat_if(&Token::Slash) {
                let rhs = self.af()?;
                acc = Tree::internal("/", vec![acc, rhs]);
            } else {
                break;
            }
        }
        Ok(acc)
    }

    // ─── Af → Ap ('**' Ap)*  (right-associative) ───────────────────────────
    fn af(&mut self) -> PResult<Tree> {
        let lhs = self.ap()?;
        if self.eat_if(&Token::StarStar) {
            let rhs = self.af()?;
            return Ok(Tree::internal("**", vec![lhs, rhs]));
        }
        Ok(lhs)
    }

    // ─── Ap → R ('@' IDENT R)* ──────────────────────────────────────────────
    fn ap(&mut self) -> PResult<Tree> {
        let mut acc = self.r()?;
        while self.eat_if(&Token::At) {
            let name_tok = self.expect(Token::Identifier, "identifier after '@'")?;
            let name = Tree::leaf("identifier", name_tok.text);
            let rhs = self.r()?;
            acc = Tree::internal("@", vec![acc, name, rhs]);
        }
        Ok(acc)
    }

    // ─── R → Rn Rn*  (juxtaposition = application) ─────────────────────────
    fn r(&mut self) -> PResult<Tree> {
        let mut acc = self.rn()?;
        while self.is_rn_start() {
            let rhs = self.rn()?;
            acc = Tree::internal("gamma", vec![acc, rhs]);
        }
        Ok(acc)
    }

    fn is_rn_start(&self) -> bool {
        matches!(
            self.peek_token(),
            Some(Token::Identifier)
                | Some(Token::IntLit)
                | Some(Token::StringLit)
                | Some(Token::Nil)
                | Some(Token::Dummy)
                | Some(Token::LParen)
        )
    }

    // ─── Rn → IDENT | INT | STR | 'nil' | 'dummy' | '(' E ')' ──────────────
    // 'true'/'false' never reach the parser: the lexer collapses them into
    // IntLit tokens.
    fn rn(&mut self) -> PResult<Tree> {
        match self.peek() {
            Some(t) if t.token == Token::Identifier => {
                let t = self.advance().unwrap();
                Ok(Tree::leaf("identifier", t.text))
            }
            Some(t) if t.token == Token::IntLit => {
                let t = self.advance().unwrap();
                Ok(Tree::leaf("integer", t.text))
            }
            Some(t) if t.token == Token::StringLit => {
                let t = self.advance().unwrap();
                Ok(Tree::leaf("string", t.text))
            }
            Some(t) if t.token == Token::Nil => {
                self.advance();
                Ok(Tree::leaf("nil", "nil"))
            }
            Some(t) if t.token == Token::Dummy => {
                self.advance();
                Ok(Tree::leaf("dummy", "dummy"))
            }
            Some(t) if t.token == Token::LParen => {
                self.advance();
                let inner = self.e()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(t) => Err(self.unexpected("an identifier, literal, or '('", t)),
            None => Err(ParseError::UnexpectedEof {
                expected: "an identifier, literal, or '('".to_string(),
            }),
        }
    }

    // ─── D → Da ('within' D)? ───────────────────────────────────────────────
    fn d(&mut self) -> PResult<Tree> {
        let da = self.da()?;
        if self.eat_if(&Token::Within) {
            let rest = self.d()?;
            return Ok(Tree::internal("within", vec![da, rest]));
        }
        Ok(da)
    }

    // ─── Da → Dr ('and' Dr)* ────────────────────────────────────────────────
    fn da(&mut self) -> PResult<Tree> {
        let mut items = vec![self.dr()?];
        while self.eat_if(&Token::And) {
            items.push(self.dr()?);
        }
        Ok(if items.len() == 1 {
            items.pop().unwrap()
        } else {
            Tree::internal("and", items)
        })
    }

    // ─── Dr → 'rec' Db | Db ─────────────────────────────────────────────────
    fn dr(&mut self) -> PResult<Tree> {
        if self.eat_if(&Token::Rec) {
            let db = self.db()?;
            return Ok(Tree::internal("rec", vec![db]));
        }
        self.db()
    }

    // ─── Db → '(' D ')' | Vl '=' E | IDENT Vb+ '=' E ───────────────────────
    fn db(&mut self) -> PResult<Tree> {
        if self.eat_if(&Token::LParen) {
            let d = self.d()?;
            self.expect(Token::RParen, "')'")?;
            return Ok(d);
        }
        let name_tok = self.expect(Token::Identifier, "identifier")?;
        let name = Tree::leaf("identifier", name_tok.text.clone());

        if self.is_at(&Token::Comma) {
            // Vl '=' E, tuple-pattern simultaneous definition: x, y = expr
            let mut idents = vec![name];
            while self.eat_if(&Token::Comma) {
                let t = self.expect(Token::Identifier, "identifier")?;
                idents.push(Tree::leaf("identifier", t.text));
            }
            self.expect(Token::Equal, "'='")?;
            let rhs = self.e()?;
            let lhs = Tree::internal(",", idents);
            return Ok(Tree::internal("=", vec![lhs, rhs]));
        }

        if self.eat_if(&Token::Equal) {
            // Vl '=' E with a single identifier.
            let rhs = self.e()?;
            return Ok(Tree::internal("=", vec![name, rhs]));
        }

        // IDENT Vb+ '=' E => fcn_form
        let mut children = vec![name];
        children.push(self.vb()?);
        while self.is_vb_start() {
            children.push(self.vb()?);
        }
        self.expect(Token::Equal, "'='")?;
        let rhs = self.e()?;
        children.push(rhs);
        Ok(Tree::internal("fcn_form", children))
    }

    // ─── Vb → IDENT | '(' ')' | '(' Vl ')' ──────────────────────────────────
    fn vb(&mut self) -> PResult<Tree> {
        if self.is_at(&Token::Identifier) {
            let t = self.advance().unwrap();
            return Ok(Tree::leaf("identifier", t.text));
        }
        self.expect(Token::LParen, "identifier or '('")?;
        if self.eat_if(&Token::RParen) {
            return Ok(Tree::bare_leaf("()"));
        }
        let vl = self.vl()?;
        self.expect(Token::RParen, "')'")?;
        Ok(vl)
    }

    // ─── Vl → IDENT (',' IDENT)* ────────────────────────────────────────────
    fn vl(&mut self) -> PResult<Tree> {
        let t = self.expect(Token::Identifier, "identifier")?;
        let mut idents = vec![Tree::leaf("identifier", t.text)];
        while self.eat_if(&Token::Comma) {
            let t = self.expect(Token::Identifier, "identifier")?;
            idents.push(Tree::leaf("identifier", t.text));
        }
        Ok(if idents.len() == 1 {
            idents.pop().unwrap()
        } else {
            Tree::internal(",", idents)
        })
    }
}
