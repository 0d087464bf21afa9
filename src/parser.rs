// Parser: consumes the token stream produced by `token::lex` and builds a
// single `ast::Program`. Implemented as recursive descent, with an
// explicit precedence split between additive, multiplicative, and unary
// levels to express the mixed right/left/nonassoc associativity table.

use crate::ast::{BinOp, BoolOp, Expr, Instr, NumRel, Program, SimpleInstr, StrRel, Value};
use crate::error::PrimError;
use crate::token::{Token, TokenKind};

pub fn parse(tokens: Vec<Token>) -> Result<Program, PrimError> {
    let mut p = Parser::new(tokens);
    let instr = p.parse_instr()?;
    p.expect_eof()?;
    Ok(Program(instr))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn current_lineno(&self) -> u32 {
        self.current()
            .or_else(|| self.tokens.last())
            .map(|t| t.lineno)
            .unwrap_or(1)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn check(&self, kind: &TokenKind) -> bool {
        matches!(self.current(), Some(t) if &t.kind == kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, PrimError> {
        match self.advance() {
            Some(t) if t.kind == kind => Ok(t),
            Some(t) => Err(self.syntax_error_at(&t)),
            None => Err(self.eof_error()),
        }
    }

    fn expect_eof(&mut self) -> Result<(), PrimError> {
        match self.current() {
            None => Ok(()),
            Some(t) => Err(self.syntax_error_at(&t.clone())),
        }
    }

    fn syntax_error_at(&self, t: &Token) -> PrimError {
        PrimError::with_line(
            t.lineno,
            format!("Syntax error at token '{}'", lexeme(&t.kind)),
        )
    }

    fn eof_error(&self) -> PrimError {
        PrimError::with_line(self.current_lineno(), "Unexpected end of input".to_string())
    }

    // instr := instr SEMI simple_instr | simple_instr
    fn parse_instr(&mut self) -> Result<Instr, PrimError> {
        let mut list = vec![self.parse_simple_instr()?];
        while self.eat(&TokenKind::Semi) {
            list.push(self.parse_simple_instr()?);
        }
        Ok(Instr(list))
    }

    // simple_instr := assign_stmt | if_stmt | while_stmt | output_stmt
    //               | EXIT | BEGIN instr END
    fn parse_simple_instr(&mut self) -> Result<SimpleInstr, PrimError> {
        match self.current().map(|t| t.kind.clone()) {
            Some(TokenKind::If) => self.parse_if_stmt(),
            Some(TokenKind::While) => self.parse_while_stmt(),
            Some(TokenKind::Do) => self.parse_do_while_stmt(),
            Some(TokenKind::Print) => self.parse_output_stmt(),
            Some(TokenKind::Exit) => {
                self.advance();
                Ok(SimpleInstr::Exit)
            }
            Some(TokenKind::Begin) => {
                self.advance();
                let instr = self.parse_instr()?;
                self.expect(TokenKind::End)?;
                Ok(SimpleInstr::Block(instr))
            }
            Some(TokenKind::Ident(name)) => {
                let lineno = self.current_lineno();
                self.advance();
                self.expect(TokenKind::Assign)?;
                let e = self.parse_expr()?;
                Ok(SimpleInstr::Assign(name, e, lineno))
            }
            Some(_) => Err(self.syntax_error_at(&self.current().unwrap().clone())),
            None => Err(self.eof_error()),
        }
    }

    // if_stmt := IF bool_expr THEN simple_instr [ELSE simple_instr]
    //
    // The dangling else is resolved structurally: after parsing the THEN
    // branch we greedily look for a following ELSE. Because `parse_simple_instr`
    // for a nested `if` returns before its caller ever checks for ELSE, an
    // else token always attaches to the innermost still-open if.
    fn parse_if_stmt(&mut self) -> Result<SimpleInstr, PrimError> {
        let lineno = self.current_lineno();
        self.advance(); // IF
        let cond = self.parse_bool_expr()?;
        self.expect(TokenKind::Then)?;
        let then_branch = Box::new(self.parse_simple_instr()?);
        let else_branch = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_simple_instr()?))
        } else {
            None
        };
        Ok(SimpleInstr::If(cond, then_branch, else_branch, lineno))
    }

    // while_stmt := WHILE bool_expr DO simple_instr
    fn parse_while_stmt(&mut self) -> Result<SimpleInstr, PrimError> {
        let lineno = self.current_lineno();
        self.advance(); // WHILE
        let cond = self.parse_bool_expr()?;
        self.expect(TokenKind::Do)?;
        let body = Box::new(self.parse_simple_instr()?);
        Ok(SimpleInstr::While(cond, body, false, lineno))
    }

    // while_stmt := DO simple_instr WHILE bool_expr
    fn parse_do_while_stmt(&mut self) -> Result<SimpleInstr, PrimError> {
        let lineno = self.current_lineno();
        self.advance(); // DO
        let body = Box::new(self.parse_simple_instr()?);
        self.expect(TokenKind::While)?;
        let cond = self.parse_bool_expr()?;
        Ok(SimpleInstr::While(cond, body, true, lineno))
    }

    // output_stmt := PRINT LPAREN expr RPAREN
    fn parse_output_stmt(&mut self) -> Result<SimpleInstr, PrimError> {
        let lineno = self.current_lineno();
        self.advance(); // PRINT
        self.expect(TokenKind::LParen)?;
        let e = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(SimpleInstr::Print(e, lineno))
    }

    // ---- expr (num_expr | str_expr | IDENT) ----
    //
    // PLUS/MINUS are right-associative; TIMES/DIVIDE/MOD left-associative;
    // unary minus binds tighter than any binary operator.

    fn parse_expr(&mut self) -> Result<Expr, PrimError> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<Expr, PrimError> {
        let lineno = self.current_lineno();
        let left = self.parse_multiplicative()?;
        let op = match self.current().map(|t| t.kind.clone()) {
            Some(TokenKind::Plus) => Some(BinOp::Plus),
            Some(TokenKind::Minus) => Some(BinOp::Minus),
            _ => None,
        };
        match op {
            Some(op) => {
                self.advance();
                // Right-associative: recurse back into the same level.
                let right = self.parse_additive()?;
                Ok(Expr::Binop(Box::new(left), op, Box::new(right), lineno))
            }
            None => Ok(left),
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, PrimError> {
        let mut left = self.parse_unary()?;
        loop {
            let lineno = self.current_lineno();
            let op = match self.current().map(|t| t.kind.clone()) {
                Some(TokenKind::Times) => Some(BinOp::Times),
                Some(TokenKind::Divide) => Some(BinOp::Divide),
                Some(TokenKind::Mod) => Some(BinOp::Mod),
                _ => None,
            };
            match op {
                Some(op) => {
                    self.advance();
                    // Left-associative: loop instead of recursing.
                    let right = self.parse_unary()?;
                    left = Expr::Binop(Box::new(left), op, Box::new(right), lineno);
                }
                None => break,
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, PrimError> {
        let lineno = self.current_lineno();
        if self.eat(&TokenKind::Minus) {
            let e = self.parse_unary()?;
            Ok(Expr::Unary(Box::new(e), lineno))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, PrimError> {
        let lineno = self.current_lineno();
        match self.current().map(|t| t.kind.clone()) {
            Some(TokenKind::Num(n)) => {
                self.advance();
                Ok(Expr::Literal(Value::Num(n)))
            }
            Some(TokenKind::Str(s)) => {
                self.advance();
                Ok(Expr::Literal(Value::Str(s)))
            }
            Some(TokenKind::Readint) => {
                self.advance();
                Ok(Expr::Readint)
            }
            Some(TokenKind::Readstr) => {
                self.advance();
                Ok(Expr::Readstr)
            }
            Some(TokenKind::Ident(name)) => {
                self.advance();
                Ok(Expr::Ident(name))
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let e = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Grouping(Box::new(e)))
            }
            Some(TokenKind::Len) => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let e = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Len(Box::new(e), lineno))
            }
            Some(TokenKind::Pos) => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let a = self.parse_expr()?;
                self.expect(TokenKind::Comma)?;
                let b = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Pos(Box::new(a), Box::new(b), lineno))
            }
            Some(TokenKind::Concat) => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let a = self.parse_expr()?;
                self.expect(TokenKind::Comma)?;
                let b = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Concat(Box::new(a), Box::new(b), lineno))
            }
            Some(TokenKind::Substr) => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let s = self.parse_expr()?;
                self.expect(TokenKind::Comma)?;
                let start = self.parse_expr()?;
                self.expect(TokenKind::Comma)?;
                let end = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Substr(
                    Box::new(s),
                    Box::new(start),
                    Box::new(end),
                    lineno,
                ))
            }
            Some(_) => Err(self.syntax_error_at(&self.current().unwrap().clone())),
            None => Err(self.eof_error()),
        }
    }

    // ---- bool_expr ----
    //
    // `nonassoc ELSE` is handled structurally in parse_if_stmt, not here.
    // `left OR`, `left AND`, `nonassoc` relational ops, `right NOT`.

    fn parse_bool_expr(&mut self) -> Result<Expr, PrimError> {
        self.parse_bool_or()
    }

    fn parse_bool_or(&mut self) -> Result<Expr, PrimError> {
        let mut left = self.parse_bool_and()?;
        while self.check(&TokenKind::Or) {
            let lineno = self.current_lineno();
            self.advance();
            let right = self.parse_bool_and()?;
            left = Expr::Boolop(Box::new(left), BoolOp::Or, Box::new(right), lineno);
        }
        Ok(left)
    }

    fn parse_bool_and(&mut self) -> Result<Expr, PrimError> {
        let mut left = self.parse_bool_not()?;
        while self.check(&TokenKind::And) {
            let lineno = self.current_lineno();
            self.advance();
            let right = self.parse_bool_not()?;
            left = Expr::Boolop(Box::new(left), BoolOp::And, Box::new(right), lineno);
        }
        Ok(left)
    }

    fn parse_bool_not(&mut self) -> Result<Expr, PrimError> {
        let lineno = self.current_lineno();
        if self.eat(&TokenKind::Not) {
            let e = self.parse_bool_not()?;
            Ok(Expr::Not(Box::new(e), lineno))
        } else {
            self.parse_bool_atom()
        }
    }

    fn parse_bool_atom(&mut self) -> Result<Expr, PrimError> {
        match self.current().map(|t| t.kind.clone()) {
            Some(TokenKind::Bool(b)) => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(b)))
            }
            Some(TokenKind::LParen) => {
                // Could be `( bool_expr )` or the start of a relational
                // expr such as `(a + b) < c`. Try bool_expr first; if the
                // parenthesized contents don't resolve to a full bool_expr
                // followed by a matching RPAREN, back off and parse the
                // whole thing as a relational expr instead.
                let save = self.pos;
                self.advance();
                if let Ok(inner) = self.parse_bool_expr() {
                    if self.eat(&TokenKind::RParen) {
                        return Ok(Expr::Grouping(Box::new(inner)));
                    }
                }
                self.pos = save;
                self.parse_relational()
            }
            _ => self.parse_relational(),
        }
    }

    // expr num_rel expr | expr str_rel expr
    fn parse_relational(&mut self) -> Result<Expr, PrimError> {
        let lineno = self.current_lineno();
        let left = self.parse_expr()?;
        if let Some(rel) = self.try_num_rel() {
            let right = self.parse_expr()?;
            return Ok(Expr::NumRelop(Box::new(left), rel, Box::new(right), lineno));
        }
        if let Some(rel) = self.try_str_rel() {
            let right = self.parse_expr()?;
            return Ok(Expr::StrRelop(Box::new(left), rel, Box::new(right), lineno));
        }
        match self.current() {
            Some(t) => Err(self.syntax_error_at(&t.clone())),
            None => Err(self.eof_error()),
        }
    }

    fn try_num_rel(&mut self) -> Option<NumRel> {
        let rel = match self.current().map(|t| &t.kind) {
            Some(TokenKind::Equals) => Some(NumRel::Eq),
            Some(TokenKind::Lt) => Some(NumRel::Lt),
            Some(TokenKind::Le) => Some(NumRel::Le),
            Some(TokenKind::Gt) => Some(NumRel::Gt),
            Some(TokenKind::Ge) => Some(NumRel::Ge),
            Some(TokenKind::Ne) => Some(NumRel::Ne),
            _ => None,
        };
        if rel.is_some() {
            self.advance();
        }
        rel
    }

    fn try_str_rel(&mut self) -> Option<StrRel> {
        let rel = match self.current().map(|t| &t.kind) {
            Some(TokenKind::StrEq) => Some(StrRel::Eq),
            Some(TokenKind::StrNe) => Some(StrRel::Ne),
            _ => None,
        };
        if rel.is_some() {
            self.advance();
        }
        rel
    }
}

fn lexeme(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Num(n) => n.to_string(),
        TokenKind::Str(s) => format!("\"{s}\""),
        TokenKind::Ident(s) => s.clone(),
        TokenKind::Bool(b) => b.to_string(),
        TokenKind::Assign => ":=".to_string(),
        TokenKind::Plus => "+".to_string(),
        TokenKind::Minus => "-".to_string(),
        TokenKind::Times => "*".to_string(),
        TokenKind::Divide => "/".to_string(),
        TokenKind::Mod => "%".to_string(),
        TokenKind::Equals => "=".to_string(),
        TokenKind::Lt => "<".to_string(),
        TokenKind::Le => "<=".to_string(),
        TokenKind::Gt => ">".to_string(),
        TokenKind::Ge => ">=".to_string(),
        TokenKind::Ne => "<>".to_string(),
        TokenKind::StrEq => "==".to_string(),
        TokenKind::StrNe => "!=".to_string(),
        TokenKind::LParen => "(".to_string(),
        TokenKind::RParen => ")".to_string(),
        TokenKind::Semi => ";".to_string(),
        TokenKind::Comma => ",".to_string(),
        TokenKind::And => "and".to_string(),
        TokenKind::Or => "or".to_string(),
        TokenKind::Not => "not".to_string(),
        TokenKind::If => "if".to_string(),
        TokenKind::Then => "then".to_string(),
        TokenKind::Else => "else".to_string(),
        TokenKind::While => "while".to_string(),
        TokenKind::Do => "do".to_string(),
        TokenKind::Print => "print".to_string(),
        TokenKind::Readint => "readint".to_string(),
        TokenKind::Readstr => "readstr".to_string(),
        TokenKind::Substr => "substring".to_string(),
        TokenKind::Len => "length".to_string(),
        TokenKind::Pos => "position".to_string(),
        TokenKind::Concat => "concatenate".to_string(),
        TokenKind::Begin => "begin".to_string(),
        TokenKind::End => "end".to_string(),
        TokenKind::Exit => "exit".to_string(),
    }
}

pub fn parse_program(src: &str) -> Result<Program, PrimError> {
    let tokens = crate::token::lex(src)?;
    parse(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::lex;

    fn parse_ok(src: &str) -> Program {
        parse(lex(src).unwrap()).unwrap_or_else(|e| panic!("parse error for {src:?}: {e}"))
    }

    #[test]
    fn hello_world() {
        let p = parse_ok(r#"print("hello")"#);
        assert_eq!(p.0 .0.len(), 1);
        assert!(matches!(p.0 .0[0], SimpleInstr::Print(_, _)));
    }

    #[test]
    fn right_assoc_minus() {
        // 10 - 3 - 2 parses as 10 - (3 - 2)
        let p = parse_ok("print(10 - 3 - 2)");
        match &p.0 .0[0] {
            SimpleInstr::Print(Expr::Binop(l, BinOp::Minus, r, _), _) => {
                assert!(matches!(**l, Expr::Literal(Value::Num(10))));
                assert!(matches!(**r, Expr::Binop(_, BinOp::Minus, _, _)));
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn multiplicative_left_assoc() {
        // a / b / c parses as (a / b) / c
        let p = parse_ok("x := 8 / 4 / 2");
        match &p.0 .0[0] {
            SimpleInstr::Assign(_, Expr::Binop(l, BinOp::Divide, r, _), _) => {
                assert!(matches!(**l, Expr::Binop(_, BinOp::Divide, _, _)));
                assert!(matches!(**r, Expr::Literal(Value::Num(2))));
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn dangling_else_binds_inner_if() {
        let p = parse_ok("if true then if false then print(1) else print(2)");
        match &p.0 .0[0] {
            SimpleInstr::If(_, then_branch, None, _) => match then_branch.as_ref() {
                SimpleInstr::If(_, _, Some(_), _) => {}
                other => panic!("else should bind to inner if, got {other:?}"),
            },
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn do_while_parses() {
        let p = parse_ok("do i := i + 1 while i < 0");
        match &p.0 .0[0] {
            SimpleInstr::While(_, _, true, _) => {}
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn relational_ops_do_not_chain() {
        let tokens = lex("x := 1; if a < b < c then print(1)").unwrap();
        assert!(parse(tokens).is_err());
    }

    #[test]
    fn begin_end_block() {
        let p = parse_ok("begin print(1); print(2) end");
        match &p.0 .0[0] {
            SimpleInstr::Block(Instr(list)) => assert_eq!(list.len(), 2),
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn syntax_error_reports_token_and_line() {
        let tokens = lex("x := ;").unwrap();
        let err = parse(tokens).unwrap_err();
        assert!(err.message.contains("Syntax error at token ';'"));
    }
}
