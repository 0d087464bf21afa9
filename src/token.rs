// Lexer: turns source text into a flat stream of tokens.

use crate::error::PrimError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Num(i64),
    Str(String),
    Ident(String),
    Bool(bool),

    // Punctuation / operators
    Assign, // :=
    Plus,
    Minus,
    Times,
    Divide,
    Mod,
    Equals, // =
    Lt,
    Le,
    Gt,
    Ge,
    Ne, // <>
    StrEq,  // ==
    StrNe,  // !=
    LParen,
    RParen,
    Semi,
    Comma,

    // Reserved words
    And,
    Or,
    Not,
    If,
    Then,
    Else,
    While,
    Do,
    Print,
    Readint,
    Readstr,
    Substr,
    Len,
    Pos,
    Concat,
    Begin,
    End,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lineno: u32,
}

fn reserved(word: &str) -> Option<TokenKind> {
    match word {
        "and" => Some(TokenKind::And),
        "or" => Some(TokenKind::Or),
        "not" => Some(TokenKind::Not),
        "true" => Some(TokenKind::Bool(true)),
        "false" => Some(TokenKind::Bool(false)),
        "if" => Some(TokenKind::If),
        "then" => Some(TokenKind::Then),
        "else" => Some(TokenKind::Else),
        "while" => Some(TokenKind::While),
        "do" => Some(TokenKind::Do),
        "print" => Some(TokenKind::Print),
        "readint" => Some(TokenKind::Readint),
        "readstr" => Some(TokenKind::Readstr),
        "substring" => Some(TokenKind::Substr),
        "length" => Some(TokenKind::Len),
        "position" => Some(TokenKind::Pos),
        "concatenate" => Some(TokenKind::Concat),
        "begin" => Some(TokenKind::Begin),
        "end" => Some(TokenKind::End),
        "exit" => Some(TokenKind::Exit),
        _ => None,
    }
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    lineno: u32,
}

impl Scanner {
    fn new(src: &str) -> Self {
        Scanner {
            chars: src.chars().collect(),
            pos: 0,
            lineno: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn starts_with(&self, s: &str) -> bool {
        let n = s.chars().count();
        if self.pos + n > self.chars.len() {
            return false;
        }
        self.chars[self.pos..self.pos + n].iter().collect::<String>() == s
    }
}

/// Scans `src` into a flat token stream. Longest match wins at each
/// position; on ties, the earlier-declared rule wins. Whitespace (space,
/// tab) is skipped; newlines increment the line counter and are not
/// emitted.
pub fn lex(src: &str) -> Result<Vec<Token>, PrimError> {
    let mut sc = Scanner::new(src);
    let mut tokens = Vec::new();

    loop {
        match sc.peek() {
            None => break,
            Some(' ') | Some('\t') => {
                sc.advance();
            }
            Some('\n') => {
                sc.advance();
                sc.lineno += 1;
            }
            Some(c) if c.is_ascii_digit() => {
                let lineno = sc.lineno;
                let mut s = String::new();
                while let Some(d) = sc.peek() {
                    if d.is_ascii_digit() {
                        s.push(d);
                        sc.advance();
                    } else {
                        break;
                    }
                }
                let n: i64 = s.parse().map_err(|_| {
                    PrimError::with_line(lineno, format!("Invalid numeric literal '{s}'"))
                })?;
                tokens.push(Token {
                    kind: TokenKind::Num(n),
                    lineno,
                });
            }
            Some('"') => {
                let lineno = sc.lineno;
                sc.advance();
                let mut s = String::new();
                loop {
                    match sc.advance() {
                        Some('"') => break,
                        Some(ch) => {
                            if ch == '\n' {
                                sc.lineno += 1;
                            }
                            s.push(ch);
                        }
                        None => {
                            return Err(PrimError::with_line(
                                lineno,
                                "Unterminated string literal".to_string(),
                            ))
                        }
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Str(s),
                    lineno,
                });
            }
            Some(c) if c == '_' || c.is_ascii_alphabetic() => {
                let lineno = sc.lineno;
                let mut s = String::new();
                while let Some(d) = sc.peek() {
                    if d == '_' || d.is_ascii_alphanumeric() {
                        s.push(d);
                        sc.advance();
                    } else {
                        break;
                    }
                }
                let kind = reserved(&s).unwrap_or(TokenKind::Ident(s));
                tokens.push(Token { kind, lineno });
            }
            Some(_) => {
                let lineno = sc.lineno;
                let (kind, len) = if sc.starts_with(":=") {
                    (TokenKind::Assign, 2)
                } else if sc.starts_with("==") {
                    (TokenKind::StrEq, 2)
                } else if sc.starts_with("!=") {
                    (TokenKind::StrNe, 2)
                } else if sc.starts_with("<=") {
                    (TokenKind::Le, 2)
                } else if sc.starts_with(">=") {
                    (TokenKind::Ge, 2)
                } else if sc.starts_with("<>") {
                    (TokenKind::Ne, 2)
                } else if sc.starts_with("<") {
                    (TokenKind::Lt, 1)
                } else if sc.starts_with(">") {
                    (TokenKind::Gt, 1)
                } else if sc.starts_with("=") {
                    (TokenKind::Equals, 1)
                } else if sc.starts_with("+") {
                    (TokenKind::Plus, 1)
                } else if sc.starts_with("-") {
                    (TokenKind::Minus, 1)
                } else if sc.starts_with("*") {
                    (TokenKind::Times, 1)
                } else if sc.starts_with("/") {
                    (TokenKind::Divide, 1)
                } else if sc.starts_with("%") {
                    (TokenKind::Mod, 1)
                } else if sc.starts_with("(") {
                    (TokenKind::LParen, 1)
                } else if sc.starts_with(")") {
                    (TokenKind::RParen, 1)
                } else if sc.starts_with(";") {
                    (TokenKind::Semi, 1)
                } else if sc.starts_with(",") {
                    (TokenKind::Comma, 1)
                } else {
                    return Err(PrimError::with_line(
                        lineno,
                        format!("Invalid character '{}'", peek_at_or_empty(&sc)),
                    ));
                };
                for _ in 0..len {
                    sc.advance();
                }
                tokens.push(Token { kind, lineno });
            }
        }
    }
    Ok(tokens)
}

fn peek_at_or_empty(sc: &Scanner) -> String {
    sc.peek_at(0).map(|c| c.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_literals() {
        assert_eq!(kinds("123"), vec![TokenKind::Num(123)]);
        assert_eq!(
            kinds("\"hello\""),
            vec![TokenKind::Str("hello".to_string())]
        );
        assert_eq!(kinds("true false"), vec![TokenKind::Bool(true), TokenKind::Bool(false)]);
    }

    #[test]
    fn lex_reserved_vs_ident() {
        assert_eq!(kinds("if"), vec![TokenKind::If]);
        assert_eq!(kinds("iffy"), vec![TokenKind::Ident("iffy".to_string())]);
    }

    #[test]
    fn lex_multichar_operators_prefer_longest() {
        assert_eq!(kinds(":="), vec![TokenKind::Assign]);
        assert_eq!(kinds("<="), vec![TokenKind::Le]);
        assert_eq!(kinds("<>"), vec![TokenKind::Ne]);
        assert_eq!(kinds("<"), vec![TokenKind::Lt]);
        assert_eq!(kinds("=="), vec![TokenKind::StrEq]);
        assert_eq!(kinds("="), vec![TokenKind::Equals]);
    }

    #[test]
    fn lex_tracks_line_numbers() {
        let toks = lex("x\n:=\n1").unwrap();
        assert_eq!(toks[0].lineno, 1);
        assert_eq!(toks[1].lineno, 2);
        assert_eq!(toks[2].lineno, 3);
    }

    #[test]
    fn lex_invalid_character_errors() {
        let e = lex("x := 1 @ 2").unwrap_err();
        assert!(e.to_string().contains("Invalid character"));
    }

    #[test]
    fn lex_whitespace_skipped() {
        assert_eq!(kinds("  \t1\t\t2  "), vec![TokenKind::Num(1), TokenKind::Num(2)]);
    }
}
