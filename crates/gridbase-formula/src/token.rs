//! Formula tokenizer
//!
//! Converts raw formula text into a flat token stream. Reference bodies
//! between `{` and `}` are captured verbatim (including dots and spaces);
//! everything else is numbers, the four arithmetic operators, parentheses,
//! or whitespace.

use std::fmt;

use rust_decimal::Decimal;

use crate::error::{FormulaError, FormulaResult};

/// A single formula token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Reference body captured verbatim from between `{` and `}`
    Reference(String),
    /// Numeric literal (integer or decimal, no exponent notation)
    Number(Decimal),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Reference(body) => write!(f, "{{{body}}}"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
        }
    }
}

/// Tokenize a formula string
pub fn tokenize(input: &str) -> FormulaResult<Vec<Token>> {
    Tokenizer::new(input).run()
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn run(mut self) -> FormulaResult<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek_char() {
            match c {
                '{' => tokens.push(self.scan_reference()?),
                '0'..='9' => tokens.push(self.scan_number()?),
                '+' => {
                    self.advance();
                    tokens.push(Token::Plus);
                }
                '-' => {
                    self.advance();
                    tokens.push(Token::Minus);
                }
                '*' => {
                    self.advance();
                    tokens.push(Token::Star);
                }
                '/' => {
                    self.advance();
                    tokens.push(Token::Slash);
                }
                '(' => {
                    self.advance();
                    tokens.push(Token::LeftParen);
                }
                ')' => {
                    self.advance();
                    tokens.push(Token::RightParen);
                }
                c if c.is_whitespace() => self.advance(),
                c => {
                    return Err(FormulaError::Lex {
                        position: self.pos,
                        character: c,
                    })
                }
            }
        }

        Ok(tokens)
    }

    /// Capture everything up to the matching '}' verbatim
    fn scan_reference(&mut self) -> FormulaResult<Token> {
        let open = self.pos;
        self.advance(); // '{'

        let body_start = self.pos;
        while let Some(c) = self.peek_char() {
            if c == '}' {
                let body = self.input[body_start..self.pos].to_string();
                self.advance(); // '}'
                return Ok(Token::Reference(body));
            }
            self.advance();
        }

        Err(FormulaError::UnterminatedReference { position: open })
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // A single decimal point, only when digits follow
        if self.peek_char() == Some('.') && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.advance();
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let literal = &self.input[start..self.pos];
        let value: Decimal = literal
            .parse()
            .map_err(|_| FormulaError::Parse(format!("numeric literal '{literal}' out of range")))?;
        Ok(Token::Number(value))
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }
}
