//! Lexer turning Monkey source text into a token stream.
//!
//! The lexer works on bytes with a single character of lookahead. It never
//! fails: characters it does not recognize become `Illegal` tokens, and once
//! the input is exhausted it keeps yielding `Eof`.

use crate::token::{Token, TokenKind, lookup_ident};

/// Streaming tokenizer over a source string.
///
/// Call [`Lexer::next_token`] repeatedly; after the last real token it
/// returns `Eof` forever.
#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a [u8],
    /// Index of the character under examination.
    position: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            position: 0,
        }
    }

    /// Reads and returns the next token, consuming it.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(ch) = self.current() else {
            return Token::eof();
        };

        match ch {
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    self.advance();
                    Token::new(TokenKind::Eq, "==")
                } else {
                    self.single(TokenKind::Assign, "=")
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    self.advance();
                    Token::new(TokenKind::NotEq, "!=")
                } else {
                    self.single(TokenKind::Bang, "!")
                }
            }
            b'+' => self.single(TokenKind::Plus, "+"),
            b'-' => self.single(TokenKind::Minus, "-"),
            b'*' => self.single(TokenKind::Star, "*"),
            b'/' => self.single(TokenKind::Slash, "/"),
            b'<' => self.single(TokenKind::Less, "<"),
            b'>' => self.single(TokenKind::Greater, ">"),
            b',' => self.single(TokenKind::Comma, ","),
            b';' => self.single(TokenKind::Semicolon, ";"),
            b':' => self.single(TokenKind::Colon, ":"),
            b'(' => self.single(TokenKind::LParen, "("),
            b')' => self.single(TokenKind::RParen, ")"),
            b'{' => self.single(TokenKind::LBrace, "{"),
            b'}' => self.single(TokenKind::RBrace, "}"),
            b'[' => self.single(TokenKind::LBracket, "["),
            b']' => self.single(TokenKind::RBracket, "]"),
            b'"' => self.read_string(),
            c if is_letter(c) => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            _ => {
                // Decode a full character so multi-byte input yields one
                // Illegal token per character, not one per byte.
                let rest = std::str::from_utf8(&self.input[self.position..])
                    .expect("lexer position is a char boundary");
                let ch = rest.chars().next().expect("current() returned Some");
                self.position += ch.len_utf8();
                Token::new(TokenKind::Illegal, ch.to_string())
            }
        }
    }

    fn current(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn single(&mut self, kind: TokenKind, literal: &str) -> Token {
        self.advance();
        Token::new(kind, literal)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.advance();
        }
    }

    /// Identifiers are letters and underscores only; digits are not valid
    /// identifier characters in Monkey.
    fn read_identifier(&mut self) -> Token {
        let start = self.position;
        while self.current().is_some_and(is_letter) {
            self.advance();
        }
        let text = self.slice(start);
        Token::new(lookup_ident(text), text)
    }

    fn read_number(&mut self) -> Token {
        let start = self.position;
        while self.current().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        Token::new(TokenKind::Num, self.slice(start))
    }

    /// Reads a double-quoted string with no escape processing. The lexeme
    /// excludes the quotes; the closing quote is consumed. An unterminated
    /// string ends at end of input.
    fn read_string(&mut self) -> Token {
        self.advance();
        let start = self.position;
        while !matches!(self.current(), Some(b'"') | None) {
            self.advance();
        }
        let literal = self.slice(start).to_owned();
        if self.current() == Some(b'"') {
            self.advance();
        }
        Token::new(TokenKind::String, literal)
    }

    fn slice(&self, start: usize) -> &str {
        // The lexer only ever slices at ASCII boundaries it has scanned.
        std::str::from_utf8(&self.input[start..self.position]).expect("token slice is valid UTF-8")
    }
}

fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}
