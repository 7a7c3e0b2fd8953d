//! Command-list tokenizer.
//!
//! A command list is a run of `<letters><number>` tokens:
//!
//! ```text
//!   a1.0w5s3      →  [a 1.0] [w 5] [s 3]
//!   a0.5, w10 b1  →  [a 0.5] [w 10] [b 1]
//! ```
//!
//! Input is expected lower-cased.  Bytes outside `[a-z0-9.]` separate
//! tokens and are skipped.  Letters without a number, or a number with no
//! letters in front of it, are [`MalformedToken`](ParseErrorKind::MalformedToken).

use crate::error::{ParseError, ParseErrorKind};

/// One `<name><number>` pair, borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub name: &'a str,
    pub number: &'a str,
    /// Byte column of `name` within the event block.
    pub column: usize,
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    block: usize,
    /// Offset of `src` within its event block, for error columns.
    base: usize,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, block: usize, base: usize) -> Self {
        Self {
            src,
            pos: 0,
            block,
            base,
            failed: false,
        }
    }

    fn error(&mut self, kind: ParseErrorKind, at: usize) -> ParseError {
        self.failed = true;
        ParseError::new(kind, self.block, self.base + at)
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let src = self.src;
        let start = self.pos;
        let bytes = src.as_bytes();
        while self.pos < bytes.len() && pred(bytes[self.pos]) {
            self.pos += 1;
        }
        &src[start..self.pos]
    }
}

fn is_number_byte(b: u8) -> bool {
    b.is_ascii_digit() || b == b'.'
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_lowercase() || is_number_byte(b)
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.take_while(|b| !is_token_byte(b));
        if self.pos >= self.src.len() {
            return None;
        }

        let column = self.pos;
        let name = self.take_while(|b| b.is_ascii_lowercase());
        if name.is_empty() {
            return Some(Err(self.error(ParseErrorKind::MalformedToken, column)));
        }
        let number = self.take_while(is_number_byte);
        if number.is_empty() {
            return Some(Err(self.error(ParseErrorKind::MalformedToken, column)));
        }

        Some(Ok(Token {
            name,
            number,
            column: self.base + column,
        }))
    }
}

/// Tokenize a whole command list, stopping at the first error.
pub fn tokenize(src: &str, block: usize, base: usize) -> Result<Vec<Token<'_>>, ParseError> {
    Lexer::new(src, block, base).collect()
}
