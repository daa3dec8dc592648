//! Condition tokenizer
//!
//! Produces position-tagged tokens over ASCII input. Every token keeps its
//! byte offset so parse errors can point at the offending text.

use crate::error::{ParseError, Result};
use log::debug;
use std::fmt;

/// Token categories recognized in a condition
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Ident(String),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    /// `&` or `&&`
    And,
    /// `|` or `||`
    Or,
    /// `!` or `~`
    Not,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(v) => write!(f, "number {}", v),
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::Str(s) => write!(f, "string '{}'", s),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::LBracket => f.write_str("'['"),
            TokenKind::RBracket => f.write_str("']'"),
            TokenKind::Dot => f.write_str("'.'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Plus => f.write_str("'+'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::Star => f.write_str("'*'"),
            TokenKind::Slash => f.write_str("'/'"),
            TokenKind::Eq => f.write_str("'=='"),
            TokenKind::Ne => f.write_str("'!='"),
            TokenKind::Gt => f.write_str("'>'"),
            TokenKind::Ge => f.write_str("'>='"),
            TokenKind::Lt => f.write_str("'<'"),
            TokenKind::Le => f.write_str("'<='"),
            TokenKind::And => f.write_str("'&'"),
            TokenKind::Or => f.write_str("'|'"),
            TokenKind::Not => f.write_str("'~'"),
            TokenKind::Eof => f.write_str("end of condition"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub position: usize,
    /// Byte length of the source text
    pub len: usize,
}

impl Token {
    fn new(kind: TokenKind, position: usize, len: usize) -> Self {
        Token { kind, position, len }
    }
}

/// Tokenize a condition string. The returned vector always ends with `Eof`.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>> {
    scan(input).map_err(|e| {
        debug!("Rejected condition '{}': {}", input, e);
        e
    })
}

fn scan(input: &str) -> Result<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == b'.' && next_is_digit(bytes, i + 1)) {
            let (token, end) = lex_number(input, i)?;
            tokens.push(token);
            i = end;
            continue;
        }

        if c.is_ascii_alphabetic() || c == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(Token::new(
                TokenKind::Ident(input[start..i].to_string()),
                start,
                i - start,
            ));
            continue;
        }

        if c == b'\'' || c == b'"' {
            let start = i;
            i += 1;
            while i < bytes.len() && bytes[i] != c {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(ParseError::syntax(start, "unterminated string literal"));
            }
            let text = input[start + 1..i].to_string();
            i += 1;
            tokens.push(Token::new(TokenKind::Str(text), start, i - start));
            continue;
        }

        let next = bytes.get(i + 1).copied();
        let (kind, len) = match (c, next) {
            (b'=', Some(b'=')) => (TokenKind::Eq, 2),
            (b'=', _) => {
                return Err(ParseError::syntax(i, "unexpected '=', use '==' for equality"));
            }
            (b'!', Some(b'=')) => (TokenKind::Ne, 2),
            (b'!', _) => (TokenKind::Not, 1),
            (b'>', Some(b'=')) => (TokenKind::Ge, 2),
            (b'>', _) => (TokenKind::Gt, 1),
            (b'<', Some(b'=')) => (TokenKind::Le, 2),
            (b'<', _) => (TokenKind::Lt, 1),
            (b'&', Some(b'&')) => (TokenKind::And, 2),
            (b'&', _) => (TokenKind::And, 1),
            (b'|', Some(b'|')) => (TokenKind::Or, 2),
            (b'|', _) => (TokenKind::Or, 1),
            (b'~', _) => (TokenKind::Not, 1),
            (b'*', Some(b'*')) => {
                return Err(ParseError::unknown_operator(i, "unsupported operator '**'"));
            }
            (b'%', _) => {
                return Err(ParseError::unknown_operator(i, "unsupported operator '%'"));
            }
            (b'^', _) => {
                return Err(ParseError::unknown_operator(i, "unsupported operator '^'"));
            }
            (b'+', _) => (TokenKind::Plus, 1),
            (b'-', _) => (TokenKind::Minus, 1),
            (b'*', _) => (TokenKind::Star, 1),
            (b'/', _) => (TokenKind::Slash, 1),
            (b'(', _) => (TokenKind::LParen, 1),
            (b')', _) => (TokenKind::RParen, 1),
            (b'[', _) => (TokenKind::LBracket, 1),
            (b']', _) => (TokenKind::RBracket, 1),
            (b'.', _) => (TokenKind::Dot, 1),
            (b',', _) => (TokenKind::Comma, 1),
            _ => {
                let ch = input[i..].chars().next().unwrap_or('?');
                return Err(ParseError::syntax(i, format!("unexpected character '{}'", ch)));
            }
        };
        tokens.push(Token::new(kind, i, len));
        i += len;
    }

    tokens.push(Token::new(TokenKind::Eof, input.len(), 0));
    Ok(tokens)
}

fn next_is_digit(bytes: &[u8], index: usize) -> bool {
    bytes.get(index).map_or(false, |b| b.is_ascii_digit())
}

/// Scan a decimal literal: digits, optional fraction, optional exponent.
fn lex_number(input: &str, start: usize) -> Result<(Token, usize)> {
    let bytes = input.as_bytes();
    let mut i = start;

    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }

    // A dot not followed by a digit is a method call (`1.diff()` fails later)
    if i < bytes.len() && bytes[i] == b'.' && next_is_digit(bytes, i + 1) {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if !next_is_digit(bytes, j) {
            return Err(ParseError::invalid_literal(
                start,
                format!("malformed exponent in '{}'", &input[start..j.min(bytes.len())]),
            ));
        }
        i = j;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }

    // Reject `1.2.3`, `12abc` and similar run-ons
    if i < bytes.len() {
        let trailing = bytes[i];
        let run_on = trailing.is_ascii_alphanumeric()
            || trailing == b'_'
            || (trailing == b'.' && next_is_digit(bytes, i + 1));
        if run_on {
            let mut end = i;
            while end < bytes.len()
                && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_' || bytes[end] == b'.')
            {
                end += 1;
            }
            return Err(ParseError::invalid_literal(
                start,
                format!("malformed number '{}'", &input[start..end]),
            ));
        }
    }

    let text = &input[start..i];
    let value: f64 = text
        .parse()
        .map_err(|_| ParseError::invalid_literal(start, format!("malformed number '{}'", text)))?;
    if !value.is_finite() {
        return Err(ParseError::invalid_literal(
            start,
            format!("number '{}' is out of range", text),
        ));
    }

    Ok((Token::new(TokenKind::Number(value), start, i - start), i))
}
