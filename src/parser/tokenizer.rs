//! Splits an expression string into classified lexemes.
//!
//! Scanning never fails: anything unrecognized becomes a one-character
//! [`TokenKind::Unknown`] lexeme, and the parser reports it later.

use super::token::{Token, TokenKind};

/// Remove all whitespace, wherever it appears
pub fn strip_whitespace(source: &str) -> String {
    source.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Tokenize `source`, stripping whitespace first
pub fn tokenize<C>(source: &str) -> Vec<Token<C>> {
    let stripped = strip_whitespace(source);
    Tokenizer::new(&stripped)
        .map(|(kind, text)| Token::lexeme(kind, text))
        .collect()
}

/// Iterator over `(kind, text)` lexemes of an already whitespace-free string.
///
/// The lexemes partition the input: concatenating their text gives it back.
pub struct Tokenizer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer { input, position: 0 }
    }

    fn take(&mut self, kind: TokenKind, len: usize) -> (TokenKind, &'a str) {
        let text = &self.input[self.position..self.position + len];
        self.position += len;
        (kind, text)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = (TokenKind, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.input[self.position..];
        let first = rest.chars().next()?;

        if let Some(kind) = rest.get(..2).and_then(TokenKind::from_digraph) {
            return Some(self.take(kind, 2));
        }
        if let Some(kind) = TokenKind::from_punctuation(first) {
            return Some(self.take(kind, 1));
        }
        if first.is_ascii_alphabetic() || first == '_' {
            let len = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            return Some(self.take(TokenKind::Identifier, len));
        }
        if first.is_ascii_digit() || first == '.' {
            let len = number_len(rest);
            if len > 0 {
                return Some(self.take(TokenKind::Number, len));
            }
        }
        Some(self.take(TokenKind::Unknown, first.len_utf8()))
    }
}

/// Length of the numeric literal at the start of `s`, read the way `strtod`
/// reads it: decimal digits with an optional fraction and exponent, or a
/// `0x` hexadecimal literal with an optional fraction and binary exponent. A
/// sign is never consumed; unary signs are operators. Returns 0 when no
/// digits lead the literal.
fn number_len(s: &str) -> usize {
    hex_len(s.as_bytes()).unwrap_or_else(|| decimal_len(s.as_bytes()))
}

/// Count of bytes from `start` on that satisfy `pred`
fn run_len(bytes: &[u8], start: usize, pred: fn(&u8) -> bool) -> usize {
    bytes[start.min(bytes.len())..]
        .iter()
        .take_while(|b| pred(*b))
        .count()
}

/// End of the optional exponent introduced by one of `markers` at `len`
fn exponent_end(bytes: &[u8], len: usize, markers: [u8; 2]) -> usize {
    if !bytes.get(len).is_some_and(|b| markers.contains(b)) {
        return len;
    }
    let mut exponent = len + 1;
    if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
        exponent += 1;
    }
    match run_len(bytes, exponent, u8::is_ascii_digit) {
        0 => len,
        digits => exponent + digits,
    }
}

/// Digits, then an optional `.` fraction, with at least one digit overall.
/// Returns the length of the mantissa, or `None` without any digit.
fn mantissa_len(bytes: &[u8], start: usize, digit: fn(&u8) -> bool) -> Option<usize> {
    let whole = run_len(bytes, start, digit);
    let mut len = start + whole;
    if bytes.get(len) == Some(&b'.') {
        let fraction = run_len(bytes, len + 1, digit);
        if whole + fraction == 0 {
            return None;
        }
        len += 1 + fraction;
    } else if whole == 0 {
        return None;
    }
    Some(len)
}

fn decimal_len(bytes: &[u8]) -> usize {
    match mantissa_len(bytes, 0, u8::is_ascii_digit) {
        Some(len) => exponent_end(bytes, len, [b'e', b'E']),
        None => 0,
    }
}

/// `None` unless `bytes` starts with `0x` and at least one hex digit, so
/// that `0xg` still reads as the decimal `0`
fn hex_len(bytes: &[u8]) -> Option<usize> {
    if !(bytes.starts_with(b"0x") || bytes.starts_with(b"0X")) {
        return None;
    }
    let len = mantissa_len(bytes, 2, u8::is_ascii_hexdigit)?;
    Some(exponent_end(bytes, len, [b'p', b'P']))
}

/// Value of a literal the tokenizer classified as [`TokenKind::Number`].
/// `None` if it does not fit, e.g. a binary exponent beyond `i32`.
pub fn parse_number(text: &str) -> Option<f64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => parse_hex(hex),
        None => text.parse().ok(),
    }
}

fn parse_hex(s: &str) -> Option<f64> {
    let (mantissa, exponent) = match s.find(|c| c == 'p' || c == 'P') {
        Some(i) => (&s[..i], s[i + 1..].parse::<i32>().ok()?),
        None => (s, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mut value = 0.0;
    for c in whole.chars() {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let mut scale = 1.0 / 16.0;
    for c in fraction.chars() {
        value += f64::from(c.to_digit(16)?) * scale;
        scale /= 16.0;
    }
    Some(value * 2f64.powi(exponent))
}
