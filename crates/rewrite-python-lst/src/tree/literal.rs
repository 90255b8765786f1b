// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Decoding literal source text into values.
//!
//! A `Literal` keeps its exact source; the decoded value is derived on
//! demand so that `0x10` and `16`, or `'a'` and `"a"`, compare equal when
//! matching templates.

use crate::tree::kinds::LiteralKind;
use crate::tree::Literal;

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    None,
    Boolean(bool),
    /// Integers wider than `i128` keep their normalized digits.
    Integer(IntegerValue),
    Float(f64),
    /// The imaginary part of a complex literal such as `2j`.
    Complex(f64),
    String(String),
    Bytes(Vec<u8>),
    Ellipsis,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegerValue {
    Small(i128),
    Big { radix: u32, digits: String },
}

impl Literal {
    /// The decoded value, or `None` when the source is not a well-formed
    /// literal of its kind.
    pub fn value(&self) -> Option<LiteralValue> {
        decode(&self.value_source, self.kind)
    }

    /// Whether two literals denote the same value regardless of spelling.
    pub fn same_value(&self, other: &Literal) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match (self.value(), other.value()) {
            (Some(a), Some(b)) => a == b,
            _ => self.value_source == other.value_source,
        }
    }
}

pub fn decode(source: &str, kind: LiteralKind) -> Option<LiteralValue> {
    match kind {
        LiteralKind::None => (source == "None").then_some(LiteralValue::None),
        LiteralKind::Boolean => match source {
            "True" => Some(LiteralValue::Boolean(true)),
            "False" => Some(LiteralValue::Boolean(false)),
            _ => None,
        },
        LiteralKind::Integer => decode_integer(source).map(LiteralValue::Integer),
        LiteralKind::Float => parse_float(source).map(LiteralValue::Float),
        LiteralKind::Complex => {
            let body = source.strip_suffix(['j', 'J'])?;
            parse_float(body).map(LiteralValue::Complex)
        }
        LiteralKind::String => decode_string(source).map(LiteralValue::String),
        LiteralKind::Bytes => decode_bytes(source).map(LiteralValue::Bytes),
        LiteralKind::Ellipsis => (source == "...").then_some(LiteralValue::Ellipsis),
    }
}

fn decode_integer(source: &str) -> Option<IntegerValue> {
    let cleaned: String = source.chars().filter(|&c| c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, lower.as_str())
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    Some(match i128::from_str_radix(digits, radix) {
        Ok(value) => IntegerValue::Small(value),
        Err(_) => IntegerValue::Big {
            radix,
            digits: digits.trim_start_matches('0').to_string(),
        },
    })
}

fn parse_float(source: &str) -> Option<f64> {
    let cleaned: String = source.chars().filter(|&c| c != '_').collect();
    cleaned.parse().ok()
}

/// Splits `rb'''text'''` into its lowercase prefix and body.
fn split_quoted(source: &str) -> Option<(String, &str)> {
    let quote_at = source.find(['\'', '"'])?;
    let prefix = source[..quote_at].to_ascii_lowercase();
    let rest = &source[quote_at..];
    let quote = &rest[..1];
    let triple = quote.repeat(3);
    let body = if rest.len() >= 6 && rest.starts_with(&triple) && rest.ends_with(&triple) {
        &rest[3..rest.len() - 3]
    } else if rest.len() >= 2 && rest.ends_with(quote) {
        &rest[1..rest.len() - 1]
    } else {
        return None;
    };
    Some((prefix, body))
}

fn decode_string(source: &str) -> Option<String> {
    let (prefix, body) = split_quoted(source)?;
    if prefix.contains('b') || prefix.contains('f') || prefix.contains('t') {
        return None;
    }
    if prefix.contains('r') {
        return Some(body.to_string());
    }
    unescape(body, false).map(|chars| chars.into_iter().collect())
}

fn decode_bytes(source: &str) -> Option<Vec<u8>> {
    let (prefix, body) = split_quoted(source)?;
    if !prefix.contains('b') {
        return None;
    }
    if prefix.contains('r') {
        return Some(body.as_bytes().to_vec());
    }
    let chars = unescape(body, true)?;
    chars
        .into_iter()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect()
}

/// Processes backslash escapes. Unknown escapes keep their backslash, as
/// Python does.
fn unescape(body: &str, bytes: bool) -> Option<Vec<char>> {
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };
        match escape {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{b}'),
            '0'..='7' => {
                let mut value = escape.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value)?);
            }
            'x' => out.push(hex_escape(&mut chars, 2)?),
            'u' if !bytes => out.push(hex_escape(&mut chars, 4)?),
            'U' if !bytes => out.push(hex_escape(&mut chars, 8)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Some(out)
}

fn hex_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, len: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..len {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(value)
}
