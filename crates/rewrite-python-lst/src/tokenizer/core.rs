// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The Python tokenizer.
//!
//! Produces the significant tokens of a module: names, numbers, strings,
//! operators, f-string parts and the structural `Newline`/`Indent`/`Dedent`
//! tokens. Comments, blank lines, line continuations and newlines inside
//! brackets are not tokens; they are the gaps between tokens, which
//! [`super::adapter`] turns into whitespace tokens.
//!
//! f-strings and t-strings follow PEP 701: the string is split into
//! `FStringStart`, `FStringMiddle` and `FStringEnd`, and every replacement
//! field is tokenized like ordinary code, so nesting is unlimited.

use std::borrow::Cow;

use thiserror::Error;
use unicode_normalization::{is_nfkc_quick, IsNormalized, UnicodeNormalization};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokType {
    Name,
    Number,
    String,
    FStringStart,
    FStringMiddle,
    FStringEnd,
    Op,
    /// End of a logical line. Zero width, placed at the line break.
    Newline,
    /// Zero width, placed at the first token of the indented line.
    Indent,
    Dedent,
    EndMarker,
    /// A gap between two tokens; produced by the adapter, never here.
    Whitespace,
}

impl TokType {
    /// Tokens that occupy no source text.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            TokType::Newline | TokType::Indent | TokType::Dedent | TokType::EndMarker
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokType,
    pub text: &'a str,
    /// Byte offsets into the source.
    pub start: usize,
    pub end: usize,
}

impl Token<'_> {
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokType::Op && self.text == op
    }

    pub fn is_name(&self, name: &str) -> bool {
        self.kind == TokType::Name && self.text == name
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokError {
    #[error("unterminated string literal")]
    UnterminatedString { offset: usize },
    #[error("unterminated triple-quoted string literal")]
    UnterminatedTripleQuotedString { offset: usize },
    #[error("unterminated f-string replacement field")]
    UnterminatedReplacementField { offset: usize },
    #[error("unmatched '{bracket}'")]
    UnmatchedBracket { bracket: char, offset: usize },
    #[error("closing parenthesis '{close}' does not match opening parenthesis '{open}'")]
    MismatchedBracket { open: char, close: char, offset: usize },
    #[error("unindent does not match any outer indentation level")]
    Dedent { offset: usize },
    #[error("invalid character '{character}'")]
    BadCharacter { character: char, offset: usize },
    #[error("invalid number literal")]
    BadNumber { offset: usize },
    #[error("unexpected character after line continuation character")]
    BadContinuation { offset: usize },
}

impl TokError {
    pub fn offset(&self) -> usize {
        match *self {
            TokError::UnterminatedString { offset }
            | TokError::UnterminatedTripleQuotedString { offset }
            | TokError::UnterminatedReplacementField { offset }
            | TokError::UnmatchedBracket { offset, .. }
            | TokError::MismatchedBracket { offset, .. }
            | TokError::Dedent { offset }
            | TokError::BadCharacter { offset, .. }
            | TokError::BadNumber { offset }
            | TokError::BadContinuation { offset } => offset,
        }
    }
}

/// Longest operators first so the scan is greedy.
const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...", "->", ":=", "**", "//", ">>", "<<", "<=", ">=", "==",
    "!=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "@=", "+", "-", "*", "/", "%", "&",
    "|", "^", "~", "<", ">", "(", ")", "[", "]", "{", "}", ",", ":", ";", ".", "=", "@", "!",
];

#[derive(Debug, Clone)]
enum Mode {
    /// Literal text of an f-string, or of a format spec when `spec` is set.
    Literal {
        quote: &'static str,
        raw: bool,
        spec: bool,
    },
    /// Code inside a replacement field opened at bracket depth `depth`.
    Expr { depth: usize },
}

/// Tokenizer state; iterate it to get tokens.
pub struct TokState<'a> {
    source: &'a str,
    pos: usize,
    indents: Vec<usize>,
    brackets: Vec<(char, usize)>,
    modes: Vec<Mode>,
    /// At the start of a logical line, before its indentation is measured.
    at_line_start: bool,
    /// The current logical line has produced a token.
    line_has_tokens: bool,
    pending_dedents: usize,
    finished: bool,
}

impl<'a> TokState<'a> {
    pub fn new(source: &'a str) -> Self {
        TokState {
            source,
            pos: 0,
            indents: vec![0],
            brackets: Vec::new(),
            modes: Vec::new(),
            at_line_start: true,
            line_has_tokens: false,
            pending_dedents: 0,
            finished: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn token(&mut self, kind: TokType, start: usize) -> Token<'a> {
        if !kind.is_structural() {
            self.line_has_tokens = true;
        }
        Token {
            kind,
            text: &self.source[start..self.pos],
            start,
            end: self.pos,
        }
    }

    fn zero_width(&self, kind: TokType, at: usize) -> Token<'a> {
        Token {
            kind,
            text: "",
            start: at,
            end: at,
        }
    }

    fn next_token(&mut self) -> Result<Token<'a>, TokError> {
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            return Ok(self.zero_width(TokType::Dedent, self.pos));
        }
        match self.modes.last().cloned() {
            Some(Mode::Literal { quote, raw, spec }) => self.fstring_literal(quote, raw, spec),
            Some(Mode::Expr { depth }) => self.code(Some(depth)),
            None => self.code(None),
        }
    }

    /// Measures indentation at the start of a logical line, skipping blank
    /// and comment-only lines. Returns an `Indent`/`Dedent` token if the
    /// level changed.
    fn line_start(&mut self) -> Result<Option<Token<'a>>, TokError> {
        loop {
            let line_begin = self.pos;
            let mut column = 0usize;
            while let Some(c) = self.peek() {
                match c {
                    ' ' => column += 1,
                    '\t' => column = (column / 8 + 1) * 8,
                    '\x0c' => column = 0,
                    _ => break,
                }
                self.pos += 1;
            }
            match self.peek() {
                None => {
                    self.pos = line_begin;
                    return Ok(None);
                }
                Some('#') => {
                    self.skip_comment();
                    if !self.skip_line_break() {
                        return Ok(None);
                    }
                }
                Some('\n' | '\r') => {
                    self.skip_line_break();
                }
                Some('\\') if self.continuation_follows() => {
                    // A continuation at the start of a line joins it to the
                    // next; the joined line is measured from here.
                    self.pos = line_begin;
                    return Ok(None);
                }
                Some(_) => {
                    self.at_line_start = false;
                    let current = self.indents.last().copied().unwrap_or(0);
                    if column > current {
                        self.indents.push(column);
                        return Ok(Some(self.zero_width(TokType::Indent, self.pos)));
                    }
                    if column < current {
                        let mut dedents = 0;
                        while self.indents.last().copied().unwrap_or(0) > column {
                            self.indents.pop();
                            dedents += 1;
                        }
                        if self.indents.last().copied().unwrap_or(0) != column {
                            return Err(TokError::Dedent { offset: self.pos });
                        }
                        self.pending_dedents = dedents - 1;
                        return Ok(Some(self.zero_width(TokType::Dedent, self.pos)));
                    }
                    return Ok(None);
                }
            }
        }
    }

    fn continuation_follows(&self) -> bool {
        matches!(self.peek_at(1), Some('\n' | '\r'))
    }

    fn skip_comment(&mut self) {
        let rest = self.rest();
        let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
        self.pos += len;
    }

    /// Skips one line break; false at end of input.
    fn skip_line_break(&mut self) -> bool {
        let rest = self.rest();
        if rest.starts_with("\r\n") {
            self.pos += 2;
        } else if rest.starts_with('\n') || rest.starts_with('\r') {
            self.pos += 1;
        } else {
            return false;
        }
        true
    }

    fn code(&mut self, field_depth: Option<usize>) -> Result<Token<'a>, TokError> {
        if self.at_line_start && self.brackets.is_empty() && field_depth.is_none() {
            if let Some(token) = self.line_start()? {
                return Ok(token);
            }
            self.at_line_start = false;
        }
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\x0c') => self.pos += 1,
                Some('#') => self.skip_comment(),
                Some('\\') => {
                    let at = self.pos;
                    self.pos += 1;
                    if !self.skip_line_break() {
                        if self.pos >= self.source.len() {
                            break;
                        }
                        return Err(TokError::BadContinuation { offset: at });
                    }
                }
                Some('\n' | '\r') => {
                    let at = self.pos;
                    if self.brackets.is_empty() && field_depth.is_none() {
                        if self.line_has_tokens {
                            self.skip_line_break();
                            self.at_line_start = true;
                            self.line_has_tokens = false;
                            return Ok(self.zero_width(TokType::Newline, at));
                        }
                        self.skip_line_break();
                        self.at_line_start = true;
                        if let Some(token) = self.line_start()? {
                            return Ok(token);
                        }
                        self.at_line_start = false;
                    } else {
                        self.skip_line_break();
                    }
                }
                _ => break,
            }
        }

        let start = self.pos;
        let Some(c) = self.peek() else {
            return self.end_of_input();
        };

        if let Some(depth) = field_depth {
            if self.brackets.len() == depth {
                match c {
                    '}' => {
                        self.pos += 1;
                        self.brackets.pop();
                        self.modes.pop();
                        return Ok(self.token(TokType::Op, start));
                    }
                    ':' => {
                        self.pos += 1;
                        if let Some((quote, raw)) = self.enclosing_string() {
                            self.modes.push(Mode::Literal {
                                quote,
                                raw,
                                spec: true,
                            });
                        }
                        return Ok(self.token(TokType::Op, start));
                    }
                    '!' if self.peek_at(1) != Some('=') => {
                        self.pos += 1;
                        return Ok(self.token(TokType::Op, start));
                    }
                    _ => {}
                }
            }
        }

        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
            return self.number(start);
        }
        if let Some((prefix_len, quote_char)) = self.string_prefix() {
            return self.string(start, prefix_len, quote_char);
        }
        if is_identifier_start(c) {
            while self.peek().is_some_and(is_identifier_continue) {
                self.pos += self.peek().map_or(1, char::len_utf8);
            }
            return Ok(self.token(TokType::Name, start));
        }
        if let Some(op) = OPERATORS.iter().find(|op| self.rest().starts_with(**op)) {
            self.pos += op.len();
            self.track_bracket(c, start)?;
            return Ok(self.token(TokType::Op, start));
        }
        Err(TokError::BadCharacter {
            character: c,
            offset: start,
        })
    }

    fn end_of_input(&mut self) -> Result<Token<'a>, TokError> {
        if let Some((bracket, offset)) = self.brackets.last().copied() {
            if self.modes.is_empty() {
                return Err(TokError::UnmatchedBracket { bracket, offset });
            }
            return Err(TokError::UnterminatedReplacementField { offset });
        }
        if self.line_has_tokens {
            self.line_has_tokens = false;
            return Ok(self.zero_width(TokType::Newline, self.pos));
        }
        if self.indents.len() > 1 {
            self.indents.pop();
            return Ok(self.zero_width(TokType::Dedent, self.pos));
        }
        self.finished = true;
        Ok(self.zero_width(TokType::EndMarker, self.pos))
    }

    fn track_bracket(&mut self, c: char, offset: usize) -> Result<(), TokError> {
        match c {
            '(' | '[' | '{' => self.brackets.push((c, offset)),
            ')' | ']' | '}' => {
                let Some((open, _)) = self.brackets.pop() else {
                    return Err(TokError::UnmatchedBracket { bracket: c, offset });
                };
                let expected = match open {
                    '(' => ')',
                    '[' => ']',
                    _ => '}',
                };
                if expected != c {
                    return Err(TokError::MismatchedBracket {
                        open,
                        close: c,
                        offset,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Quote and rawness of the innermost f-string.
    fn enclosing_string(&self) -> Option<(&'static str, bool)> {
        self.modes.iter().rev().find_map(|mode| match mode {
            Mode::Literal { quote, raw, .. } => Some((*quote, *raw)),
            Mode::Expr { .. } => None,
        })
    }

    fn number(&mut self, start: usize) -> Result<Token<'a>, TokError> {
        let bytes = self.source.as_bytes();
        let mut i = self.pos;
        let digits = |i: &mut usize, ok: fn(u8) -> bool| {
            while *i < bytes.len() && (ok(bytes[*i]) || bytes[*i] == b'_') {
                *i += 1;
            }
        };
        let radix_prefix = bytes[i] == b'0'
            && i + 1 < bytes.len()
            && matches!(bytes[i + 1], b'x' | b'X' | b'o' | b'O' | b'b' | b'B');
        if radix_prefix {
            i += 2;
            let before = i;
            digits(&mut i, |b| b.is_ascii_hexdigit());
            if i == before {
                return Err(TokError::BadNumber { offset: start });
            }
        } else {
            digits(&mut i, |b| b.is_ascii_digit());
            if i < bytes.len() && bytes[i] == b'.' {
                i += 1;
                digits(&mut i, |b| b.is_ascii_digit());
            }
            if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
                let mut j = i + 1;
                if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
                    j += 1;
                }
                if j < bytes.len() && bytes[j].is_ascii_digit() {
                    i = j;
                    digits(&mut i, |b| b.is_ascii_digit());
                }
            }
            if i < bytes.len() && matches!(bytes[i], b'j' | b'J') {
                i += 1;
            }
        }
        if bytes[i - 1] == b'_' {
            return Err(TokError::BadNumber { offset: start });
        }
        self.pos = i;
        Ok(self.token(TokType::Number, start))
    }

    /// Length of a string prefix at the cursor and the quote that follows.
    fn string_prefix(&self) -> Option<(usize, char)> {
        let rest = self.rest();
        let prefix_len = rest
            .bytes()
            .take_while(|b| matches!(b.to_ascii_lowercase(), b'r' | b'u' | b'b' | b'f' | b't'))
            .take(3)
            .count();
        let quote = rest[prefix_len..].chars().next()?;
        if quote != '\'' && quote != '"' {
            return None;
        }
        let prefix = rest[..prefix_len].to_ascii_lowercase();
        let valid = matches!(
            prefix.as_str(),
            "" | "r" | "u" | "b" | "f" | "t" | "br" | "rb" | "fr" | "rf" | "tr" | "rt"
        );
        valid.then_some((prefix_len, quote))
    }

    fn string(&mut self, start: usize, prefix_len: usize, quote: char) -> Result<Token<'a>, TokError> {
        let prefix = self.source[start..start + prefix_len].to_ascii_lowercase();
        let raw = prefix.contains('r');
        let after_prefix = start + prefix_len;
        let triple_text = if quote == '"' { "\"\"\"" } else { "'''" };
        let triple = self.source[after_prefix..].starts_with(triple_text);
        let quote_str: &'static str = match (quote, triple) {
            ('"', true) => "\"\"\"",
            ('"', false) => "\"",
            (_, true) => "'''",
            (_, false) => "'",
        };
        self.pos = after_prefix + quote_str.len();

        if prefix.contains('f') || prefix.contains('t') {
            self.modes.push(Mode::Literal {
                quote: quote_str,
                raw,
                spec: false,
            });
            return Ok(self.token(TokType::FStringStart, start));
        }

        loop {
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                return Err(if triple {
                    TokError::UnterminatedTripleQuotedString { offset: start }
                } else {
                    TokError::UnterminatedString { offset: start }
                });
            };
            if rest.starts_with(quote_str) {
                self.pos += quote_str.len();
                return Ok(self.token(TokType::String, start));
            }
            match c {
                '\\' => {
                    self.pos += 1;
                    if let Some(next) = self.peek() {
                        if next == '\r' && self.rest().starts_with("\r\n") {
                            self.pos += 2;
                        } else {
                            self.pos += next.len_utf8();
                        }
                    }
                }
                '\n' | '\r' if !triple => {
                    return Err(TokError::UnterminatedString { offset: start });
                }
                _ => self.pos += c.len_utf8(),
            }
        }
    }

    fn fstring_literal(
        &mut self,
        quote: &'static str,
        raw: bool,
        spec: bool,
    ) -> Result<Token<'a>, TokError> {
        let start = self.pos;
        let triple = quote.len() == 3;
        loop {
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                return Err(if triple {
                    TokError::UnterminatedTripleQuotedString { offset: start }
                } else {
                    TokError::UnterminatedString { offset: start }
                });
            };
            if rest.starts_with(quote) {
                if self.pos > start {
                    return Ok(self.token(TokType::FStringMiddle, start));
                }
                if spec {
                    return Err(TokError::UnterminatedReplacementField { offset: start });
                }
                self.pos += quote.len();
                self.modes.pop();
                return Ok(self.token(TokType::FStringEnd, start));
            }
            match c {
                '{' if !spec && rest.starts_with("{{") => self.pos += 2,
                '}' if !spec && rest.starts_with("}}") => self.pos += 2,
                '{' => {
                    if self.pos > start {
                        return Ok(self.token(TokType::FStringMiddle, start));
                    }
                    self.pos += 1;
                    self.brackets.push(('{', start));
                    self.modes.push(Mode::Expr {
                        depth: self.brackets.len(),
                    });
                    return Ok(self.token(TokType::Op, start));
                }
                '}' if spec => {
                    if self.pos > start {
                        return Ok(self.token(TokType::FStringMiddle, start));
                    }
                    // The spec ends; the field's closing brace is next.
                    self.modes.pop();
                    return self.next_token();
                }
                '}' => self.pos += 1,
                '\\' if !raw => {
                    self.pos += 1;
                    let rest = self.rest();
                    if rest.starts_with("N{") {
                        let close = rest.find('}').map_or(rest.len(), |i| i + 1);
                        self.pos += close;
                    } else if let Some(next) = rest.chars().next() {
                        if next != '{' && next != '}' {
                            self.pos += next.len_utf8();
                        }
                    }
                }
                '\\' => {
                    self.pos += 1;
                    if let Some(next) = self.peek() {
                        if next != '{' && next != '}' {
                            self.pos += next.len_utf8();
                        }
                    }
                }
                '\n' | '\r' if !triple => {
                    return Err(TokError::UnterminatedString { offset: start });
                }
                _ => self.pos += c.len_utf8(),
            }
        }
    }
}

impl<'a> Iterator for TokState<'a> {
    type Item = Result<Token<'a>, TokError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_identifier_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// The name Python binds for identifier text: its NFKC form, so `ﬁle` and
/// `file` are one name. Tokens keep the text as written.
pub fn normalize_identifier(name: &str) -> Cow<'_, str> {
    if name.is_ascii() || is_nfkc_quick(name.chars()) == IsNormalized::Yes {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(name.nfkc().collect())
    }
}

/// Tokenizes a whole module, ending with `EndMarker`.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, TokError> {
    TokState::new(source).collect()
}
