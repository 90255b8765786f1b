// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recursive-descent parser from the adapted token stream to the tree.
//!
//! Every parse function starts at the first token of its construct and
//! leaves the cursor just past its last token. Whitespace is claimed
//! explicitly: [`Parser::space`] takes the gap before the next token, and
//! the node or padding that follows owns it. Closing brackets are checked
//! against the pair map from the tokenizer, so a nested construct can never
//! consume its parent's bracket.
//!
//! Trivia conventions:
//! - a statement's prefix holds the line breaks, blank lines and
//!   indentation before it
//! - a simple statement's `after` holds the rest of its line, including a
//!   trailing comment (or the space before its `;`)
//! - a node built from a left operand takes over the operand's prefix

mod errors;
mod expressions;
mod patterns;
mod statements;
mod strings;
mod types;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use tracing::debug;

use crate::tokenizer::{LineIndex, TokType, Token, TokenStream};
use crate::tree::source::BOM;
use crate::tree::{
    Checksum, CompilationUnit, Container, Empty, Expression, FileAttributes, Marker, Markers,
    ParseError, RightPadded, SourceFile, Space,
};

pub use errors::{prettify_error, ParserError};

pub(crate) type PResult<T> = Result<T, ParserError>;

/// Name recorded as the parser type of a failed parse.
pub const PARSER_TYPE: &str = "PythonParser";

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Parses module text into a compilation unit.
///
/// A leading byte-order mark is stripped and recorded on the unit.
pub fn parse_module(source_path: &str, text: &str) -> Result<CompilationUnit, ParserError> {
    let (bom, body) = split_bom(text);
    let mut parser = Parser::new(body)?;
    let (statements, eof) = parser.module()?;
    Ok(CompilationUnit::new(
        Space::EMPTY,
        Markers::EMPTY,
        source_path.to_string(),
        Some("UTF-8".to_string()),
        bom,
        None,
        None,
        Vec::new(),
        statements,
        eof,
    ))
}

/// Parses module text; a failure yields a `ParseError` source file that
/// prints the original text.
pub fn parse_source(source_path: &str, text: &str) -> SourceFile {
    match parse_module(source_path, text) {
        Ok(unit) => SourceFile::CompilationUnit(Rc::new(unit)),
        Err(err) => {
            debug!(source_path, error = %err, "parse failed");
            SourceFile::ParseError(Rc::new(parse_error(source_path, text, &err)))
        }
    }
}

/// The `ParseError` source file for `text` that failed with `err`.
pub fn parse_error(source_path: &str, text: &str, err: &ParserError) -> ParseError {
    let (bom, body) = split_bom(text);
    let marker = Marker::parse_exception(
        PARSER_TYPE,
        err.exception_type(),
        prettify_error(err, body, source_path),
    );
    ParseError::new(
        Space::EMPTY,
        Markers::build(vec![marker]),
        source_path.to_string(),
        Some("UTF-8".to_string()),
        bom,
        None,
        None,
        body.to_string(),
    )
}

/// Reads and parses the file at `path`, recording its checksum and
/// attributes. `source_path` is the path recorded on the result.
pub fn parse_path(path: &Path, source_path: &str) -> std::io::Result<SourceFile> {
    let bytes = std::fs::read(path)?;
    let checksum = Checksum::sha256(&bytes);
    let attributes = FileAttributes::from_path(path).ok();
    let source = match String::from_utf8(bytes) {
        Ok(text) => parse_source(source_path, &text),
        Err(err) => {
            let text = String::from_utf8_lossy(err.as_bytes()).into_owned();
            let marker = Marker::parse_exception(PARSER_TYPE, "UnicodeDecodeError", err.to_string());
            SourceFile::ParseError(Rc::new(ParseError::new(
                Space::EMPTY,
                Markers::build(vec![marker]),
                source_path.to_string(),
                None,
                false,
                None,
                None,
                text,
            )))
        }
    };
    Ok(match source {
        SourceFile::CompilationUnit(unit) => SourceFile::CompilationUnit(
            unit.with_checksum(Some(checksum))
                .with_file_attributes(attributes),
        ),
        SourceFile::ParseError(error) => SourceFile::ParseError(
            error
                .with_checksum(Some(checksum))
                .with_file_attributes(attributes),
        ),
    })
}

fn split_bom(text: &str) -> (bool, &str) {
    match text.strip_prefix(BOM) {
        Some(rest) => (true, rest),
        None => (false, text),
    }
}

/// Concatenates two spaces; either may be empty.
pub(crate) fn join(first: Space, second: Space) -> Space {
    if second.is_empty() {
        return first;
    }
    if first.is_empty() {
        return second;
    }
    let mut text = String::new();
    first.print(&mut text);
    second.print(&mut text);
    Space::format(&text)
}

/// Moves an expression's prefix out so a node built around it can own it.
pub(crate) fn hoist(expression: Expression) -> (Space, Expression) {
    let prefix = expression.prefix().clone();
    (prefix, expression.with_prefix(Space::EMPTY))
}

pub(crate) fn empty_expression(prefix: Space) -> Expression {
    Expression::Empty(Rc::new(Empty::new(prefix, Markers::EMPTY)))
}

fn trailing_comma(suffix: Space) -> Markers {
    Markers::build(vec![Marker::trailing_comma(suffix)])
}

pub(crate) struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pairs: HashMap<usize, usize>,
    lines: LineIndex,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str) -> PResult<Self> {
        let stream = TokenStream::new(source)?;
        Ok(Parser {
            tokens: stream.tokens,
            pairs: stream.pairs,
            lines: stream.lines,
            pos: 0,
        })
    }

    fn raw(&self) -> Token<'a> {
        self.tokens[self.pos]
    }

    /// Advances past the current token; never moves past `EndMarker`.
    fn bump(&mut self) -> Token<'a> {
        let token = self.raw();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn significant_from(&self, mut index: usize) -> usize {
        while self.tokens[index].kind == TokType::Whitespace {
            index += 1;
        }
        index
    }

    /// The next token that is not whitespace.
    fn peek(&self) -> Token<'a> {
        self.tokens[self.significant_from(self.pos)]
    }

    fn peek_nth(&self, n: usize) -> Token<'a> {
        let mut index = self.significant_from(self.pos);
        for _ in 0..n {
            if self.tokens[index].kind == TokType::EndMarker {
                break;
            }
            index = self.significant_from(index + 1);
        }
        self.tokens[index]
    }

    fn at_op(&self, op: &str) -> bool {
        self.peek().is_op(op)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek().is_name(keyword)
    }

    fn at_kind(&self, kind: TokType) -> bool {
        self.peek().kind == kind
    }

    fn at_line_end(&self) -> bool {
        matches!(self.peek().kind, TokType::Newline | TokType::EndMarker)
    }

    /// Takes the whitespace and comments before the next token.
    fn space(&mut self) -> Space {
        if self.raw().kind != TokType::Whitespace {
            return Space::EMPTY;
        }
        let mut text = String::new();
        while self.raw().kind == TokType::Whitespace {
            text.push_str(self.bump().text);
        }
        Space::format(&text)
    }

    /// Like [`Parser::space`], but also crosses line ends.
    fn trivia(&mut self) -> Space {
        let mut text = String::new();
        while matches!(self.raw().kind, TokType::Whitespace | TokType::Newline) {
            text.push_str(self.bump().text);
        }
        Space::format(&text)
    }

    /// Consumes `op` and returns the space before it.
    fn expect_op(&mut self, op: &str) -> PResult<Space> {
        if !self.at_op(op) {
            return self.unexpected(&format!("'{op}'"));
        }
        let before = self.space();
        self.bump();
        Ok(before)
    }

    fn expect_keyword(&mut self, keyword: &str) -> PResult<Space> {
        if !self.at_keyword(keyword) {
            return self.unexpected(&format!("'{keyword}'"));
        }
        let before = self.space();
        self.bump();
        Ok(before)
    }

    /// Consumes an opening bracket; returns the space before it and its
    /// token index for [`Parser::close`].
    fn open(&mut self, op: &str) -> PResult<(Space, usize)> {
        if !self.at_op(op) {
            return self.unexpected(&format!("'{op}'"));
        }
        let before = self.space();
        let index = self.pos;
        self.bump();
        Ok((before, index))
    }

    /// Consumes the bracket that closes the one at `open`.
    fn close(&mut self, open: usize, op: &str) -> PResult<Space> {
        if !self.at_op(op) {
            return self.unexpected(&format!("'{op}'"));
        }
        let before = self.space();
        if self.pairs.get(&open) != Some(&self.pos) {
            return self.error(format!("'{op}' does not close the bracket it follows"));
        }
        self.bump();
        Ok(before)
    }

    fn name(&mut self) -> PResult<Rc<crate::tree::Identifier>> {
        let token = self.peek();
        if token.kind != TokType::Name || is_keyword(token.text) {
            return self.unexpected("a name");
        }
        let prefix = self.space();
        self.bump();
        Ok(crate::tree::identifier(prefix, token.text))
    }

    /// Index of a live `Dedent` that follows the current line, if any.
    fn dedent_ahead(&self) -> Option<usize> {
        let mut index = self.pos;
        while matches!(
            self.tokens[index].kind,
            TokType::Whitespace | TokType::Newline
        ) {
            index += 1;
        }
        (self.tokens[index].kind == TokType::Dedent).then_some(index)
    }

    /// Consumes a block-closing `Dedent` by turning it into empty
    /// whitespace, so whatever follows claims the trivia around it.
    fn retire(&mut self, index: usize) {
        self.tokens[index].kind = TokType::Whitespace;
    }

    /// The keyword that continues a compound statement on a later line,
    /// such as `else` or `except`.
    fn continuation(&self, keywords: &[&str]) -> Option<&'a str> {
        let mut index = self.pos;
        while matches!(
            self.tokens[index].kind,
            TokType::Whitespace | TokType::Newline
        ) {
            index += 1;
        }
        let token = self.tokens[index];
        (token.kind == TokType::Name && keywords.contains(&token.text)).then_some(token.text)
    }

    fn error<T>(&self, message: impl Into<String>) -> PResult<T> {
        let token = self.peek();
        let (line, column) = self.lines.position(token.start);
        Err(ParserError::Syntax {
            message: message.into(),
            line,
            column,
            offset: token.start,
        })
    }

    fn unexpected<T>(&self, expected: &str) -> PResult<T> {
        let token = self.peek();
        let found = match token.kind {
            TokType::Newline => "end of line".to_string(),
            TokType::EndMarker => "end of file".to_string(),
            TokType::Indent => "indent".to_string(),
            TokType::Dedent => "dedent".to_string(),
            _ => format!("'{}'", token.text),
        };
        self.error(format!("expected {expected}, found {found}"))
    }

    /// Parses a bracketed, comma-separated list up to (not including) the
    /// closing `close`. An empty list is one placeholder holding the space
    /// inside the brackets.
    fn delimited<T>(
        &mut self,
        close: &str,
        mut element: impl FnMut(&mut Self) -> PResult<T>,
        placeholder: impl FnOnce(Space) -> T,
    ) -> PResult<Vec<RightPadded<T>>> {
        if self.at_op(close) {
            let inner = self.space();
            return Ok(vec![RightPadded::new(placeholder(inner))]);
        }
        let first = element(self)?;
        self.finish_delimited(Vec::new(), first, close, element)
    }

    /// Continues a bracketed list whose next element is already parsed.
    fn finish_delimited<T>(
        &mut self,
        mut elements: Vec<RightPadded<T>>,
        mut pending: T,
        close: &str,
        mut element: impl FnMut(&mut Self) -> PResult<T>,
    ) -> PResult<Vec<RightPadded<T>>> {
        loop {
            let after = self.space();
            if !self.raw().is_op(",") {
                elements.push(RightPadded::build(pending, after));
                return Ok(elements);
            }
            self.bump();
            if self.at_op(close) {
                let suffix = self.space();
                elements.push(RightPadded {
                    element: pending,
                    after,
                    markers: trailing_comma(suffix),
                });
                return Ok(elements);
            }
            elements.push(RightPadded::build(pending, after));
            pending = element(self)?;
        }
    }

    /// A comma-separated list without brackets, ending at the first token
    /// that is neither a comma nor the start of another element. The space
    /// after a trailing comma is left for the caller.
    fn undelimited<T>(
        &mut self,
        mut element: impl FnMut(&mut Self) -> PResult<T>,
        continues: impl Fn(&Self) -> bool,
    ) -> PResult<Vec<RightPadded<T>>> {
        let mut elements = Vec::new();
        let mut pending = element(self)?;
        loop {
            if !self.at_op(",") {
                elements.push(RightPadded::new(pending));
                return Ok(elements);
            }
            let after = self.space();
            self.bump();
            if !continues(self) {
                elements.push(RightPadded {
                    element: pending,
                    after,
                    markers: trailing_comma(Space::EMPTY),
                });
                return Ok(elements);
            }
            elements.push(RightPadded::build(pending, after));
            pending = element(self)?;
        }
    }

    /// Wraps a bracketed list in a container whose prefix is the space
    /// before the opening bracket.
    fn container<T>(
        &mut self,
        open: &str,
        close: &str,
        element: impl FnMut(&mut Self) -> PResult<T>,
        placeholder: impl FnOnce(Space) -> T,
    ) -> PResult<Container<T>> {
        let (before, index) = self.open(open)?;
        let elements = self.delimited(close, element, placeholder)?;
        self.close(index, close)?;
        Ok(Container::build(before, elements))
    }
}
