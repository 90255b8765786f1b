// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Turns the tokenizer's output into the gap-free stream the parser walks.
//!
//! The adapted stream covers every byte of the source exactly once: the text
//! between two tokens becomes a `Whitespace` token. It also carries the
//! bracket pair map and a line index for error positions.

use std::collections::HashMap;

use crate::tokenizer::core::{tokenize, TokError, TokType, Token};

#[derive(Debug)]
pub struct TokenStream<'a> {
    pub source: &'a str,
    pub tokens: Vec<Token<'a>>,
    /// Index of every opening bracket to the index of its closing bracket.
    pub pairs: HashMap<usize, usize>,
    pub lines: LineIndex,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str) -> Result<Self, TokError> {
        let mut tokens = tokenize(source)?;
        split_relative_import_dots(&mut tokens);
        let tokens = fill_gaps(source, tokens);
        let pairs = pair_brackets(&tokens);
        Ok(TokenStream {
            source,
            tokens,
            pairs,
            lines: LineIndex::new(source),
        })
    }

    /// The source reassembled from token texts; equal to the input.
    pub fn text(&self) -> String {
        self.tokens.iter().map(|token| token.text).collect()
    }
}

/// `...` between `from` and `import` is three relative-import dots, not an
/// ellipsis.
fn split_relative_import_dots(tokens: &mut Vec<Token<'_>>) {
    let mut in_from = false;
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if token.is_name("from") {
            in_from = true;
        } else if token.is_name("import") || token.kind == TokType::Newline {
            in_from = false;
        } else if in_from && token.is_op("...") {
            let dots = (0..3).map(|n| Token {
                kind: TokType::Op,
                text: &token.text[n..n + 1],
                start: token.start + n,
                end: token.start + n + 1,
            });
            tokens.splice(i..i + 1, dots);
            i += 2;
        }
        i += 1;
    }
}

fn fill_gaps<'a>(source: &'a str, tokens: Vec<Token<'a>>) -> Vec<Token<'a>> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    let mut cursor = 0;
    for token in tokens {
        if token.start > cursor {
            out.push(Token {
                kind: TokType::Whitespace,
                text: &source[cursor..token.start],
                start: cursor,
                end: token.start,
            });
        }
        cursor = cursor.max(token.end);
        out.push(token);
    }
    out
}

/// Unmatched brackets are left out of the map.
fn pair_brackets(tokens: &[Token<'_>]) -> HashMap<usize, usize> {
    let mut pairs = HashMap::new();
    let mut stack = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        if token.kind != TokType::Op {
            continue;
        }
        match token.text {
            "(" | "[" | "{" => stack.push(index),
            ")" | "]" | "}" => {
                if let Some(open) = stack.pop() {
                    pairs.insert(open, index);
                }
            }
            _ => {}
        }
    }
    pairs
}

/// Byte offset to line/column conversion.
///
/// Columns count characters. Lines that contain non-ASCII text carry a
/// precomputed byte-to-character map; ASCII lines (and wholly ASCII files)
/// convert by subtraction.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    char_columns: Option<Vec<Option<Vec<usize>>>>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = source.as_bytes();
        for i in memchr::memchr2_iter(b'\n', b'\r', bytes) {
            // `\r\n` ends one line, at the `\n`.
            if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                continue;
            }
            line_starts.push(i + 1);
        }
        let char_columns = (!source.is_ascii()).then(|| {
            line_starts
                .iter()
                .enumerate()
                .map(|(line, &start)| {
                    let end = line_starts.get(line + 1).copied().unwrap_or(source.len());
                    let text = &source[start..end];
                    (!text.is_ascii()).then(|| {
                        let mut columns = vec![0; text.len() + 1];
                        let mut column = 0;
                        for (offset, c) in text.char_indices() {
                            for slot in &mut columns[offset..offset + c.len_utf8()] {
                                *slot = column;
                            }
                            column += 1;
                        }
                        columns[text.len()] = column;
                        columns
                    })
                })
                .collect()
        });
        LineIndex {
            line_starts,
            char_columns,
        }
    }

    /// 1-based line and column of a byte offset.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let within = offset - self.line_starts[line];
        let column = self
            .char_columns
            .as_ref()
            .and_then(|lines| lines[line].as_ref())
            .and_then(|columns| columns.get(within).copied())
            .unwrap_or(within);
        (line + 1, column + 1)
    }

    /// Byte offset where the 1-based `line` begins.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line.checked_sub(1)?).copied()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
