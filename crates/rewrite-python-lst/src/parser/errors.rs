// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::tokenizer::{LineIndex, TokError};

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("tokenizer error: {0}")]
    TokenizerError(#[from] TokError),
    #[error("{message} at line {line}, column {column}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
        /// Byte offset of the offending token.
        offset: usize,
    },
}

impl ParserError {
    pub fn offset(&self) -> usize {
        match self {
            ParserError::TokenizerError(err) => err.offset(),
            ParserError::Syntax { offset, .. } => *offset,
        }
    }

    /// Name reported as the exception type of a failed parse, as Python
    /// itself would raise it.
    pub fn exception_type(&self) -> &'static str {
        match self {
            ParserError::TokenizerError(TokError::Dedent { .. }) => "IndentationError",
            ParserError::TokenizerError(_) | ParserError::Syntax { .. } => "SyntaxError",
        }
    }
}

/// Renders a parse error with the offending line and one line of context on
/// each side.
///
/// # Example
///
/// ```
/// use rewrite_python_lst::{parse_module, prettify_error};
///
/// let source = "def";
/// if let Err(e) = parse_module("example.py", source) {
///     println!("{}", prettify_error(&e, source, "example.py"));
/// }
/// ```
pub fn prettify_error(err: &ParserError, source: &str, label: &str) -> String {
    use annotate_snippets::{Level, Renderer, Snippet};

    let lines = LineIndex::new(source);
    let offset = err.offset().min(source.len());
    let (line, _) = lines.position(offset);
    let context = 1;
    let first_line = line.saturating_sub(context).max(1);
    let start_offset = lines.line_start(first_line).unwrap_or(0);
    let end_offset = lines
        .line_start(line + context + 1)
        .unwrap_or(source.len());
    let snippet = &source[start_offset..end_offset];
    let start = offset - start_offset;
    let end = snippet[start..]
        .chars()
        .next()
        .map_or(start, |c| start + c.len_utf8());
    let message = err.to_string();
    let rendered = Renderer::plain()
        .render(
            Level::Error.title(&message).snippet(
                Snippet::source(snippet)
                    .line_start(first_line)
                    .origin(label)
                    .fold(false)
                    .annotation(Level::Error.span(start..end).label("here")),
            ),
        )
        .to_string();
    rendered
}
