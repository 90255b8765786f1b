// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::tokenizer::adapter::{LineIndex, TokenStream};
use std::borrow::Cow;

use crate::tokenizer::core::{normalize_identifier, tokenize, TokError, TokType};

fn tokenize_all(text: &str) -> Result<Vec<(TokType, &str)>, TokError> {
    let mut result: Vec<_> = tokenize(text)?
        .into_iter()
        .map(|token| (token.kind, token.text))
        .collect();
    // Remove the EndMarker, since it's on every non-error token stream.
    assert_eq!(result.pop().expect("EndMarker").0, TokType::EndMarker);
    // Also remove the zero-width newline that ends the last line.
    if let Some((TokType::Newline, "")) = result.last() {
        result.pop();
    }
    Ok(result)
}

#[test]
fn test_identifier() {
    assert_eq!(
        tokenize_all("test input"),
        Ok(vec![(TokType::Name, "test"), (TokType::Name, "input")])
    );

    assert_eq!(
        tokenize_all("\u{0100}\u{0101}\u{0102}unicode"),
        Ok(vec![(TokType::Name, "\u{0100}\u{0101}\u{0102}unicode")])
    );
}

#[test]
fn test_identifier_spelling_is_kept_and_normalized_on_demand() {
    assert_eq!(
        tokenize_all("\u{fb01}le"),
        Ok(vec![(TokType::Name, "\u{fb01}le")])
    );
    assert_eq!(normalize_identifier("\u{fb01}le"), "file");
    assert!(matches!(normalize_identifier("file"), Cow::Borrowed("file")));
}

#[test]
fn test_indentation() {
    assert_eq!(
        tokenize_all("if x:\n    y\nz\n"),
        Ok(vec![
            (TokType::Name, "if"),
            (TokType::Name, "x"),
            (TokType::Op, ":"),
            (TokType::Newline, ""),
            (TokType::Indent, ""),
            (TokType::Name, "y"),
            (TokType::Newline, ""),
            (TokType::Dedent, ""),
            (TokType::Name, "z"),
        ])
    );
}

#[test]
fn test_comments_and_blank_lines_are_not_tokens() {
    assert_eq!(
        tokenize_all("a  # c\n\n  # indented comment\nb"),
        Ok(vec![
            (TokType::Name, "a"),
            (TokType::Newline, ""),
            (TokType::Name, "b"),
        ])
    );
}

#[test]
fn test_brackets_join_lines() {
    assert_eq!(
        tokenize_all("(a,\n b)"),
        Ok(vec![
            (TokType::Op, "("),
            (TokType::Name, "a"),
            (TokType::Op, ","),
            (TokType::Name, "b"),
            (TokType::Op, ")"),
        ])
    );
}

#[test]
fn test_numbers() {
    assert_eq!(
        tokenize_all("0x_ff 1_000 1.5e-3 2j .5"),
        Ok(vec![
            (TokType::Number, "0x_ff"),
            (TokType::Number, "1_000"),
            (TokType::Number, "1.5e-3"),
            (TokType::Number, "2j"),
            (TokType::Number, ".5"),
        ])
    );
}

#[test]
fn test_fstring_with_nested_spec() {
    assert_eq!(
        tokenize_all("f\"a{b!r:>{w}}c\""),
        Ok(vec![
            (TokType::FStringStart, "f\""),
            (TokType::FStringMiddle, "a"),
            (TokType::Op, "{"),
            (TokType::Name, "b"),
            (TokType::Op, "!"),
            (TokType::Name, "r"),
            (TokType::Op, ":"),
            (TokType::FStringMiddle, ">"),
            (TokType::Op, "{"),
            (TokType::Name, "w"),
            (TokType::Op, "}"),
            (TokType::Op, "}"),
            (TokType::FStringMiddle, "c"),
            (TokType::FStringEnd, "\""),
        ])
    );
}

#[test]
fn test_fstring_escaped_braces_and_reused_quotes() {
    assert_eq!(
        tokenize_all("f\"{{x}}\""),
        Ok(vec![
            (TokType::FStringStart, "f\""),
            (TokType::FStringMiddle, "{{x}}"),
            (TokType::FStringEnd, "\""),
        ])
    );

    assert_eq!(
        tokenize_all("f\"{d[\"k\"]}\""),
        Ok(vec![
            (TokType::FStringStart, "f\""),
            (TokType::Op, "{"),
            (TokType::Name, "d"),
            (TokType::Op, "["),
            (TokType::String, "\"k\""),
            (TokType::Op, "]"),
            (TokType::Op, "}"),
            (TokType::FStringEnd, "\""),
        ])
    );
}

#[test]
fn test_errors() {
    assert_eq!(
        tokenize_all("\"abc"),
        Err(TokError::UnterminatedString { offset: 0 })
    );
    assert_eq!(
        tokenize_all("(a"),
        Err(TokError::UnmatchedBracket {
            bracket: '(',
            offset: 0
        })
    );
    assert_eq!(
        tokenize_all("if x:\n    a\n  b\n"),
        Err(TokError::Dedent { offset: 14 })
    );
    assert_eq!(
        tokenize_all("a $ b"),
        Err(TokError::BadCharacter {
            character: '$',
            offset: 2
        })
    );
}

#[test]
fn test_adapted_stream_covers_the_source() {
    let source = "import os  # why\n\nif x:\n    y = f'{a!r}' \\\n        + 1\n# trailing\n";
    let stream = TokenStream::new(source).unwrap();
    assert_eq!(stream.text(), source);
}

#[test]
fn test_comment_lines_sit_between_newline_and_dedent() {
    let stream = TokenStream::new("if x:\n    a\n# c\nb\n").unwrap();
    let kinds: Vec<_> = stream
        .tokens
        .iter()
        .map(|token| (token.kind, token.text))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (TokType::Name, "if"),
            (TokType::Whitespace, " "),
            (TokType::Name, "x"),
            (TokType::Op, ":"),
            (TokType::Newline, ""),
            (TokType::Whitespace, "\n    "),
            (TokType::Indent, ""),
            (TokType::Name, "a"),
            (TokType::Newline, ""),
            (TokType::Whitespace, "\n# c\n"),
            (TokType::Dedent, ""),
            (TokType::Name, "b"),
            (TokType::Newline, ""),
            (TokType::Whitespace, "\n"),
            (TokType::EndMarker, ""),
        ]
    );
}

#[test]
fn test_relative_import_dots_are_split() {
    let stream = TokenStream::new("from ... import x").unwrap();
    let ops: Vec<_> = stream
        .tokens
        .iter()
        .filter(|token| token.kind == TokType::Op)
        .map(|token| token.text)
        .collect();
    assert_eq!(ops, vec![".", ".", "."]);
    assert_eq!(stream.text(), "from ... import x");

    let stream = TokenStream::new("x = ...").unwrap();
    assert!(stream.tokens.iter().any(|token| token.is_op("...")));
}

#[test]
fn test_bracket_pairs() {
    let stream = TokenStream::new("f(a[1], {b})").unwrap();
    assert_eq!(stream.pairs.get(&1), Some(&11));
    assert_eq!(stream.pairs.get(&3), Some(&5));
    assert_eq!(stream.pairs.get(&8), Some(&10));
    assert_eq!(stream.pairs.len(), 3);
}

#[test]
fn test_line_index_counts_characters() {
    let index = LineIndex::new("ab\nc\u{e9}\nx");
    assert_eq!(index.position(0), (1, 1));
    assert_eq!(index.position(6), (2, 3));
    assert_eq!(index.position(7), (3, 1));
    assert_eq!(index.line_start(2), Some(3));
    assert_eq!(index.line_count(), 3);

    let ascii = LineIndex::new("a\r\nbc");
    assert_eq!(ascii.position(4), (2, 2));
}
