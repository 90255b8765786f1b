// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! String literals, implicit concatenation and f-strings.

use std::rc::Rc;

use crate::parser::expressions::{literal, py_binary};
use crate::parser::{PResult, Parser};
use crate::tokenizer::TokType;
use crate::tree::*;

fn string_kind(text: &str) -> LiteralKind {
    let prefix = text
        .find(['\'', '"'])
        .map_or("", |quote| &text[..quote]);
    if prefix.contains(['b', 'B']) {
        LiteralKind::Bytes
    } else {
        LiteralKind::String
    }
}

impl<'a> Parser<'a> {
    /// Adjacent string literals. Two or more become a left-nested
    /// concatenation; they never span a logical line break.
    pub(super) fn strings(&mut self) -> PResult<Expression> {
        let mut expression = self.string_piece()?;
        while matches!(
            self.peek().kind,
            TokType::String | TokType::FStringStart
        ) {
            let before = self.space();
            let next = self.string_piece()?;
            expression = py_binary(
                expression,
                before,
                PyBinaryOperator::StringConcatenation,
                None,
                next,
            );
        }
        Ok(expression)
    }

    fn string_piece(&mut self) -> PResult<Expression> {
        let prefix = self.space();
        let token = self.bump();
        match token.kind {
            TokType::String => Ok(literal(prefix, token.text, string_kind(token.text))),
            TokType::FStringStart => self.fstring(prefix, token.text),
            _ => self.unexpected("a string"),
        }
    }

    fn fstring(&mut self, prefix: Space, delimiter: &str) -> PResult<Expression> {
        let mut parts = Vec::new();
        loop {
            let token = self.raw();
            match token.kind {
                TokType::FStringMiddle => {
                    self.bump();
                    parts.push(literal(Space::EMPTY, token.text, LiteralKind::String));
                }
                TokType::FStringEnd => {
                    self.bump();
                    break;
                }
                TokType::Op if token.text == "{" => parts.push(self.replacement_field()?),
                _ => return self.unexpected("the rest of the f-string"),
            }
        }
        Ok(Expression::FormattedString(Rc::new(FormattedString::new(
            prefix,
            Markers::EMPTY,
            delimiter.to_string(),
            parts,
        ))))
    }

    /// `{expression=!r:spec}` inside an f-string.
    fn replacement_field(&mut self) -> PResult<Expression> {
        let open = self.pos;
        self.bump();
        let expression = if self.at_keyword("yield") {
            self.yield_expression()?
        } else {
            self.star_expressions()?
        };
        let after = self.space();
        let debug = if self.raw().is_op("=") {
            self.bump();
            Some(RightPadded::build(true, self.space()))
        } else {
            None
        };
        let conversion = if self.raw().is_op("!") {
            self.bump();
            let letter = self.raw();
            let Some(conversion) = Conversion::from_letter(letter.text) else {
                return self.unexpected("'s', 'r' or 'a'");
            };
            self.bump();
            Some(conversion)
        } else {
            None
        };
        let format = if self.raw().is_op(":") {
            self.bump();
            Some(self.format_spec()?)
        } else {
            None
        };
        self.close(open, "}")?;
        Ok(Expression::FormattedStringValue(Rc::new(
            FormattedStringValue::new(
                Space::EMPTY,
                Markers::EMPTY,
                RightPadded::build(expression, after),
                debug,
                conversion,
                format,
            ),
        )))
    }

    /// The format spec after `:`, itself possibly holding nested fields.
    fn format_spec(&mut self) -> PResult<Expression> {
        let mut parts = Vec::new();
        loop {
            let token = self.raw();
            match token.kind {
                TokType::FStringMiddle => {
                    self.bump();
                    parts.push(literal(Space::EMPTY, token.text, LiteralKind::String));
                }
                TokType::Op if token.text == "{" => parts.push(self.replacement_field()?),
                TokType::Op if token.text == "}" => break,
                _ => return self.unexpected("the rest of the format spec"),
            }
        }
        Ok(Expression::FormattedString(Rc::new(FormattedString::new(
            Space::EMPTY,
            Markers::EMPTY,
            String::new(),
            parts,
        ))))
    }
}
