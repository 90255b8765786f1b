// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! `case` patterns.

use std::rc::Rc;

use crate::parser::{empty_expression, hoist, is_keyword, PResult, Parser};
use crate::tokenizer::TokType;
use crate::tree::*;

fn pattern(prefix: Space, kind: PatternKind, children: Vec<RightPadded<Expression>>) -> Rc<MatchPattern> {
    Rc::new(MatchPattern::new(
        prefix,
        Markers::EMPTY,
        kind,
        Container::build(Space::EMPTY, children),
    ))
}

fn single(prefix: Space, kind: PatternKind, child: Expression) -> Rc<MatchPattern> {
    pattern(prefix, kind, vec![RightPadded::new(child)])
}

/// A pattern whose prefix moves to the compound pattern built around it.
fn hoisted(child: Rc<MatchPattern>) -> (Space, Expression) {
    hoist(Expression::MatchPattern(child))
}

impl<'a> Parser<'a> {
    /// The pattern of a `case`, including an unbracketed sequence.
    pub(super) fn patterns(&mut self) -> PResult<Rc<MatchPattern>> {
        let first = self.as_pattern()?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut pending = Some(first);
        let mut children = self.undelimited(
            |p| match pending.take() {
                Some(first) => Ok(Expression::MatchPattern(first)),
                None => p.pattern_expression(),
            },
            |p| !p.at_op(":") && !p.at_keyword("if"),
        )?;
        let (prefix, first) = hoist(children[0].element.clone());
        children[0].element = first;
        Ok(pattern(prefix, PatternKind::Sequence, children))
    }

    fn pattern_expression(&mut self) -> PResult<Expression> {
        Ok(Expression::MatchPattern(self.as_pattern()?))
    }

    fn as_pattern(&mut self) -> PResult<Rc<MatchPattern>> {
        let inner = self.or_pattern()?;
        if !self.at_keyword("as") {
            return Ok(inner);
        }
        let before = self.expect_keyword("as")?;
        let name = self.name()?;
        let (prefix, inner) = hoisted(inner);
        Ok(pattern(
            prefix,
            PatternKind::As,
            vec![
                RightPadded::build(inner, before),
                RightPadded::new(Expression::Identifier(name)),
            ],
        ))
    }

    fn or_pattern(&mut self) -> PResult<Rc<MatchPattern>> {
        let first = self.closed_pattern()?;
        if !self.at_op("|") {
            return Ok(first);
        }
        let (prefix, first) = hoisted(first);
        let mut children = Vec::new();
        let mut pending = first;
        while self.at_op("|") {
            let before = self.expect_op("|")?;
            children.push(RightPadded::build(pending, before));
            pending = Expression::MatchPattern(self.closed_pattern()?);
        }
        children.push(RightPadded::new(pending));
        Ok(pattern(prefix, PatternKind::Or, children))
    }

    fn closed_pattern(&mut self) -> PResult<Rc<MatchPattern>> {
        let token = self.peek();
        match (token.kind, token.text) {
            (TokType::Op, "*") => {
                let prefix = self.expect_op("*")?;
                let name = self.name()?;
                Ok(single(prefix, PatternKind::Star, Expression::Identifier(name)))
            }
            (TokType::Op, "(") => self.group_or_tuple_pattern(),
            (TokType::Op, "[") => {
                let (prefix, open) = self.open("[")?;
                let children =
                    self.delimited("]", |p| p.pattern_expression(), empty_expression)?;
                self.close(open, "]")?;
                Ok(pattern(prefix, PatternKind::SequenceList, children))
            }
            (TokType::Op, "{") => {
                let (prefix, open) = self.open("{")?;
                let children = self.delimited("}", |p| p.mapping_item(), empty_expression)?;
                self.close(open, "}")?;
                Ok(pattern(prefix, PatternKind::Mapping, children))
            }
            (TokType::Op, "-") | (TokType::Number, _) => {
                let value = self.sum()?;
                let (prefix, value) = hoist(value);
                Ok(single(prefix, PatternKind::Literal, value))
            }
            (TokType::String | TokType::FStringStart, _) => {
                let value = self.strings()?;
                let (prefix, value) = hoist(value);
                Ok(single(prefix, PatternKind::Literal, value))
            }
            (TokType::Name, "None" | "True" | "False") => {
                let value = self.atom()?;
                let (prefix, value) = hoist(value);
                Ok(single(prefix, PatternKind::Literal, value))
            }
            (TokType::Name, name) if !is_keyword(name) => self.name_pattern(),
            _ => self.unexpected("a pattern"),
        }
    }

    /// A capture, the `_` wildcard, a dotted value or a class pattern.
    fn name_pattern(&mut self) -> PResult<Rc<MatchPattern>> {
        let prefix = self.space();
        let name = self.dotted_name(Space::EMPTY)?;
        if self.at_op("(") {
            let (before, open) = self.open("(")?;
            let arguments = self.delimited(")", |p| p.class_argument(), empty_expression)?;
            self.close(open, ")")?;
            let mut children = vec![RightPadded::build(name, before)];
            children.extend(arguments);
            return Ok(pattern(prefix, PatternKind::ClassName, children));
        }
        let kind = match &name {
            Expression::Identifier(identifier) if identifier.simple_name == "_" => {
                PatternKind::Wildcard
            }
            Expression::Identifier(_) => PatternKind::Capture,
            _ => PatternKind::Value,
        };
        Ok(single(prefix, kind, name))
    }

    fn class_argument(&mut self) -> PResult<Expression> {
        let token = self.peek();
        if token.kind == TokType::Name && !is_keyword(token.text) && self.peek_nth(1).is_op("=") {
            let prefix = self.space();
            let name = self.name()?;
            let before = self.expect_op("=")?;
            let value = self.as_pattern()?;
            return Ok(Expression::MatchPattern(pattern(
                prefix,
                PatternKind::Keyword,
                vec![
                    RightPadded::build(Expression::Identifier(name), before),
                    RightPadded::new(Expression::MatchPattern(value)),
                ],
            )));
        }
        self.pattern_expression()
    }

    fn mapping_item(&mut self) -> PResult<Expression> {
        if self.at_op("**") {
            let prefix = self.expect_op("**")?;
            let name = self.name()?;
            return Ok(Expression::MatchPattern(single(
                prefix,
                PatternKind::DoubleStar,
                Expression::Identifier(name),
            )));
        }
        let key = self.closed_pattern()?;
        let before = self.expect_op(":")?;
        let value = self.as_pattern()?;
        let (prefix, key) = hoisted(key);
        Ok(Expression::MatchPattern(pattern(
            prefix,
            PatternKind::KeyValue,
            vec![
                RightPadded::build(key, before),
                RightPadded::new(Expression::MatchPattern(value)),
            ],
        )))
    }

    fn group_or_tuple_pattern(&mut self) -> PResult<Rc<MatchPattern>> {
        let (prefix, open) = self.open("(")?;
        if self.at_op(")") {
            let inner = self.space();
            self.close(open, ")")?;
            return Ok(single(
                prefix,
                PatternKind::SequenceTuple,
                empty_expression(inner),
            ));
        }
        let first = self.pattern_expression()?;
        if !self.at_op(",") {
            let after = self.close(open, ")")?;
            return Ok(pattern(
                prefix,
                PatternKind::Group,
                vec![RightPadded::build(first, after)],
            ));
        }
        let children =
            self.finish_delimited(Vec::new(), first, ")", |p| p.pattern_expression())?;
        self.close(open, ")")?;
        Ok(pattern(prefix, PatternKind::SequenceTuple, children))
    }
}
