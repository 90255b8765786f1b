// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Expressions, from `lambda` down to atoms.

use std::rc::Rc;

use crate::parser::{empty_expression, hoist, is_keyword, trailing_comma, PResult, Parser};
use crate::tokenizer::TokType;
use crate::tree::*;

fn omit_parentheses() -> Markers {
    Markers::build(vec![Marker::omit_parentheses()])
}

/// The operator node for a binary operator symbol.
fn binary(left: Expression, before: Space, symbol: &str, right: Expression) -> Expression {
    if let Some(operator) = BinaryOperator::from_symbol(symbol) {
        let (prefix, left) = hoist(left);
        return Expression::Binary(Rc::new(Binary::new(
            prefix,
            Markers::EMPTY,
            left,
            LeftPadded::build(before, operator),
            right,
        )));
    }
    let operator = match symbol {
        "//" => PyBinaryOperator::FloorDivision,
        "@" => PyBinaryOperator::MatrixMultiplication,
        "in" => PyBinaryOperator::In,
        "is" => PyBinaryOperator::Is,
        _ => PyBinaryOperator::Power,
    };
    py_binary(left, before, operator, None, right)
}

pub(super) fn py_binary(
    left: Expression,
    before: Space,
    operator: PyBinaryOperator,
    negation: Option<Space>,
    right: Expression,
) -> Expression {
    let (prefix, left) = hoist(left);
    Expression::PyBinary(Rc::new(PyBinary::new(
        prefix,
        Markers::EMPTY,
        left,
        LeftPadded::build(before, operator),
        negation,
        right,
    )))
}

/// A tuple written without parentheses, owning its first element's prefix.
fn bare_tuple(mut elements: Vec<RightPadded<Expression>>) -> Expression {
    let (prefix, first) = hoist(elements[0].element.clone());
    elements[0].element = first;
    Expression::CollectionLiteral(Rc::new(CollectionLiteral::new(
        prefix,
        omit_parentheses(),
        CollectionKind::Tuple,
        Container::build(Space::EMPTY, elements),
    )))
}

impl<'a> Parser<'a> {
    /// Whether the next token can begin an expression.
    pub(super) fn starts_expression(&self) -> bool {
        let token = self.peek();
        match token.kind {
            TokType::Name => {
                !is_keyword(token.text)
                    || matches!(
                        token.text,
                        "None" | "True" | "False" | "not" | "lambda" | "await"
                    )
            }
            TokType::Number | TokType::String | TokType::FStringStart => true,
            TokType::Op => matches!(
                token.text,
                "(" | "[" | "{" | "-" | "+" | "~" | "*" | "..."
            ),
            _ => false,
        }
    }

    /// A comma-separated list that becomes a parenthesis-free tuple when a
    /// comma is present.
    fn tuple_of(
        &mut self,
        element: fn(&mut Self) -> PResult<Expression>,
    ) -> PResult<Expression> {
        self.tuple_while(element, Self::starts_expression)
    }

    /// Like [`tuple_of`](Self::tuple_of), with `continues` deciding whether
    /// a comma is followed by another element or ends the list.
    fn tuple_while(
        &mut self,
        element: fn(&mut Self) -> PResult<Expression>,
        continues: fn(&Self) -> bool,
    ) -> PResult<Expression> {
        let first = element(self)?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut pending = Some(first);
        let rest = self.undelimited(
            |p| match pending.take() {
                Some(first) => Ok(first),
                None => element(p),
            },
            continues,
        )?;
        Ok(bare_tuple(rest))
    }

    pub(super) fn star_expressions(&mut self) -> PResult<Expression> {
        self.tuple_of(Self::star_expression)
    }

    pub(super) fn star_named_expressions(&mut self) -> PResult<Expression> {
        self.tuple_of(Self::star_named_expression)
    }

    /// Assignment targets of `for` and comprehension clauses.
    pub(super) fn target_list(&mut self) -> PResult<Expression> {
        self.tuple_of(Self::star_target)
    }

    pub(super) fn star_target(&mut self) -> PResult<Expression> {
        if self.at_op("*") {
            let prefix = self.expect_op("*")?;
            let expression = self.bitwise_or()?;
            return Ok(Expression::Star(Rc::new(Star::new(
                prefix,
                Markers::EMPTY,
                StarKind::List,
                expression,
            ))));
        }
        self.bitwise_or()
    }

    pub(super) fn star_expression(&mut self) -> PResult<Expression> {
        if self.at_op("*") {
            return self.star_target();
        }
        self.expression()
    }

    pub(super) fn star_named_expression(&mut self) -> PResult<Expression> {
        if self.at_op("*") {
            return self.star_target();
        }
        self.named_expression()
    }

    /// The right side of `=`: a `yield` or an expression list.
    pub(super) fn assignment_value(&mut self) -> PResult<Expression> {
        if self.at_keyword("yield") {
            return self.yield_expression();
        }
        self.star_expressions()
    }

    pub(super) fn yield_expression(&mut self) -> PResult<Expression> {
        let prefix = self.expect_keyword("yield")?;
        if self.at_keyword("from") {
            let from = self.expect_keyword("from")?;
            let expression = self.expression()?;
            return Ok(Expression::YieldFrom(Rc::new(YieldFrom::new(
                prefix,
                Markers::EMPTY,
                from,
                expression,
            ))));
        }
        let value = if self.starts_expression() {
            Some(self.star_expressions()?)
        } else {
            None
        };
        Ok(Expression::Yield(Rc::new(Yield::new(
            prefix,
            Markers::EMPTY,
            value,
        ))))
    }

    /// An expression or a walrus `name := value`.
    pub(super) fn named_expression(&mut self) -> PResult<Expression> {
        let token = self.peek();
        if token.kind == TokType::Name && !is_keyword(token.text) && self.peek_nth(1).is_op(":=")
        {
            let name = Expression::Identifier(self.name()?);
            let before = self.expect_op(":=")?;
            let value = self.expression()?;
            let (prefix, name) = hoist(name);
            return Ok(Expression::Assignment(Rc::new(Assignment::new(
                prefix,
                Markers::EMPTY,
                name,
                LeftPadded::build(before, value),
            ))));
        }
        self.expression()
    }

    pub(super) fn expression(&mut self) -> PResult<Expression> {
        if self.at_keyword("lambda") {
            return self.lambda();
        }
        let body = self.disjunction()?;
        if !self.at_keyword("if") {
            return Ok(body);
        }
        let before_if = self.expect_keyword("if")?;
        let condition = self.disjunction()?;
        let before_else = self.expect_keyword("else")?;
        let otherwise = self.expression()?;
        let (prefix, body) = hoist(body);
        Ok(Expression::Ternary(Rc::new(Ternary::new(
            prefix,
            Markers::EMPTY,
            body,
            LeftPadded::build(before_if, condition),
            LeftPadded::build(before_else, otherwise),
        ))))
    }

    fn lambda(&mut self) -> PResult<Expression> {
        let prefix = self.expect_keyword("lambda")?;
        let mut parameters = Vec::new();
        if !self.at_op(":") {
            loop {
                let parameter = self.parameter(false)?;
                if !self.at_op(",") {
                    parameters.push(RightPadded::new(parameter));
                    break;
                }
                let after = self.expect_op(",")?;
                if self.at_op(":") {
                    parameters.push(RightPadded {
                        element: parameter,
                        after,
                        markers: trailing_comma(Space::EMPTY),
                    });
                    break;
                }
                parameters.push(RightPadded::build(parameter, after));
            }
        }
        let parameters = Rc::new(LambdaParameters::new(
            Space::EMPTY,
            Markers::EMPTY,
            parameters,
        ));
        let arrow = self.expect_op(":")?;
        let body = self.expression()?;
        Ok(Expression::Lambda(Rc::new(Lambda::new(
            prefix,
            Markers::EMPTY,
            parameters,
            arrow,
            body,
        ))))
    }

    pub(super) fn disjunction(&mut self) -> PResult<Expression> {
        let mut left = self.conjunction()?;
        while self.at_keyword("or") {
            let before = self.expect_keyword("or")?;
            let right = self.conjunction()?;
            left = binary(left, before, "or", right);
        }
        Ok(left)
    }

    fn conjunction(&mut self) -> PResult<Expression> {
        let mut left = self.inversion()?;
        while self.at_keyword("and") {
            let before = self.expect_keyword("and")?;
            let right = self.inversion()?;
            left = binary(left, before, "and", right);
        }
        Ok(left)
    }

    fn inversion(&mut self) -> PResult<Expression> {
        if !self.at_keyword("not") {
            return self.comparison();
        }
        let prefix = self.expect_keyword("not")?;
        let operand = self.inversion()?;
        Ok(Expression::Unary(Rc::new(Unary::new(
            prefix,
            Markers::EMPTY,
            LeftPadded::build(Space::EMPTY, UnaryOperator::Not),
            operand,
        ))))
    }

    fn comparison(&mut self) -> PResult<Expression> {
        let mut left = self.bitwise_or()?;
        loop {
            let token = self.peek();
            let next = self.peek_nth(1);
            left = match (token.kind, token.text) {
                (TokType::Op, "==" | "!=" | "<" | ">" | "<=" | ">=") => {
                    let before = self.expect_op(token.text)?;
                    let right = self.bitwise_or()?;
                    binary(left, before, token.text, right)
                }
                (TokType::Name, "in") => {
                    let before = self.expect_keyword("in")?;
                    let right = self.bitwise_or()?;
                    binary(left, before, "in", right)
                }
                (TokType::Name, "not") if next.is_name("in") => {
                    let before = self.expect_keyword("not")?;
                    let negation = self.expect_keyword("in")?;
                    let right = self.bitwise_or()?;
                    py_binary(left, before, PyBinaryOperator::NotIn, Some(negation), right)
                }
                (TokType::Name, "is") if next.is_name("not") => {
                    let before = self.expect_keyword("is")?;
                    let negation = self.expect_keyword("not")?;
                    let right = self.bitwise_or()?;
                    py_binary(left, before, PyBinaryOperator::IsNot, Some(negation), right)
                }
                (TokType::Name, "is") => {
                    let before = self.expect_keyword("is")?;
                    let right = self.bitwise_or()?;
                    binary(left, before, "is", right)
                }
                _ => return Ok(left),
            };
        }
    }

    /// One left-associative level of binary operators.
    fn binary_level(
        &mut self,
        operators: &[&str],
        next: fn(&mut Self) -> PResult<Expression>,
    ) -> PResult<Expression> {
        let mut left = next(self)?;
        loop {
            let token = self.peek();
            if token.kind != TokType::Op || !operators.contains(&token.text) {
                return Ok(left);
            }
            let before = self.expect_op(token.text)?;
            let right = next(self)?;
            left = binary(left, before, token.text, right);
        }
    }

    pub(super) fn bitwise_or(&mut self) -> PResult<Expression> {
        self.binary_level(&["|"], Self::bitwise_xor)
    }

    fn bitwise_xor(&mut self) -> PResult<Expression> {
        self.binary_level(&["^"], Self::bitwise_and)
    }

    fn bitwise_and(&mut self) -> PResult<Expression> {
        self.binary_level(&["&"], Self::shift)
    }

    fn shift(&mut self) -> PResult<Expression> {
        self.binary_level(&["<<", ">>"], Self::sum)
    }

    pub(super) fn sum(&mut self) -> PResult<Expression> {
        self.binary_level(&["+", "-"], Self::term)
    }

    fn term(&mut self) -> PResult<Expression> {
        self.binary_level(&["*", "/", "//", "%", "@"], Self::factor)
    }

    fn factor(&mut self) -> PResult<Expression> {
        let token = self.peek();
        let operator = match (token.kind, token.text) {
            (TokType::Op, "-") => UnaryOperator::Negative,
            (TokType::Op, "+") => UnaryOperator::Positive,
            (TokType::Op, "~") => UnaryOperator::Complement,
            _ => return self.power(),
        };
        let prefix = self.expect_op(token.text)?;
        let operand = self.factor()?;
        Ok(Expression::Unary(Rc::new(Unary::new(
            prefix,
            Markers::EMPTY,
            LeftPadded::build(Space::EMPTY, operator),
            operand,
        ))))
    }

    fn power(&mut self) -> PResult<Expression> {
        let base = self.await_primary()?;
        if !self.at_op("**") {
            return Ok(base);
        }
        let before = self.expect_op("**")?;
        let exponent = self.factor()?;
        Ok(py_binary(
            base,
            before,
            PyBinaryOperator::Power,
            None,
            exponent,
        ))
    }

    fn await_primary(&mut self) -> PResult<Expression> {
        if !self.at_keyword("await") {
            return self.primary();
        }
        let prefix = self.expect_keyword("await")?;
        let expression = self.primary()?;
        Ok(Expression::Await(Rc::new(Await::new(
            prefix,
            Markers::EMPTY,
            expression,
        ))))
    }

    /// An atom followed by attribute accesses, calls and subscripts.
    pub(super) fn primary(&mut self) -> PResult<Expression> {
        let mut expression = self.atom()?;
        loop {
            if self.at_op(".") {
                let before = self.expect_op(".")?;
                let name = self.name()?;
                let (prefix, target) = hoist(expression);
                expression = Expression::FieldAccess(Rc::new(FieldAccess::new(
                    prefix,
                    Markers::EMPTY,
                    target,
                    LeftPadded::build(before, name),
                )));
            } else if self.at_op("(") {
                let arguments = self.container("(", ")", |p| p.argument(), empty_expression)?;
                expression = call(expression, arguments);
            } else if self.at_op("[") {
                let (before, open) = self.open("[")?;
                let index = self.slices()?;
                let after = self.close(open, "]")?;
                let dimension = Rc::new(ArrayDimension::new(
                    before,
                    Markers::EMPTY,
                    RightPadded::build(index, after),
                ));
                let (prefix, indexed) = hoist(expression);
                expression = Expression::ArrayAccess(Rc::new(ArrayAccess::new(
                    prefix,
                    Markers::EMPTY,
                    indexed,
                    dimension,
                )));
            } else {
                return Ok(expression);
            }
        }
    }

    /// A call argument: positional, `name=value`, `*args`, `**kwargs`, or a
    /// bare generator expression.
    pub(super) fn argument(&mut self) -> PResult<Expression> {
        if self.at_op("**") {
            let prefix = self.expect_op("**")?;
            let expression = self.expression()?;
            return Ok(Expression::Star(Rc::new(Star::new(
                prefix,
                Markers::EMPTY,
                StarKind::Dict,
                expression,
            ))));
        }
        if self.at_op("*") {
            let prefix = self.expect_op("*")?;
            let expression = self.expression()?;
            return Ok(Expression::Star(Rc::new(Star::new(
                prefix,
                Markers::EMPTY,
                StarKind::List,
                expression,
            ))));
        }
        let token = self.peek();
        if token.kind == TokType::Name && !is_keyword(token.text) && self.peek_nth(1).is_op("=") {
            let prefix = self.space();
            let name = self.name()?;
            let before = self.expect_op("=")?;
            let value = self.expression()?;
            return Ok(Expression::NamedArgument(Rc::new(NamedArgument::new(
                prefix,
                Markers::EMPTY,
                name,
                LeftPadded::build(before, value),
            ))));
        }
        let value = self.named_expression()?;
        if !self.at_comprehension() {
            return Ok(value);
        }
        let clauses = self.comprehension_clauses()?;
        let (prefix, result) = hoist(value);
        Ok(Expression::ComprehensionExpression(Rc::new(
            ComprehensionExpression::new(
                prefix,
                omit_parentheses(),
                ComprehensionKind::Generator,
                result,
                clauses,
                Space::EMPTY,
            ),
        )))
    }

    /// The inside of a subscript: one index or slice, or a tuple of them.
    fn slices(&mut self) -> PResult<Expression> {
        self.tuple_while(Self::slice, Self::starts_slice)
    }

    /// A slice may open with `:` where an expression may not.
    fn starts_slice(&self) -> bool {
        self.at_op(":") || self.starts_expression()
    }

    fn slice(&mut self) -> PResult<Expression> {
        let start = if self.at_op(":") {
            empty_expression(Space::EMPTY)
        } else {
            let start = self.star_named_expression()?;
            if !self.at_op(":") {
                return Ok(start);
            }
            start
        };
        let start_after = self.expect_op(":")?;
        let stop = if self.at_slice_bound_end() {
            empty_expression(Space::EMPTY)
        } else {
            self.expression()?
        };
        let (stop, step) = if self.at_op(":") {
            let stop_after = self.expect_op(":")?;
            let step = if self.at_slice_bound_end() {
                empty_expression(Space::EMPTY)
            } else {
                self.expression()?
            };
            (
                RightPadded::build(stop, stop_after),
                Some(RightPadded::new(step)),
            )
        } else {
            (RightPadded::new(stop), None)
        };
        let (prefix, start) = hoist(start);
        Ok(Expression::Slice(Rc::new(Slice::new(
            prefix,
            Markers::EMPTY,
            RightPadded::build(start, start_after),
            stop,
            step,
        ))))
    }

    fn at_slice_bound_end(&self) -> bool {
        self.at_op(":") || self.at_op("]") || self.at_op(",")
    }

    pub(super) fn atom(&mut self) -> PResult<Expression> {
        let token = self.peek();
        match token.kind {
            TokType::Name => {
                let kind = match token.text {
                    "None" => Some(LiteralKind::None),
                    "True" | "False" => Some(LiteralKind::Boolean),
                    _ => None,
                };
                if let Some(kind) = kind {
                    let prefix = self.expect_keyword(token.text)?;
                    return Ok(literal(prefix, token.text, kind));
                }
                if token.text == "lambda" {
                    return self.lambda();
                }
                Ok(Expression::Identifier(self.name()?))
            }
            TokType::Number => {
                let prefix = self.space();
                self.bump();
                Ok(literal(prefix, token.text, number_kind(token.text)))
            }
            TokType::String | TokType::FStringStart => self.strings(),
            TokType::Op => match token.text {
                "(" => self.parenthesized(),
                "[" => self.list_display(),
                "{" => self.brace_display(),
                "..." => {
                    let prefix = self.expect_op("...")?;
                    Ok(literal(prefix, "...", LiteralKind::Ellipsis))
                }
                _ => self.unexpected("an expression"),
            },
            _ => self.unexpected("an expression"),
        }
    }

    /// `( ... )`: a group, a tuple, a generator, or a parenthesized yield.
    fn parenthesized(&mut self) -> PResult<Expression> {
        let (prefix, open) = self.open("(")?;
        if self.at_op(")") {
            let inner = self.space();
            self.close(open, ")")?;
            return Ok(collection(
                prefix,
                CollectionKind::Tuple,
                vec![RightPadded::new(empty_expression(inner))],
            ));
        }
        if self.at_keyword("yield") {
            let value = self.yield_expression()?;
            let after = self.close(open, ")")?;
            return Ok(parentheses(prefix, value, after));
        }
        let first = self.star_named_expression()?;
        if self.at_comprehension() {
            let clauses = self.comprehension_clauses()?;
            let suffix = self.close(open, ")")?;
            return Ok(comprehension(
                prefix,
                ComprehensionKind::Generator,
                first,
                clauses,
                suffix,
            ));
        }
        if !self.at_op(",") {
            let after = self.close(open, ")")?;
            return Ok(parentheses(prefix, first, after));
        }
        let elements =
            self.finish_delimited(Vec::new(), first, ")", Self::star_named_expression)?;
        self.close(open, ")")?;
        Ok(collection(prefix, CollectionKind::Tuple, elements))
    }

    fn list_display(&mut self) -> PResult<Expression> {
        let (prefix, open) = self.open("[")?;
        if self.at_op("]") {
            let inner = self.space();
            self.close(open, "]")?;
            return Ok(collection(
                prefix,
                CollectionKind::List,
                vec![RightPadded::new(empty_expression(inner))],
            ));
        }
        let first = self.star_named_expression()?;
        if self.at_comprehension() {
            let clauses = self.comprehension_clauses()?;
            let suffix = self.close(open, "]")?;
            return Ok(comprehension(
                prefix,
                ComprehensionKind::List,
                first,
                clauses,
                suffix,
            ));
        }
        let elements =
            self.finish_delimited(Vec::new(), first, "]", Self::star_named_expression)?;
        self.close(open, "]")?;
        Ok(collection(prefix, CollectionKind::List, elements))
    }

    /// `{ ... }`: a dict or set display, or their comprehensions.
    fn brace_display(&mut self) -> PResult<Expression> {
        let (prefix, open) = self.open("{")?;
        if self.at_op("}") {
            let inner = self.space();
            self.close(open, "}")?;
            return Ok(Expression::DictLiteral(Rc::new(DictLiteral::new(
                prefix,
                Markers::EMPTY,
                Container::build(
                    Space::EMPTY,
                    vec![RightPadded::new(empty_expression(inner))],
                ),
            ))));
        }
        let first = self.dict_or_set_element()?;
        let is_dict = matches!(
            &first,
            Expression::KeyValue(_)
        ) || matches!(&first, Expression::Star(star) if star.kind == StarKind::Dict);
        if self.at_comprehension() {
            let clauses = self.comprehension_clauses()?;
            let suffix = self.close(open, "}")?;
            let kind = if is_dict {
                ComprehensionKind::Dict
            } else {
                ComprehensionKind::Set
            };
            return Ok(comprehension(prefix, kind, first, clauses, suffix));
        }
        let elements =
            self.finish_delimited(Vec::new(), first, "}", Self::dict_or_set_element)?;
        self.close(open, "}")?;
        if is_dict {
            return Ok(Expression::DictLiteral(Rc::new(DictLiteral::new(
                prefix,
                Markers::EMPTY,
                Container::build(Space::EMPTY, elements),
            ))));
        }
        Ok(collection(prefix, CollectionKind::Set, elements))
    }

    fn dict_or_set_element(&mut self) -> PResult<Expression> {
        if self.at_op("**") {
            let prefix = self.expect_op("**")?;
            let expression = self.bitwise_or()?;
            return Ok(Expression::Star(Rc::new(Star::new(
                prefix,
                Markers::EMPTY,
                StarKind::Dict,
                expression,
            ))));
        }
        let key = self.star_named_expression()?;
        if !self.at_op(":") {
            return Ok(key);
        }
        let after = self.expect_op(":")?;
        let value = self.expression()?;
        let (prefix, key) = hoist(key);
        Ok(Expression::KeyValue(Rc::new(KeyValue::new(
            prefix,
            Markers::EMPTY,
            RightPadded::build(key, after),
            value,
        ))))
    }

    pub(super) fn at_comprehension(&self) -> bool {
        self.at_keyword("for") || (self.at_keyword("async") && self.peek_nth(1).is_name("for"))
    }

    pub(super) fn comprehension_clauses(&mut self) -> PResult<Vec<Rc<ComprehensionClause>>> {
        let mut clauses = Vec::new();
        while self.at_comprehension() {
            let (prefix, async_space) = if self.at_keyword("async") {
                let prefix = self.expect_keyword("async")?;
                (prefix, Some(self.expect_keyword("for")?))
            } else {
                (self.expect_keyword("for")?, None)
            };
            let target = self.target_list()?;
            let before_in = self.expect_keyword("in")?;
            let iterable = self.disjunction()?;
            let mut conditions = Vec::new();
            while self.at_keyword("if") {
                let prefix = self.expect_keyword("if")?;
                let condition = self.disjunction()?;
                conditions.push(Rc::new(ComprehensionCondition::new(
                    prefix,
                    Markers::EMPTY,
                    condition,
                )));
            }
            clauses.push(Rc::new(ComprehensionClause::new(
                prefix,
                Markers::EMPTY,
                async_space,
                target,
                LeftPadded::build(before_in, iterable),
                conditions,
            )));
        }
        Ok(clauses)
    }
}

pub(super) fn literal(prefix: Space, text: &str, kind: LiteralKind) -> Expression {
    Expression::Literal(Rc::new(Literal::new(
        prefix,
        Markers::EMPTY,
        text.to_string(),
        kind,
    )))
}

fn number_kind(text: &str) -> LiteralKind {
    let lower = text.to_ascii_lowercase();
    if lower.ends_with('j') {
        LiteralKind::Complex
    } else if lower.starts_with("0x") || lower.starts_with("0o") || lower.starts_with("0b") {
        LiteralKind::Integer
    } else if lower.contains('.') || lower.contains('e') {
        LiteralKind::Float
    } else {
        LiteralKind::Integer
    }
}

/// A call on `callee`: `a.b(...)` keeps `a` as the receiver, a plain name
/// is the method name, and anything else is the receiver of a call without
/// a name.
fn call(callee: Expression, arguments: Container<Expression>) -> Expression {
    let (prefix, select, name) = match callee {
        Expression::FieldAccess(access) => {
            let access = Rc::unwrap_or_clone(access);
            (
                access.prefix,
                Some(RightPadded::build(access.target, access.name.before)),
                access.name.element,
            )
        }
        Expression::Identifier(name) => {
            let prefix = name.prefix.clone();
            (prefix, None, name.with_prefix(Space::EMPTY))
        }
        other => {
            let (prefix, other) = hoist(other);
            (prefix, Some(RightPadded::new(other)), identifier(Space::EMPTY, ""))
        }
    };
    Expression::MethodInvocation(Rc::new(MethodInvocation::new(
        prefix,
        Markers::EMPTY,
        select,
        name,
        arguments,
    )))
}

fn parentheses(prefix: Space, expression: Expression, after: Space) -> Expression {
    Expression::Parentheses(Rc::new(Parentheses::new(
        prefix,
        Markers::EMPTY,
        RightPadded::build(expression, after),
    )))
}

fn collection(
    prefix: Space,
    kind: CollectionKind,
    elements: Vec<RightPadded<Expression>>,
) -> Expression {
    Expression::CollectionLiteral(Rc::new(CollectionLiteral::new(
        prefix,
        Markers::EMPTY,
        kind,
        Container::build(Space::EMPTY, elements),
    )))
}

fn comprehension(
    prefix: Space,
    kind: ComprehensionKind,
    result: Expression,
    clauses: Vec<Rc<ComprehensionClause>>,
    suffix: Space,
) -> Expression {
    Expression::ComprehensionExpression(Rc::new(ComprehensionExpression::new(
        prefix,
        Markers::EMPTY,
        kind,
        result,
        clauses,
        suffix,
    )))
}
